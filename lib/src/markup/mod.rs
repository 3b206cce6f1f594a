//! The markup translator: a small line-oriented language to HTML.
//!
//! Rendering runs in stages:
//!
//!   1. [`preprocess`]: page includes, contributor lists, and author blocks.
//!   2. [`block`]: the line pass, producing a [`Document`] of blocks.
//!   3. [`inline`]: macros inside prose, emitted block by block. Citations
//!      are numbered as they are emitted.
//!   4. The bibliography, if anything was cited.
//!   5. [`interpolate`]: date and symbol tokens over the whole output.
//!
//! ```rust
//! use defelement::markup::Markup;
//!
//! let html = Markup::new().render("# Hello\nSome *text*.").unwrap();
//! assert_eq!(html, "<h1 id=\"Hello\"><a href=\"#Hello\">Hello</a></h1>\n\
//!     <p>Some <em>text</em>. </p>\n");
//! ```

pub mod block;
pub mod citation;
pub mod contributors;
pub mod highlight;
pub mod inline;
pub mod interpolate;
pub mod links;
pub mod plot;
pub mod preprocess;

use std::fmt::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use derive_more::Debug;

use crate::error::Result;
use crate::source::Source;
use crate::util::{heading_with_id, quote_plus};

pub use block::{Block, Document, Line};
pub use citation::{Citation, Citations};
pub use contributors::{list_contributors, ContributorFormat, Contributors, GitHubUser, NoContributors, Person};
pub use highlight::CodeLang;
pub use interpolate::{Symbol, Symbols};
pub use plot::{NoPlots, PlotElement, Plotter};

static NO_PLOTS: NoPlots = NoPlots;
static NO_CONTRIBUTORS: NoContributors = NoContributors;

/// A configured markup renderer.
///
/// Rendering borrows the renderer immutably and keeps all per-document state
/// local to the call, so one renderer may be shared across threads.
#[derive(Debug)]
pub struct Markup<'p> {
    #[debug(ignore)]
    plotter: &'p dyn Plotter,
    #[debug(ignore)]
    contributors: &'p dyn Contributors,
    include_dir: Option<PathBuf>,
    symbols: Symbols,
    now: Option<DateTime<Local>>,
}

impl Default for Markup<'static> {
    fn default() -> Self {
        Markup {
            plotter: &NO_PLOTS,
            contributors: &NO_CONTRIBUTORS,
            include_dir: None,
            symbols: Symbols::default(),
            now: None,
        }
    }
}

impl Markup<'static> {
    pub fn new() -> Self {
        Markup::default()
    }
}

impl<'p> Markup<'p> {
    pub fn plotter<'q>(self, plotter: &'q dyn Plotter) -> Markup<'q> where 'p: 'q {
        Markup {
            plotter,
            contributors: self.contributors,
            include_dir: self.include_dir,
            symbols: self.symbols,
            now: self.now,
        }
    }

    /// Where `{{list contributors}}` gets its people from.
    pub fn contributors<'q>(self, contributors: &'q dyn Contributors) -> Markup<'q> where 'p: 'q {
        Markup {
            plotter: self.plotter,
            contributors,
            include_dir: self.include_dir,
            symbols: self.symbols,
            now: self.now,
        }
    }

    /// The directory `{{<name>.md}}` and `{{code-include::...}}` resolve in.
    pub fn include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dir = Some(dir.into());
        self
    }

    /// Adds to (and overrides entries of) the default symbol table.
    pub fn symbols(mut self, symbols: Symbols) -> Self {
        self.symbols.extend(symbols);
        self
    }

    /// Pins the date used for `{{date:...}}` tokens. Defaults to the time of
    /// each render.
    pub fn at(mut self, now: DateTime<Local>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn render<I: Source>(&self, input: I) -> Result<String> {
        let input = input.read()?;
        let content = preprocess::preprocess(&input, self.include_dir.as_deref(), self.contributors)?;
        let document = block::parse(&content);
        if let Some(lang) = document.unterminated_fence {
            tracing::debug!(?lang, "markup ends inside a code fence");
        }

        self.render_document(&document)
    }

    /// Emits an already parsed document.
    pub fn render_document(&self, document: &Document) -> Result<String> {
        let mut citations = Citations::new();
        let mut emitter = inline::Emitter {
            plotter: self.plotter,
            include_dir: self.include_dir.as_deref(),
            citations: &mut citations,
        };

        let mut out = String::new();
        for block in &document.blocks {
            emit_block(&mut emitter, block, &mut out)?;
        }

        out.push_str(&citations.bibliography());
        let now = self.now.unwrap_or_else(Local::now);
        Ok(interpolate::interpolate(&out, &now, &self.symbols))
    }
}

fn emit_block(emitter: &mut inline::Emitter<'_>, block: &Block, out: &mut String) -> Result<()> {
    match block {
        Block::Heading { level, text } => {
            let content = emitter.render(text)?;
            out.push_str(&heading_with_id(*level, &quote_plus(text), &content));
        }
        Block::Paragraph { code, lines } => {
            out.push_str(if *code { "<p class='pcode'>" } else { "<p>" });
            emit_lines(emitter, lines, " ", out)?;
            out.push_str("</p>\n");
        }
        Block::List { items } => {
            out.push_str("<ul>");
            for item in items {
                out.push_str("<li>");
                emit_lines(emitter, item, "", out)?;
                out.push_str("</li>");
            }

            out.push_str("</ul>\n");
        }
        Block::Raw(line) => emit_lines(emitter, std::slice::from_ref(line), " ", out)?,
    }

    Ok(())
}

/// Consecutive text lines are joined with spaces and rendered as one run, so
/// inline macros may span them. Code lines end with a line break.
fn emit_lines(
    emitter: &mut inline::Emitter<'_>,
    lines: &[Line],
    trailer: &str,
    out: &mut String,
) -> Result<()> {
    let mut run = String::new();
    for line in lines {
        match line {
            Line::Text(text) => {
                if !run.is_empty() {
                    run.push(' ');
                }

                run.push_str(text);
            }
            Line::Code(code) => {
                flush(emitter, &mut run, trailer, out)?;
                let _ = write!(out, "{code}<br />");
            }
        }
    }

    flush(emitter, &mut run, trailer, out)
}

fn flush(emitter: &mut inline::Emitter<'_>, run: &mut String, trailer: &str, out: &mut String) -> Result<()> {
    if !run.is_empty() {
        out.push_str(&emitter.render(run)?);
        out.push_str(trailer);
        run.clear();
    }

    Ok(())
}

/// Renders the markup file at `path`, resolving includes next to it.
pub fn render_file(path: &Path, plotter: &dyn Plotter, symbols: Symbols) -> Result<String> {
    let mut markup = Markup::new().plotter(plotter).symbols(symbols);
    if let Some(dir) = path.parent() {
        markup = markup.include_dir(dir);
    }

    markup.render(path)
}
