//! Inline macros: tokenizing one run of prose into [`Inline`] nodes and
//! emitting them as HTML.
//!
//! Macros are recognized in a single left-to-right scan. Where two forms
//! could start at the same position, the earlier one in this list wins:
//!
//!   1. `<ref key="value" ...>` citation tags
//!   2. `[text](target)` links and bare `(target)` groups
//!   3. `{{code-include::path}}`
//!   4. `{{plot::...}}`, `{{reference::cell}}`, `{{img::key}}`
//!   5. `` `code` `` spans
//!   6. `**strong**` then `*emphasis*`
//!   7. `{{tick}}`
//!
//! Replacement text is never rescanned, so the output of one macro cannot
//! trigger another. Anything unrecognized is kept as literal text.

use std::fmt::Write;
use std::path::Path;

use crate::error::{Chainable, Result};
use crate::markup::citation::{parse_attributes, Citation, Citations};
use crate::markup::links::{parse_bare_target, parse_link, resolve_target};
use crate::markup::plot::{PlotElement, Plotter};
use crate::util::nbsp;

const TICK: &str = "<i class='fa-solid fa-check' style='color:#55ff00'></i>";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(String),
    Cite(Citation),
    Link { href: String, content: Vec<Inline> },
    CodeInclude(String),
    Plot(PlotElement),
    PlotFunction(PlotElement, usize),
    Reference(String),
    Image(String),
    Code(String),
    Strong(Vec<Inline>),
    Emphasis(Vec<Inline>),
    Tick,
}

struct Scanner {
    nodes: Vec<Inline>,
    text: String,
}

impl Scanner {
    fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn push(&mut self, node: Inline) {
        if !self.text.is_empty() {
            self.nodes.push(Inline::Text(std::mem::take(&mut self.text)));
        }

        self.nodes.push(node);
    }

    fn finish(mut self) -> Vec<Inline> {
        if !self.text.is_empty() {
            self.nodes.push(Inline::Text(self.text));
        }

        self.nodes
    }
}

/// Splits `input` into inline nodes.
///
/// Fails only on a malformed `<ref ...>` tag.
pub fn parse(input: &str) -> Result<Vec<Inline>> {
    let mut scanner = Scanner { nodes: vec![], text: String::new() };
    let mut i = 0;
    while i < input.len() {
        let rest = &input[i..];
        match scan_macro(rest)? {
            Some((node, len)) => {
                if let Inline::Cite(_) = node {
                    let trimmed = scanner.text.trim_end_matches(' ').len();
                    scanner.text.truncate(trimmed);
                }

                match node {
                    Inline::Text(text) => scanner.push_text(&text),
                    node => scanner.push(node),
                }

                i += len;
            }
            None => {
                let len = rest.chars().next().map_or(1, |c| c.len_utf8());
                scanner.push_text(&rest[..len]);
                i += len;
            }
        }
    }

    Ok(scanner.finish())
}

/// The macro starting at the beginning of `rest`, if any, and its length.
fn scan_macro(rest: &str) -> Result<Option<(Inline, usize)>> {
    let node = match rest.as_bytes()[0] {
        b'<' => return scan_citation(rest),
        b'[' => parse_link(rest).map(|(text, target, len)| {
            let href = resolve_target(target).unwrap_or_else(|| target.to_string());
            parse(text).map(|content| (Inline::Link { href, content }, len))
        }).transpose()?,
        b'(' => parse_bare_target(rest).map(|(group, len)| (Inline::Text(group), len)),
        b'{' => scan_braces(rest),
        b'`' => delimited(rest, "`").map(|(code, len)| (Inline::Code(code.into()), len)),
        b'*' => match delimited(rest, "**") {
            Some((inner, len)) => Some((Inline::Strong(parse(inner)?), len)),
            None if rest.starts_with("**") => None,
            None => match delimited(rest, "*") {
                Some((inner, len)) => Some((Inline::Emphasis(parse(inner)?), len)),
                None => None,
            },
        },
        _ => None,
    };

    Ok(node)
}

/// Non-empty content between `delim` at the start of `rest` and the next
/// `delim`, on one line.
fn delimited<'a>(rest: &'a str, delim: &str) -> Option<(&'a str, usize)> {
    let body = rest.strip_prefix(delim)?;
    let end = body.find(delim)?;
    let inner = &body[..end];
    if inner.is_empty() || inner.contains('\n') {
        return None;
    }

    Some((inner, delim.len() * 2 + end))
}

fn scan_citation(rest: &str) -> Result<Option<(Inline, usize)>> {
    let Some(body) = rest.strip_prefix("<ref ") else {
        return Ok(None);
    };

    let Some(end) = memchr::memchr(b'>', body.as_bytes()) else {
        return Ok(None);
    };

    let attrs = parse_attributes(&body[..end])?;
    let citation = Citation::from_attributes(&attrs)
        .chain_with(|| error!("invalid citation tag", "tag" => &rest[..5 + end + 1]))?;

    Ok(Some((Inline::Cite(citation), 5 + end + 1)))
}

fn scan_braces(rest: &str) -> Option<(Inline, usize)> {
    let body = rest.strip_prefix("{{")?;
    let end = body.find("}}")?;
    let len = end + 4;
    let call = &body[..end];

    let node = if call == "tick" {
        Inline::Tick
    } else if let Some(path) = call.strip_prefix("code-include::") {
        Inline::CodeInclude(path.to_string())
    } else if let Some(args) = call.strip_prefix("plot::") {
        let (args, index) = match args.split_once("::") {
            Some((args, index)) => (args, Some(index.parse::<usize>().ok()?)),
            None => (args, None),
        };

        let mut parts = args.split(',');
        let (name, cell, order) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let element = PlotElement::parse(name, cell, order)?;
        match index {
            Some(index) => Inline::PlotFunction(element, index),
            None => Inline::Plot(element),
        }
    } else if let Some(cell) = call.strip_prefix("reference::") {
        Inline::Reference(cell.to_string())
    } else if let Some(key) = call.strip_prefix("img::") {
        Inline::Image(key.to_string())
    } else {
        return None;
    };

    Some((node, len))
}

/// Everything inline emission needs beyond the nodes themselves.
pub struct Emitter<'a> {
    pub plotter: &'a dyn Plotter,
    pub include_dir: Option<&'a Path>,
    pub citations: &'a mut Citations,
}

impl Emitter<'_> {
    /// Parses and emits `input` in one go.
    pub fn render(&mut self, input: &str) -> Result<String> {
        let nodes = parse(input)?;
        let mut out = String::with_capacity(input.len());
        self.emit_all(&nodes, &mut out)?;
        Ok(out)
    }

    pub fn emit_all(&mut self, nodes: &[Inline], out: &mut String) -> Result<()> {
        nodes.iter().try_for_each(|node| self.emit(node, out))
    }

    pub fn emit(&mut self, node: &Inline, out: &mut String) -> Result<()> {
        match node {
            Inline::Text(text) => out.push_str(text),
            Inline::Cite(citation) => {
                let n = self.citations.cite(citation);
                out.push_str(&Citations::back_reference(n));
            }
            Inline::Link { href, content } => {
                let _ = write!(out, "<a href='{href}'>");
                self.emit_all(content, out)?;
                out.push_str("</a>");
            }
            Inline::CodeInclude(path) => out.push_str(&self.code_include(path)?),
            Inline::Plot(element) => {
                out.push_str("<center>");
                for index in 0..self.plotter.dimension(element)? {
                    out.push_str(&self.plotter.plot_function(element, index)?);
                }

                out.push_str("</center>");
            }
            Inline::PlotFunction(element, index) => {
                let plot = self.plotter.plot_function(element, *index)?;
                let _ = write!(out, "<center>{plot}</center>");
            }
            Inline::Reference(cell) => {
                let _ = write!(out, "<center>{}</center>", self.plotter.plot_reference(cell)?);
            }
            Inline::Image(key) => {
                let _ = write!(out, "<center>{}</center>", self.plotter.plot_img(key)?);
            }
            Inline::Code(code) => {
                let _ = write!(out, "<span style='font-family:monospace'>{code}</span>");
            }
            Inline::Strong(content) => {
                out.push_str("<strong>");
                self.emit_all(content, out)?;
                out.push_str("</strong>");
            }
            Inline::Emphasis(content) => {
                out.push_str("<em>");
                self.emit_all(content, out)?;
                out.push_str("</em>");
            }
            Inline::Tick => out.push_str(TICK),
        }

        Ok(())
    }

    fn code_include(&self, path: &str) -> Result<String> {
        let Some(dir) = self.include_dir else {
            return err!("code includes need an include directory", "path" => path);
        };

        let full = dir.join(path);
        let content = std::fs::read_to_string(&full).chain_with(|| error! {
            "failed to read code include",
            "file path" => full.display(),
        })?;

        let lines: Vec<String> = content.lines().map(nbsp).collect();
        Ok(format!("<p class='pcode'>{}</p>", lines.join("<br />")))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::markup::plot::NoPlots;
    use super::*;

    fn render(input: &str) -> (String, Citations) {
        let mut citations = Citations::new();
        let mut emitter = Emitter { plotter: &NoPlots, include_dir: None, citations: &mut citations };
        let html = emitter.render(input).unwrap();
        (html, citations)
    }

    #[test]
    fn emphasis_and_code() {
        let (html, _) = render("a **bold** and *soft* `x*y*z` word");
        assert_eq!(html, "a <strong>bold</strong> and <em>soft</em> \
            <span style='font-family:monospace'>x*y*z</span> word");
    }

    #[test]
    fn strong_inside_links() {
        let (html, _) = render("[**Lagrange**](element::lagrange) (index::all)");
        assert_eq!(html, "<a href='/elements/lagrange.html'><strong>Lagrange</strong></a> \
            (/elements/index.html)");
    }

    #[test]
    fn citations_number_in_order() {
        let (html, citations) = render(
            "first <ref author=\"Ciarlet, P. G.\" year=1978> then <ref title=\"Second\">");

        assert_eq!(html, "first<sup><a href='#ref1'>[1]</a></sup> \
            then<sup><a href='#ref2'>[2]</a></sup>");
        assert_eq!(citations.len(), 2);
    }

    #[test]
    fn bad_citation_fails() {
        let mut citations = Citations::new();
        let mut emitter = Emitter { plotter: &NoPlots, include_dir: None, citations: &mut citations };
        assert!(emitter.render("<ref colour=\"red\">").is_err());
    }

    #[test]
    fn unknown_macros_stay_literal() {
        let (html, _) = render("{{unknown::thing}} {{tick}} lone ** {{plot::a,b}}");
        assert_eq!(html, format!("{{{{unknown::thing}}}} {TICK} lone ** {{{{plot::a,b}}}}"));
    }

    #[test]
    fn plot_macros_parse() {
        let nodes = parse("{{plot::Lagrange variant=gll,triangle,2::3}}").unwrap();
        let element = PlotElement::parse("Lagrange variant=gll", "triangle", "2").unwrap();
        assert_eq!(nodes, vec![Inline::PlotFunction(element, 3)]);

        let nodes = parse("{{reference::triangle}}{{img::logo}}").unwrap();
        assert_eq!(nodes, vec![Inline::Reference("triangle".into()), Inline::Image("logo".into())]);
    }

    #[test]
    fn plots_need_a_plotter() {
        let mut citations = Citations::new();
        let mut emitter = Emitter { plotter: &NoPlots, include_dir: None, citations: &mut citations };
        assert!(emitter.render("{{reference::triangle}}").is_err());
    }

    #[test]
    fn code_includes_read_relative_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("demo.py"), "import basix\nx = 1\n").unwrap();

        let mut citations = Citations::new();
        let mut emitter = Emitter {
            plotter: &NoPlots,
            include_dir: Some(dir.path()),
            citations: &mut citations,
        };

        let html = emitter.render("{{code-include::demo.py}}").unwrap();
        assert_eq!(html, "<p class='pcode'>import&nbsp;basix<br />x&nbsp;=&nbsp;1</p>");
    }
}
