use std::fmt::Write;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};

use crate::error::Result;
use crate::util::{heading_with_self_ref, join_prose, Text};

/// A bibliographic reference, either from a definition record or from an
/// inline `<ref ...>` tag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Citation {
    #[serde(default, deserialize_with = "authors")]
    pub author: Vec<String>,
    pub title: Option<Text>,
    pub journal: Option<Text>,
    pub booktitle: Option<Text>,
    pub volume: Option<Text>,
    pub issue: Option<Text>,
    pub pagestart: Option<Text>,
    pub pageend: Option<Text>,
    pub year: Option<Text>,
    pub publisher: Option<Text>,
    pub doi: Option<Text>,
    pub arxiv: Option<Text>,
    pub url: Option<Text>,
    pub note: Option<Text>,
}

/// How [`format_names()`] renders a list of `Surname, Given Names` names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameStyle {
    /// `A and B and C`, verbatim.
    Bibtex,
    /// Initials followed by surname, joined as prose.
    Citation,
}

fn authors<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Authors {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Authors::deserialize(deserializer)? {
        Authors::One(names) => names.split(" and ").map(|s| s.trim().to_string()).collect(),
        Authors::Many(names) => names,
    })
}

impl Citation {
    /// Builds a citation from the attributes of an inline `<ref ...>` tag.
    pub fn from_attributes(attrs: &IndexMap<String, String>) -> Result<Self> {
        let mut citation = Citation::default();
        for (key, value) in attrs {
            let value = Some(Text::from(value.as_str()));
            match key.as_str() {
                "author" => {
                    citation.author = value.iter()
                        .flat_map(|v| v.split(" and "))
                        .map(|s| s.trim().to_string())
                        .collect();
                }
                "title" => citation.title = value,
                "journal" => citation.journal = value,
                "booktitle" => citation.booktitle = value,
                "volume" => citation.volume = value,
                "issue" => citation.issue = value,
                "pagestart" => citation.pagestart = value,
                "pageend" => citation.pageend = value,
                "year" => citation.year = value,
                "publisher" => citation.publisher = value,
                "doi" => citation.doi = value,
                "arxiv" => citation.arxiv = value,
                "url" => citation.url = value,
                "note" => citation.note = value,
                _ => return err! {
                    "unknown citation attribute",
                    "attribute" => key,
                    "value" => attrs[key],
                },
            }
        }

        Ok(citation)
    }

    /// Renders the citation as an HTML bibliography entry.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if self.author.is_empty() {
            out.push_str("<i>(unknown author)</i>");
        } else {
            out.push_str(&format_names(&self.author, NameStyle::Citation));
        }

        if let Some(title) = &self.title {
            let _ = write!(out, ", {title}");
        }

        if let Some(journal) = self.journal.as_ref().or(self.booktitle.as_ref()) {
            let _ = write!(out, ", <em>{journal}</em>");
            if let Some(volume) = &self.volume {
                let _ = write!(out, " {volume}");
            }

            if let Some(issue) = &self.issue {
                let _ = write!(out, "({issue})");
            }
        }

        match (&self.pagestart, &self.pageend) {
            (Some(start), Some(end)) => { let _ = write!(out, ", {start}&ndash;{end}"); }
            (Some(page), None) | (None, Some(page)) => { let _ = write!(out, ", {page}"); }
            (None, None) => {}
        }

        if let Some(publisher) = &self.publisher {
            let _ = write!(out, ", {publisher}");
        }

        if let Some(year) = &self.year {
            let _ = write!(out, ", {year}");
        }

        out.push('.');
        if let Some(doi) = &self.doi {
            let _ = write!(out, " [DOI:&nbsp;<a href='https://doi.org/{doi}'>{doi}</a>]");
        }

        if let Some(arxiv) = &self.arxiv {
            let _ = write!(out, " [arXiv:&nbsp;<a href='https://arxiv.org/abs/{arxiv}'>{arxiv}</a>]");
        }

        if let Some(url) = &self.url {
            let _ = write!(out, " <a href='{url}'>{url}</a>");
        }

        if let Some(note) = &self.note {
            let _ = write!(out, " {note}");
        }

        out
    }
}

/// Formats `Surname, Given Names` style names. A trailing `et al` entry is
/// kept as a suffix in citation style.
pub fn format_names<S: AsRef<str>>(names: &[S], style: NameStyle) -> String {
    if style == NameStyle::Bibtex {
        return names.iter().map(|n| n.as_ref()).collect::<Vec<_>>().join(" and ");
    }

    let (names, et_al) = match names.split_last() {
        Some((last, init)) if last.as_ref() == "et al" => (init, true),
        _ => (names, false),
    };

    let formatted: Vec<String> = names.iter().map(|name| initialed(name.as_ref())).collect();
    match (et_al, formatted.len()) {
        (false, _) => join_prose(&formatted, "and"),
        (true, 0) => "et al".into(),
        (true, _) => format!("{}, et al", formatted.join(", ")),
    }
}

/// `Arnold, Douglas N.` -> `D. N. Arnold`.
fn initialed(name: &str) -> String {
    let mut parts = name.split(", ");
    let surname = parts.next().unwrap_or_default();
    let mut out = String::new();
    for given in parts.collect::<Vec<_>>().into_iter().rev() {
        for word in given.split(' ').filter(|w| !w.is_empty()) {
            if let Some(c) = word.chars().next() {
                let _ = write!(out, "{c}. ");
            }
        }
    }

    out.push_str(surname);
    out
}

/// Parses `key="value" key2=value2 ...` with shell-style quoting.
pub fn parse_attributes(input: &str) -> Result<IndexMap<String, String>> {
    let mut attrs = IndexMap::new();
    let mut chars = input.chars().peekable();
    loop {
        while chars.peek().map_or(false, |c| c.is_whitespace()) {
            chars.next();
        }

        if chars.peek().is_none() {
            break;
        }

        let mut token = String::new();
        let mut key = None;
        while let Some(&c) = chars.peek() {
            match c {
                c if c.is_whitespace() => break,
                '=' if key.is_none() => {
                    chars.next();
                    key = Some(std::mem::take(&mut token));
                }
                '"' | '\'' => {
                    chars.next();
                    let mut closed = false;
                    while let Some(q) = chars.next() {
                        match q {
                            q if q == c => { closed = true; break; }
                            '\\' if c == '"' => token.extend(chars.next()),
                            q => token.push(q),
                        }
                    }

                    if !closed {
                        return err!("unterminated quote in citation tag", "tag" => input);
                    }
                }
                c => {
                    chars.next();
                    token.push(c);
                }
            }
        }

        match key {
            Some(key) => { attrs.insert(key, token); }
            None => return err! {
                "citation attribute is missing `=`",
                "attribute" => token,
                "tag" => input,
            },
        }
    }

    Ok(attrs)
}

/// The citations made while rendering one document, in order of appearance.
#[derive(Debug, Default, Clone)]
pub struct Citations {
    entries: Vec<String>,
}

impl Citations {
    pub fn new() -> Self {
        Citations::default()
    }

    /// Records `citation` and returns its 1-based number.
    pub fn cite(&mut self, citation: &Citation) -> usize {
        self.entries.push(citation.to_html());
        self.entries.len()
    }

    /// The superscript back-reference to citation `n`.
    pub fn back_reference(n: usize) -> String {
        format!("<sup><a href='#ref{n}'>[{n}]</a></sup>")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The References section, or nothing if nothing was cited.
    pub fn bibliography(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }

        let mut out = heading_with_self_ref(2, "References");
        out.push_str("<ul class='citations'>");
        for (i, entry) in self.entries.iter().enumerate() {
            let n = i + 1;
            let _ = write!(out, "<li><a class='refid' id='ref{n}'>[{n}]</a> {entry}</li>");
        }

        out.push_str("</ul>");
        out
    }
}
