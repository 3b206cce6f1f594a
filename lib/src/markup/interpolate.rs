use chrono::{DateTime, Local};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A `{{symbols.…}}` entry: fixed text, or a list indexed by the argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Symbol {
    Text(String),
    Indexed(Vec<String>),
}

/// The symbol table used for `{{symbols.name}}` and `{{symbols.name(n)}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbols(FxHashMap<String, Symbol>);

impl Default for Symbols {
    fn default() -> Self {
        let mut map = FxHashMap::default();
        let mut text = |k: &str, v: &str| map.insert(k.to_string(), Symbol::Text(v.into()));
        text("reference", "R");
        text("polyset", "\\mathcal{V}");
        text("dual_basis", "\\mathcal{L}");
        text("geometry", "\\mathbf{x}");
        text("dofs", "l");
        text("basis_function", "\\phi");
        text("entity_count", "n");

        let entities = ["v", "e", "f", "V"].map(String::from).to_vec();
        map.insert("entity".into(), Symbol::Indexed(entities));
        Symbols(map)
    }
}

impl Symbols {
    pub fn empty() -> Self {
        Symbols(FxHashMap::default())
    }

    pub fn insert(&mut self, name: impl Into<String>, symbol: Symbol) -> Option<Symbol> {
        self.0.insert(name.into(), symbol)
    }

    /// Adds `other`'s entries, replacing existing entries of the same name.
    pub fn extend(&mut self, other: Symbols) {
        self.0.extend(other.0);
    }

    pub fn lookup(&self, name: &str, arg: Option<usize>) -> Option<&str> {
        match (self.0.get(name)?, arg) {
            (Symbol::Text(text), None) => Some(text),
            (Symbol::Indexed(items), Some(i)) => items.get(i).map(|s| s.as_str()),
            _ => None,
        }
    }
}

/// Replaces `{{date:…}}` and `{{symbols.…}}` tokens. Unknown tokens are kept.
pub fn interpolate(input: &str, now: &DateTime<Local>, symbols: &Symbols) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(end) = rest.find("}}") {
        match rest[..end].rfind("{{") {
            Some(start) => {
                out.push_str(&rest[..start]);
                match expand(&rest[start + 2..end], now, symbols) {
                    Some(value) => out.push_str(&value),
                    None => out.push_str(&rest[start..end + 2]),
                }
            }
            None => out.push_str(&rest[..end + 2]),
        }

        rest = &rest[end + 2..];
    }

    out.push_str(rest);
    out
}

fn expand(token: &str, now: &DateTime<Local>, symbols: &Symbols) -> Option<String> {
    match token {
        "date:Y" => return Some(now.format("%Y").to_string()),
        "date:D-M-Y" => return Some(now.format("%d-%B-%Y").to_string()),
        _ => {}
    }

    let name = token.strip_prefix("symbols.")?;
    if let Some((name, arg)) = name.strip_suffix(')').and_then(|n| n.split_once('(')) {
        let arg = arg.parse().ok()?;
        return symbols.lookup(name, Some(arg)).map(String::from);
    }

    symbols.lookup(name, None).map(String::from)
}
