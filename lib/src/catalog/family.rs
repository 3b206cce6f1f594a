use indexmap::IndexMap;
use serde::Deserialize;

use crate::catalog::record::ComplexEntry;
use crate::error::Result;
use crate::markup::Citation;
use crate::util::Text;

/// A family of elements in a complex, as listed in `families.yml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Family {
    pub name: Option<Text>,
    /// The space symbol in Arnold–Logg notation, eg `\mathcal{P}^-`.
    pub arnold_logg: Option<Text>,
    /// The space symbol in Cockburn–Fu notation.
    pub cockburn_fu: Option<Text>,
    #[serde(default)]
    pub references: Vec<Citation>,
    /// Registered members: degree symbol -> extension parameter -> member.
    #[serde(skip)]
    pub elements: IndexMap<String, IndexMap<String, Member>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub filename: String,
}

/// The form degree of an extension parameter.
pub fn form_degree(ext: &str) -> Result<&'static str> {
    Ok(match ext {
        "H1" => "0",
        "Hcurl" => "1",
        "Hdiv" => "d-1",
        "L2" => "d",
        _ => return err!("unknown complex extension parameter", "ext" => ext),
    })
}

pub fn cell_symbol(cell: &str) -> Result<&'static str> {
    Ok(match cell {
        "simplex" => "\\Delta_d",
        "tp" => "\\square_d",
        _ => return err!("unknown complex cell", "cell" => cell),
    })
}

pub fn arnold_logg_name(symbol: &str, entry: &ComplexEntry) -> Result<String> {
    let (r, cell) = (form_degree(&entry.ext)?, cell_symbol(&entry.cell)?);
    Ok(format!("{symbol}_{{{}}}\\Lambda^{{{r}}}({cell})", entry.degree))
}

pub fn cockburn_fu_name(symbol: &str, entry: &ComplexEntry) -> Result<String> {
    let (r, cell) = (form_degree(&entry.ext)?, cell_symbol(&entry.cell)?);
    Ok(format!("{symbol}_{{{}}}^{{{r}}}({cell})", entry.degree))
}

pub fn arnold_logg_reference() -> Citation {
    Citation {
        author: vec!["Arnold, Douglas N.".into(), "Logg, Anders".into()],
        title: Some("Periodic table of the finite elements".into()),
        journal: Some("SIAM News".into()),
        volume: Some("47".into()),
        issue: Some("9".into()),
        year: Some("2014".into()),
        ..Default::default()
    }
}

pub fn cockburn_fu_reference() -> Citation {
    Citation {
        author: vec!["Cockburn, Bernardo".into(), "Fu, Guosheng".into()],
        title: Some("A systematic construction of finite element commuting exact sequences".into()),
        journal: Some("SIAM Journal on Numerical Analysis".into()),
        volume: Some("55".into()),
        issue: Some("4".into()),
        pagestart: Some("1650".into()),
        pageend: Some("1688".into()),
        year: Some("2017".into()),
        doi: Some("10.1137/16M1073352".into()),
        ..Default::default()
    }
}

impl Family {
    /// The family's name for `entry` in each notation it has, as inline math.
    pub fn notations(&self, entry: &ComplexEntry) -> Result<Vec<String>> {
        let mut out = vec![];
        if let Some(symbol) = &self.arnold_logg {
            out.push(format!("\\({}\\)", arnold_logg_name(symbol, entry)?));
        }

        if let Some(symbol) = &self.cockburn_fu {
            out.push(format!("\\({}\\)", cockburn_fu_name(symbol, entry)?));
        }

        Ok(out)
    }

    /// The references implied by the family's notations, then its own.
    pub fn implied_references(&self) -> Vec<Citation> {
        let mut out = vec![];
        if self.arnold_logg.is_some() {
            out.push(arnold_logg_reference());
        }

        if self.cockburn_fu.is_some() {
            out.push(cockburn_fu_reference());
        }

        out.extend(self.references.iter().cloned());
        out
    }

    /// Records a member, keeping any element already in its slot.
    ///
    /// Returns the existing member if the slot was taken.
    pub fn register(&mut self, entry: &ComplexEntry, member: Member) -> Option<&Member> {
        let slots = self.elements.entry(entry.degree.clone()).or_default();
        if slots.contains_key(&entry.ext) {
            return slots.get(&entry.ext);
        }

        slots.insert(entry.ext.clone(), member);
        None
    }

    pub fn member(&self, degree: &str, ext: &str) -> Option<&Member> {
        self.elements.get(degree)?.get(ext)
    }
}
