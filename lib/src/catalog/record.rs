use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::markup::Citation;
use crate::util::Text;

/// One parsed `.def` file.
///
/// Keys the catalogue does not use are ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Record {
    pub name: Text,
    pub html_name: Option<Text>,
    #[serde(default)]
    pub alt_names: Vec<Text>,
    #[serde(default)]
    pub short_names: Vec<Text>,
    #[serde(default)]
    pub reference_elements: Vec<String>,
    pub min_order: Option<OrderBound>,
    pub max_order: Option<OrderBound>,
    #[serde(default)]
    pub variants: IndexMap<String, Variant>,
    pub mapping: Option<Text>,
    pub sobolev: Option<Text>,
    pub dofs: Option<IndexMap<String, Node>>,
    pub ndofs: Option<DofCount>,
    pub entity_ndofs: Option<DofCount>,
    #[serde(default)]
    pub polynomial_set: IndexMap<String, Text>,
    #[serde(default)]
    pub complexes: IndexMap<String, OneOrMany<String>>,
    pub mixed: Option<Vec<String>>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub implementations: IndexMap<String, Node>,
    #[serde(default)]
    pub examples: Vec<Text>,
    #[serde(default)]
    pub references: Vec<Citation>,
    #[serde(default)]
    pub notes: Vec<Text>,
    pub test: Option<serde_yaml::Value>,
}

/// A minimum or maximum order, for every cell or per cell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OrderBound {
    Global(u32),
    PerCell(IndexMap<String, u32>),
}

impl OrderBound {
    /// The bound on `cell`. A per-cell bound without an entry for `cell` is
    /// no bound.
    pub fn on(&self, cell: &str) -> Option<u32> {
        match self {
            OrderBound::Global(n) => Some(*n),
            OrderBound::PerCell(map) => map.get(cell).copied(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Variant {
    pub variant_name: Text,
    pub description: Option<Text>,
    #[serde(default)]
    pub names: Vec<Text>,
    #[serde(default)]
    pub short_names: Vec<Text>,
}

/// Free-form nested data: DOF descriptions and implementation strings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(Text),
    List(Vec<Node>),
    Map(IndexMap<String, Node>),
}

impl Node {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn as_slice(&self) -> &[T] {
        match self {
            OneOrMany::One(one) => std::slice::from_ref(one),
            OneOrMany::Many(many) => many,
        }
    }
}

/// A DOF count: per-entity counts, or a list of labelled cases each with
/// their own counts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DofCount {
    Piecewise(Vec<IndexMap<String, DofCount>>),
    Entities(IndexMap<String, Count>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Leaf(CountLeaf),
    /// Counts that differ by sub-entity, keyed by its label.
    Split(IndexMap<String, Count>),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CountLeaf {
    pub formula: Option<Formula>,
    pub oeis: Option<Text>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Formula {
    Single(Text),
    /// `[{condition: value}, ...]`, rendered as a cases block.
    Cases(Vec<IndexMap<String, Text>>),
}

/// A complex membership: `family,ext,cell[,degree]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComplexEntry {
    pub family: String,
    pub ext: String,
    pub cell: String,
    /// The symbol the family is indexed by, `k` unless given.
    pub degree: String,
}

impl FromStr for ComplexEntry {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let (family, ext, cell, degree) = match parts[..] {
            [family, ext, cell] => (family, ext, cell, "k"),
            [family, ext, cell, degree] => (family, ext, cell, degree),
            _ => return err! {
                "complex entries must be `family,ext,cell[,degree]`",
                "entry" => s,
            },
        };

        Ok(ComplexEntry {
            family: family.into(),
            ext: ext.into(),
            cell: cell.into(),
            degree: degree.into(),
        })
    }
}

impl fmt::Display for ComplexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.family, self.ext, self.cell, self.degree)
    }
}

/// A component of a mixed element: `filename(order)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixedPart {
    pub filename: String,
    pub order: String,
}

impl FromStr for MixedPart {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parsed = s.split_once('(')
            .and_then(|(filename, rest)| Some((filename, rest.split_once(')')?.0)));

        match parsed {
            Some((filename, order)) if !filename.trim().is_empty() => Ok(MixedPart {
                filename: filename.trim().into(),
                order: order.trim().into(),
            }),
            _ => err!("mixed parts must be `element(order)`", "part" => s),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn records_parse() {
        let record: Record = serde_yaml::from_str(r#"
name: Raviart-Thomas
html-name: Raviart&ndash;Thomas
min-order: 1
max-order: {triangle: 3}
reference-elements: [triangle, tetrahedron]
variants:
  legendre: {variant-name: Legendre, description: integral moments, names: [RT]}
complexes:
  de-rham: [P-,Hdiv,simplex]
dofs:
  facets: integral moment with (lagrange, k-1)
  cell: [a, b]
ndofs:
  triangle:
    formula: k(k+2)
    oeis: A005563
implementations:
  symfem: N1div
  basix: {legendre: RT legendre=True}
categories: [vector]
test: true
colour: ignored
"#).unwrap();

        assert_eq!(record.name, "Raviart-Thomas");
        assert_eq!(record.min_order, Some(OrderBound::Global(1)));
        assert_eq!(record.max_order.as_ref().and_then(|b| b.on("triangle")), Some(3));
        assert_eq!(record.max_order.as_ref().and_then(|b| b.on("tetrahedron")), None);
        assert_eq!(record.variants["legendre"].names, vec![Text::from("RT")]);
        assert_eq!(record.complexes["de-rham"].as_slice(), &["P-,Hdiv,simplex".to_string()]);
        assert!(matches!(record.dofs.as_ref().unwrap()["cell"], Node::List(_)));
        assert!(record.test.is_some());

        let Some(DofCount::Entities(counts)) = &record.ndofs else { panic!("entities") };
        assert!(matches!(&counts["triangle"], Count::Leaf(CountLeaf { formula: Some(_), oeis: Some(_) })));
    }

    #[test]
    fn split_and_piecewise_counts() {
        let count: DofCount = serde_yaml::from_str(r#"
- "k=1":
    vertices: {formula: "1"}
- "k>1":
    edges:
      triangle: {formula: "3"}
      quadrilateral:
        formula: [{"k=1": "4"}, {"k>1": "5"}]
"#).unwrap();

        let DofCount::Piecewise(cases) = count else { panic!("piecewise") };
        assert_eq!(cases.len(), 2);
        let DofCount::Entities(entities) = &cases[1]["k>1"] else { panic!("entities") };
        let Count::Split(split) = &entities["edges"] else { panic!("split") };
        assert!(matches!(&split["quadrilateral"], Count::Leaf(CountLeaf { formula: Some(Formula::Cases(_)), .. })));
    }

    #[test]
    fn complex_entries() {
        let entry: ComplexEntry = "P,Hcurl,tp".parse().unwrap();
        assert_eq!(entry.degree, "k");
        assert_eq!(entry.to_string(), "P,Hcurl,tp,k");

        let entry: ComplexEntry = "P-,L2,simplex,r".parse().unwrap();
        assert_eq!(entry.degree, "r");

        assert!("P,H1".parse::<ComplexEntry>().is_err());
    }

    #[test]
    fn mixed_parts() {
        let part: MixedPart = "lagrange(k+1)".parse().unwrap();
        assert_eq!(part, MixedPart { filename: "lagrange".into(), order: "k+1".into() });
        assert!("lagrange".parse::<MixedPart>().is_err());
    }
}
