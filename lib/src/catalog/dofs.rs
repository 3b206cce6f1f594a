//! Rendering DOF counts and DOF descriptions.

use indexmap::IndexMap;

use crate::catalog::record::{Count, CountLeaf, DofCount, Formula, Node};
use crate::catalog::Categoriser;
use crate::error::Result;
use crate::markup::links::insert_links;

/// Cells a DOF description may be split by, in display order.
const CELLS: [&str; 5] = ["interval", "triangle", "tetrahedron", "quadrilateral", "hexahedron"];

/// Sub-entity keys and how each is introduced, in display order.
pub const ENTITIES: [(&str, &str); 8] = [
    ("vertices", "On each vertex"),
    ("edges", "On each edge"),
    ("faces", "On each face"),
    ("volumes", "On each volume"),
    ("ridges", "On each ridge"),
    ("peaks", "On each peak"),
    ("facets", "On each facet"),
    ("cell", "On the interior of the reference element"),
];

/// Renders a DOF count: one line per entity, or one block per case.
pub fn count_html(count: &DofCount) -> String {
    match count {
        DofCount::Piecewise(cases) => cases.iter()
            .flat_map(|case| case.iter())
            .map(|(label, count)| format!("\\({label}\\):<br />{}", count_html(count)))
            .collect::<Vec<_>>()
            .join("<br /><br />"),
        DofCount::Entities(entities) => entities.iter()
            .map(|(entity, count)| format!("{entity}: {}", formula_html(count)))
            .collect::<Vec<_>>()
            .join("<br />"),
    }
}

/// A single count: a formula as math, an OEIS link, or both.
pub fn formula_html(count: &Count) -> String {
    let leaf = match count {
        Count::Split(parts) => {
            return parts.iter()
                .map(|(label, count)| format!("{} ({label})", formula_html(count)))
                .collect::<Vec<_>>()
                .join(", ");
        }
        Count::Leaf(leaf) => leaf,
    };

    let CountLeaf { formula, oeis } = leaf;
    let mut out = String::new();
    if let Some(formula) = formula {
        out.push_str("\\(");
        match formula {
            Formula::Single(text) => out.push_str(text),
            Formula::Cases(cases) => {
                let rows: Vec<String> = cases.iter()
                    .flat_map(|case| case.iter())
                    .map(|(condition, value)| format!("{value}&{condition}"))
                    .collect();

                out.push_str("\\begin{cases}");
                out.push_str(&rows.join("\\\\"));
                out.push_str("\\end{cases}");
            }
        }

        out.push_str("\\)");
    }

    if let Some(oeis) = oeis {
        let link = format!("<a href='http://oeis.org/{oeis}'>{oeis}</a>");
        match formula {
            Some(_) => out.push_str(&format!(" ({link})")),
            None => out.push_str(&link),
        }
    }

    out
}

/// Describes the DOFs on each sub-entity, resolving spaces that integral
/// moments are taken against through `catalog`.
pub fn descriptions(dofs: &IndexMap<String, Node>, catalog: &Categoriser) -> Result<String> {
    describe(dofs, "", catalog)
}

fn describe(data: &IndexMap<String, Node>, post: &str, catalog: &Categoriser) -> Result<String> {
    let mut per_cell = vec![];
    for cell in CELLS {
        if let Some(node) = data.get(cell) {
            let Some(map) = node.as_map() else {
                return err!("per-cell DOF descriptions must be maps", "cell" => cell);
            };

            per_cell.push(describe(map, &format!(" ({cell})"), catalog)?);
        }
    }

    if !per_cell.is_empty() {
        return Ok(per_cell.join("<br />\n<br />\n"));
    }

    let mut lines = vec![];
    for (key, label) in ENTITIES {
        match data.get(key) {
            Some(Node::Map(shapes)) => for (shape, dofs) in shapes {
                lines.push(format!("{label} ({shape}){post}: {}", on_entity(dofs, catalog)?));
            },
            Some(dofs) => lines.push(format!("{label}{post}: {}", on_entity(dofs, catalog)?)),
            None => {}
        }
    }

    Ok(lines.join("<br />\n"))
}

fn on_entity(dofs: &Node, catalog: &Categoriser) -> Result<String> {
    match dofs {
        Node::Text(text) => functional(text, catalog),
        Node::List(items) => {
            let items = items.iter()
                .map(|item| on_entity(item, catalog))
                .collect::<Result<Vec<_>>>()?;

            Ok(match items.split_last() {
                None => String::new(),
                Some((last, [])) => last.clone(),
                Some((last, init)) => format!("{}, and {last}", init.join(",<br />")),
            })
        }
        Node::Map(_) => err!("DOFs on an entity must be text or a list"),
    }
}

/// One kind of functional. Integral moments name the space they are taken
/// against as `{set}`, `"prose"`, or `(element, order)`.
fn functional(dofs: &str, catalog: &Categoriser) -> Result<String> {
    if !dofs.contains("integral moment") {
        return Ok(dofs.to_string());
    }

    let Some((kind, space)) = dofs.split_once(" with ") else {
        return Ok(dofs.to_string());
    };

    let space = space.trim();
    if let Some(set) = space.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
        return Ok(format!("{kind} with \\(\\left\\{{{set}\\right\\}}\\)"));
    }

    if let Some(prose) = space.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        return Ok(format!("{kind} with {}", insert_links(prose)));
    }

    let parsed = space.strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .and_then(|s| s.split_once(','));

    match parsed {
        Some((element, order)) => {
            let link = catalog.get_space_name(element.trim(), true)?;
            Ok(format!("{kind} with an order \\({}\\) {link} space", order.trim()))
        }
        None => err! {
            "integral moment space must be `{...}`, `\"...\"` or `(element, order)`",
            "dofs" => dofs,
        },
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::catalog::{Categoriser, Element};
    use super::*;

    #[test]
    fn counts() {
        let count: DofCount = serde_yaml::from_str(r#"
triangle:
  formula: (k+1)(k+2)/2
  oeis: A000217
quadrilateral:
  formula: [{"k=0": "1"}, {"k>0": "(k+1)^2"}]
interval:
  oeis: A000027
"#).unwrap();

        assert_eq!(count_html(&count), "triangle: \\((k+1)(k+2)/2\\) \
            (<a href='http://oeis.org/A000217'>A000217</a>)<br />\
            quadrilateral: \\(\\begin{cases}1&k=0\\\\(k+1)^2&k>0\\end{cases}\\)<br />\
            interval: <a href='http://oeis.org/A000027'>A000027</a>");
    }

    #[test]
    fn split_and_piecewise() {
        let count: DofCount = serde_yaml::from_str(r#"
- "k=1":
    edges:
      triangle: {formula: "3"}
      quadrilateral: {formula: "4"}
"#).unwrap();

        assert_eq!(count_html(&count), "\\(k=1\\):<br />edges: \\(3\\) (triangle), \\(4\\) (quadrilateral)");
    }

    fn catalog() -> Categoriser {
        let mut catalog = Categoriser::new();
        catalog.add_reference("triangle");
        let lagrange = Element::from_yaml("name: Lagrange\nreference-elements: [triangle]", "lagrange")
            .unwrap();
        catalog.add_element(lagrange).unwrap();
        catalog
    }

    #[test]
    fn entity_descriptions() {
        let dofs: IndexMap<String, Node> = serde_yaml::from_str(r#"
vertices: point evaluations
edges: integral moment with (lagrange, k-1)
faces: integral moment with {1}
cell:
  - integral moment with "a [space](element::bubble)"
  - point evaluation
  - other
"#).unwrap();

        assert_eq!(descriptions(&dofs, &catalog()).unwrap(), "On each vertex: point evaluations<br />\n\
            On each edge: integral moment with an order \\(k-1\\) \
            <a href='/elements/lagrange.html'>Lagrange</a> space<br />\n\
            On each face: integral moment with \\(\\left\\{1\\right\\}\\)<br />\n\
            On the interior of the reference element: integral moment with a \
            <a href='/elements/bubble.html'>space</a>,<br />point evaluation, and other");
    }

    #[test]
    fn per_cell_descriptions() {
        let dofs: IndexMap<String, Node> = serde_yaml::from_str(r#"
triangle: {vertices: point evaluations}
quadrilateral:
  facets: {interval: tangential moments}
"#).unwrap();

        assert_eq!(descriptions(&dofs, &catalog()).unwrap(),
            "On each vertex (triangle): point evaluations<br />\n<br />\n\
            On each facet (interval) (quadrilateral): tangential moments");
    }

    #[test]
    fn unknown_spaces_fail() {
        let dofs: IndexMap<String, Node> =
            serde_yaml::from_str("edges: integral moment with (nedelec, k)").unwrap();

        let error = descriptions(&dofs, &catalog()).unwrap_err();
        assert!(error.mentions("nedelec"));
    }
}
