use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;

use defelement::catalog::{Categoriser, HistoryProvider, NameFilter};
use defelement::error::Result;
use defelement::markup::{Markup, NoPlots};

struct FixedHistory;

impl HistoryProvider for FixedHistory {
    fn commits(&self, path: &str) -> Result<Vec<DateTime<Utc>>> {
        let day = |d| Utc.with_ymd_and_hms(2022, 3, d, 12, 0, 0).unwrap();
        Ok(match path {
            "elements/raviart-thomas.def" => vec![day(20), day(2)],
            "elements/lagrange.def" => vec![day(9), day(1)],
            _ => vec![day(5)],
        })
    }
}

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn site(root: &Path) {
    write(root, "data/categories", "scalar: Scalar-valued elements\nvector: Vector-valued elements\n");
    write(root, "data/references", "interval\ntriangle\ntetrahedron\n");
    write(root, "data/implementations.yml", r#"
basix:
  name: Basix
  url: https://github.com/FEniCS/basix
  template: basix.create_element({string}{params})
"#);
    write(root, "data/families.yml", r#"
de-rham:
  P:
    arnold-logg: \mathcal{P}
    cockburn-fu: \mathcal{P}
  RT:
    arnold-logg: \mathcal{P}^-
    cockburn-fu: \mathcal{P}^-
"#);

    write(root, "elements/lagrange.def", r#"
name: Lagrange
html-name: Lagrange
min-order: 1
reference-elements: [interval, triangle, tetrahedron]
categories: [scalar]
complexes:
  de-rham: P,H1,simplex
dofs:
  vertices: point evaluations
  edges: point evaluations
implementations:
  basix: P degree=k
notes:
  - Also known as *continuous Galerkin*.
"#);

    write(root, "elements/raviart-thomas.def", r#"
name: Raviart-Thomas
html-name: Raviart&ndash;Thomas
min-order: 1
max-order: {triangle: 3}
reference-elements: [triangle, tetrahedron]
categories: [vector]
alt-names: [(RT), Nedelec first kind H(div)]
complexes:
  de-rham: RT,Hdiv,simplex
dofs:
  facets: normal integral moment with (lagrange, k-1)
  cell: integral moment with {1}
implementations:
  basix:
    triangle: RT degree=k
"#);

    write(root, "elements/taylor-hood.def", r#"
name: Taylor-Hood
reference-elements: [triangle]
categories: [vector]
mixed: [lagrange(k+1), lagrange(k)]
"#);

    write(root, "elements/.draft.def", "name: [not valid");
}

fn load(root: &Path) -> Categoriser {
    let data = root.join("data");
    let mut catalog = Categoriser::new();
    catalog.load_categories(&data.join("categories")).unwrap();
    catalog.load_implementations(&data.join("implementations.yml")).unwrap();
    catalog.load_families(&data.join("families.yml")).unwrap();
    catalog.load_references(&data.join("references")).unwrap();
    catalog.load_elements(&root.join("elements"), Some(&FixedHistory)).unwrap();
    catalog
}

#[test]
fn catalogue_loads_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    let catalog = load(dir.path());

    let names: Vec<_> = catalog.elements().iter().map(|e| e.name()).collect();
    assert_eq!(names, ["Lagrange", "Raviart-Thomas", "Taylor-Hood"]);

    let vector: Vec<_> = catalog.elements_in_category("vector").iter().map(|e| e.filename()).collect();
    assert_eq!(vector, ["raviart-thomas", "taylor-hood"]);

    let rt = catalog.get_element("Raviart-Thomas").unwrap();
    assert_eq!(rt.order_range(), "triangle: \\(1\\leqslant k\\leqslant 3\\)<br />\n\
        tetrahedron: \\(1\\leqslant k\\)");
    assert_eq!(rt.max_order("triangle"), Some(3));
    assert_eq!(rt.max_order("tetrahedron"), None);

    let names = rt.alternative_names(&catalog, &NameFilter { link: false, ..Default::default() }).unwrap();
    assert_eq!(names, [
        "RT",
        "Nedelec first kind H(div)",
        "\\(\\mathcal{P}^-_{k}\\Lambda^{d-1}(\\Delta_d)\\)",
        "\\(\\mathcal{P}^-_{k}^{d-1}(\\Delta_d)\\)",
    ]);

    let dofs = rt.dof_descriptions(&catalog).unwrap();
    assert!(dofs.contains("On each facet: normal integral moment with an order \\(k-1\\) \
        <a href='/elements/lagrange.html'>Lagrange</a> space"));

    let family = catalog.family("de-rham", "RT").unwrap();
    assert_eq!(family.member("k", "Hdiv").unwrap().name, "Raviart&ndash;Thomas");
}

#[test]
fn history_sets_timestamps() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    let catalog = load(dir.path());

    let rt = catalog.get_element("Raviart-Thomas").unwrap();
    assert_eq!(rt.created(), Some(Utc.with_ymd_and_hms(2022, 3, 2, 12, 0, 0).unwrap()));
    assert_eq!(rt.modified(), Some(Utc.with_ymd_and_hms(2022, 3, 20, 12, 0, 0).unwrap()));

    let added: Vec<_> = catalog.recently_added(2).iter().map(|e| e.name()).collect();
    assert_eq!(added, ["Taylor-Hood", "Raviart-Thomas"]);
    let updated: Vec<_> = catalog.recently_updated(3).iter().map(|e| e.name()).collect();
    assert_eq!(updated, ["Raviart-Thomas", "Lagrange", "Taylor-Hood"]);
}

#[test]
fn implementations_render() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    let catalog = load(dir.path());
    let basix = catalog.library("basix").unwrap();

    let lagrange = catalog.get_element("Lagrange").unwrap();
    assert_eq!(lagrange.implementation_html("basix", basix, "<br />").unwrap(),
        "<code>basix.create_element(P, degree=k)</code>");

    let rt = catalog.get_element("Raviart-Thomas").unwrap();
    assert_eq!(rt.get_implementation_string("basix", Some("tetrahedron"), None).unwrap(), None);
    let implemented: Vec<_> = catalog.elements_in_implementation("basix").iter().map(|e| e.name()).collect();
    assert_eq!(implemented, ["Lagrange", "Raviart-Thomas"]);
}

#[test]
fn element_notes_render_as_markup() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    let catalog = load(dir.path());

    let markup = Markup::new().plotter(&NoPlots);
    let lagrange = catalog.get_element("Lagrange").unwrap();
    let notes: Vec<String> = lagrange.notes().map(|n| markup.render(n).unwrap()).collect();
    assert_eq!(notes, ["<p>Also known as <em>continuous Galerkin</em>. </p>\n"]);
}

#[test]
fn broken_mixed_elements_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());
    write(dir.path(), "elements/broken.def", "name: Broken\nmixed: [nedelec(1)]\n");

    let data = dir.path().join("data");
    let mut catalog = Categoriser::new();
    catalog.load_categories(&data.join("categories")).unwrap();
    catalog.load_families(&data.join("families.yml")).unwrap();
    catalog.load_references(&data.join("references")).unwrap();
    let error = catalog.load_elements(&dir.path().join("elements"), None).unwrap_err();
    assert!(error.mentions("nedelec"));
}

#[test]
fn unregistered_reference_cells_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    site(dir.path());

    let mut catalog = Categoriser::new();
    catalog.load_categories(&dir.path().join("data/categories")).unwrap();
    catalog.load_references("triangle\ntetrahedron").unwrap();
    let error = catalog.load_elements(&dir.path().join("elements"), None).unwrap_err();
    assert!(error.mentions("interval"));
    assert!(error.mentions("Lagrange"));
}
