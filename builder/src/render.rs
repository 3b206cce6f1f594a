use std::fmt::Write;
use std::path::Path;

use defelement::catalog::{Element, Family, Library, NameFilter};
use defelement::error;
use defelement::error::{Chainable, Result};
use defelement::markup::{Contributors, Markup, Plotter};
use defelement::rayon::prelude::*;
use defelement::util::heading_with_self_ref;

use crate::discover::Site;
use crate::util::{list_items, OutputPath};

impl Site {
    /// Renders every page and fragment into `output`.
    pub fn render(&self, plotter: &dyn Plotter, contributors: &dyn Contributors, output: &Path) -> Result<()> {
        let markup = Markup::new()
            .plotter(plotter)
            .contributors(contributors)
            .include_dir(&self.settings.pages)
            .symbols(self.settings.symbols.clone());

        self.pages()?.par_iter().try_for_each(|page| -> Result<()> {
            let html = markup.render(page.as_path())?;
            let Some(stem) = page.file_stem() else { return Ok(()) };
            output.join(format!("{}.html", stem.to_string_lossy())).write_html(&html)
        })?;

        self.catalog.elements().par_iter().try_for_each(|element| -> Result<()> {
            let html = self.element_fragment(&markup, element)
                .chain_with(|| error!("failed to render element", "element" => element.name()))?;

            output.join("elements").join(element.html_filename()).write_html(&html)
        })?;

        output.join("elements/index.html").write_html(&self.element_index())?;
        for id in self.catalog.categories().keys() {
            let path = output.join("lists/categories").join(format!("{id}.html"));
            path.write_html(&self.category_list(id)?)?;
        }

        for (cell, filename) in self.catalog.references() {
            let path = output.join("lists/references").join(filename);
            path.write_html(&self.reference_list(cell))?;
        }

        for (id, library) in self.catalog.libraries() {
            let path = output.join("lists/implementations").join(format!("{id}.html"));
            path.write_html(&self.implementation_list(id, library)?)?;
        }

        let mut families = String::new();
        for (kind, members) in self.catalog.families() {
            let _ = writeln!(families, "{}<ul>", heading_with_self_ref(2, kind));
            for (key, family) in members {
                let label = family.name.as_ref().map_or(key.as_str(), |n| n.as_str());
                let _ = writeln!(families, "<li><a href='/families/{key}.html'>{label}</a></li>");
                output.join("families").join(format!("{key}.html")).write_html(&family_page(key, family))?;
            }

            families.push_str("</ul>\n");
        }

        output.join("families/index.html").write_html(&families)?;
        output.join("lists/recent.html").write_html(&self.recent_list())?;

        tracing::info!(
            elements = self.catalog.elements().len(),
            output = %output.display(),
            "rendered site"
        );

        Ok(())
    }

    /// The summary table of one element, its notes, and its references.
    fn element_fragment(&self, markup: &Markup<'_>, element: &Element) -> Result<String> {
        let catalog = &self.catalog;
        let mut rows: Vec<(String, String)> = vec![];
        let mut row = |label: &str, value: String| {
            if !value.is_empty() {
                rows.push((label.to_string(), value));
            }
        };

        let names = element.alternative_names(catalog, &NameFilter::default())?;
        row("Orders", element.order_range());
        row("Reference elements", element.reference_elements(true).join(", "));
        row("Alternative names", names.join(", "));
        row("Abbreviated names", element.short_names(true).join(", "));
        row("Polynomial set", element.polynomial_set_html());
        row("DOFs", element.dof_descriptions(catalog)?);
        row("Number of DOFs", element.dof_counts());
        row("Number of DOFs on subentities", element.entity_dof_counts());
        row("Mapping", element.mapping().unwrap_or_default().to_string());
        row("Sobolev space", element.sobolev().unwrap_or_default().to_string());

        if element.is_mixed() {
            let parts = element.sub_elements(catalog, true)?;
            row("Sub-elements", format!("<ul>{}</ul>", parts.join("")));
        }

        let variants: Vec<String> = element.record().variants.values()
            .map(|v| match &v.description {
                Some(description) => format!("<b>{}</b>: {description}", v.variant_name),
                None => format!("<b>{}</b>", v.variant_name),
            })
            .collect();

        row("Variants", variants.join("<br />"));
        row("Categories", element.categories(catalog, true, true)?.join("<br />"));

        let complexes = element.complexes(catalog, true, true)?;
        let complexes: Vec<String> = complexes.iter()
            .map(|(kind, labels)| format!("{kind}: {}", labels.join(", ")))
            .collect();

        row("Complexes", complexes.join("<br />"));
        for (id, library) in catalog.libraries() {
            if element.implemented(id) {
                let label = match &library.url {
                    Some(url) => format!("<a href='{url}'>{}</a>", library.name),
                    None => library.name.to_string(),
                };

                row(&label, element.implementation_html(id, library, "<br />")?);
            }
        }

        let mut out = heading_with_self_ref(1, element.html_name());
        out.push_str("<table class='element-info'>\n");
        for (label, value) in &rows {
            let _ = writeln!(out, "<tr><td>{label}</td><td>{value}</td></tr>");
        }

        out.push_str("</table>\n");
        for note in element.notes() {
            out.push_str(&markup.render(note)?);
        }

        let examples: Vec<String> = element.examples()
            .map(|e| format!("<code>{e}</code>"))
            .collect();

        if !examples.is_empty() {
            out.push_str(&heading_with_self_ref(2, "Examples"));
            let _ = writeln!(out, "<ul>\n{}\n</ul>", list_items(&examples));
        }

        let references = element.references(catalog)?;
        if !references.is_empty() {
            out.push_str(&heading_with_self_ref(2, "References"));
            let items = references.iter().map(|r| r.to_html());
            let _ = writeln!(out, "<ul class='citations'>\n{}\n</ul>", list_items(items));
        }

        Ok(out)
    }

    fn element_index(&self) -> String {
        let links = self.catalog.elements().iter()
            .filter(|e| !e.is_test())
            .map(|e| e.html_link());

        format!("<ul>\n{}\n</ul>\n", list_items(links))
    }

    fn category_list(&self, id: &str) -> Result<String> {
        let name = self.catalog.get_category_name(id)?;
        let links = self.catalog.elements_in_category(id).into_iter().map(|e| e.html_link());
        Ok(format!("{}<ul>\n{}\n</ul>\n", heading_with_self_ref(1, name), list_items(links)))
    }

    fn reference_list(&self, cell: &str) -> String {
        let links = self.catalog.elements_by_reference(cell).into_iter().map(|e| e.html_link());
        let title = format!("Elements on a {cell}");
        format!("{}<ul>\n{}\n</ul>\n", heading_with_self_ref(1, &title), list_items(links))
    }

    fn implementation_list(&self, id: &str, library: &Library) -> Result<String> {
        let mut out = heading_with_self_ref(1, &library.name);
        if let Some(url) = &library.url {
            let _ = writeln!(out, "<p><a href='{url}'>{url}</a></p>");
        }

        if let Some(install) = &library.install {
            let _ = writeln!(out, "<p class='pcode'><code>{install}</code></p>");
        }

        let mut items = vec![];
        for element in self.catalog.elements_in_implementation(id) {
            let snippets = element.implementation_html(id, library, "<br />")?;
            items.push(format!("{}: {snippets}", element.html_link()));
        }

        let _ = writeln!(out, "<ul>\n{}\n</ul>", list_items(&items));
        Ok(out)
    }

    fn recent_list(&self) -> String {
        let recent = self.settings.recent;
        let dated = |e: &Element, date: Option<chrono::DateTime<chrono::Utc>>| match date {
            Some(date) => format!("{} ({})", e.html_link(), date.format("%d %B %Y")),
            None => e.html_link(),
        };

        let added = self.catalog.recently_added(recent).into_iter().map(|e| dated(e, e.created()));
        let updated = self.catalog.recently_updated(recent).into_iter().map(|e| dated(e, e.modified()));
        format!(
            "{}<ul>\n{}\n</ul>\n{}<ul>\n{}\n</ul>\n",
            heading_with_self_ref(2, "Recently added elements"),
            list_items(added),
            heading_with_self_ref(2, "Recently updated elements"),
            list_items(updated),
        )
    }
}

/// A family's notations and the elements filling its slots.
fn family_page(key: &str, family: &Family) -> String {
    let title = family.name.as_ref().map_or(key, |n| n.as_str());
    let mut out = heading_with_self_ref(1, title);
    if let Some(symbol) = &family.arnold_logg {
        let _ = writeln!(out, "<p>Arnold&ndash;Logg symbol: \\({symbol}\\)</p>");
    }

    if let Some(symbol) = &family.cockburn_fu {
        let _ = writeln!(out, "<p>Cockburn&ndash;Fu symbol: \\({symbol}\\)</p>");
    }

    out.push_str("<table class='family'>\n");
    for (degree, slots) in &family.elements {
        for (ext, member) in slots {
            let _ = writeln!(
                out,
                "<tr><td>\\({degree}\\)</td><td>{ext}</td>\
                <td><a href='/elements/{}'>{}</a></td></tr>",
                member.filename, member.name
            );
        }
    }

    out.push_str("</table>\n");
    out
}

#[cfg(test)]
mod tests {
    use defelement::markup::NoPlots;

    use crate::contributors::SiteContributors;

    use crate::config::Settings;
    use crate::discover::fixture;
    use super::*;

    fn read(path: &Path) -> String {
        std::fs::read_to_string(path).unwrap()
    }

    #[test]
    fn sites_render() {
        let site_dir = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        fixture(site_dir.path());

        let settings = Settings::load(site_dir.path(), None).unwrap();
        let site = Site::load(site_dir.path(), settings, None).unwrap();
        let contributors = SiteContributors::load(&site.settings.data.join("contributors"), None).unwrap();
        site.render(&NoPlots, &contributors, out.path()).unwrap();

        let about = read(&out.path().join("about.html"));
        assert!(about.starts_with("<h1 id=\"About\"><a href=\"#About\">About</a></h1>\n<p>A catalogue. </p>"));
        assert!(!out.path().join("_footer.html").exists());

        let release = read(&out.path().join("v1.2.html"));
        assert!(release.contains("<p>Cite as Scroggs, Matthew W. and Lee, Alice. </p>"));
        assert!(!out.path().join("v1.html").exists());

        let team = read(&out.path().join("team.html"));
        assert!(team.contains("<h2 id=\"Matthew+W.+Scroggs\">"));
        assert!(team.contains("&nbsp;mscroggs</a></div>"));

        let lagrange = read(&out.path().join("elements/lagrange.html"));
        assert!(lagrange.contains("<tr><td>Categories</td><td>\
            <a href='/lists/categories/scalar.html'>Scalar elements</a></td></tr>"));
        assert!(lagrange.contains("Periodic table of the finite elements"));
        assert!(!lagrange.contains("Mapping"));

        let category = read(&out.path().join("lists/categories/scalar.html"));
        assert!(category.contains("<li><a href='/elements/lagrange.html'>Lagrange</a></li>"));

        let triangle = read(&out.path().join("lists/references/triangle.html"));
        assert!(triangle.contains("Lagrange"));

        let basix = read(&out.path().join("lists/implementations/basix.html"));
        assert!(!basix.contains("Lagrange"));

        let family = read(&out.path().join("families/P.html"));
        assert!(family.contains("<td><a href='/elements/lagrange.html'>Lagrange</a></td>"));
        assert!(read(&out.path().join("families/index.html")).contains("/families/P.html"));

        let recent = read(&out.path().join("lists/recent.html"));
        assert!(recent.contains("<li><a href='/elements/lagrange.html'>Lagrange</a></li>"));
    }
}
