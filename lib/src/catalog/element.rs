use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use once_cell::sync::OnceCell;

use crate::catalog::dofs;
use crate::catalog::history::Timestamps;
use crate::catalog::implementation::{split_params, ImplementationError, Library, Params};
use crate::catalog::record::{ComplexEntry, MixedPart, Node, OrderBound, Record};
use crate::catalog::Categoriser;
use crate::error::{Chainable, Result};
use crate::markup::Citation;
use crate::source::{Format, Source, Yaml};

/// One catalogue entry.
///
/// Elements do not point back at the [`Categoriser`] that owns them: views
/// that need other entries take it as an argument.
#[derive(Debug)]
pub struct Element {
    record: Record,
    filename: String,
    timestamps: OnceCell<Timestamps>,
}

/// Which alternative names [`Element::alternative_names()`] returns, and how.
#[derive(Debug, Clone, Copy)]
pub struct NameFilter<'a> {
    /// Turns `(name)` into `name`. Otherwise such names are kept verbatim.
    pub strip_brackets: bool,
    /// Adds the names of the families the element belongs to.
    pub include_complexes: bool,
    pub include_variants: bool,
    /// Links family names to their family page.
    pub link: bool,
    /// Drops a trailing ` (cell)` qualifier.
    pub strip_cell_name: bool,
    /// Keeps only unqualified names and names qualified with this cell.
    pub cell: Option<&'a str>,
}

impl Default for NameFilter<'_> {
    fn default() -> Self {
        NameFilter {
            strip_brackets: true,
            include_complexes: true,
            include_variants: true,
            link: true,
            strip_cell_name: false,
            cell: None,
        }
    }
}

impl Element {
    pub fn new(record: Record, filename: impl Into<String>) -> Self {
        Element { record, filename: filename.into(), timestamps: OnceCell::new() }
    }

    /// Reads the `.def` file at `path`; the file stem is the element's id.
    pub fn load(path: &Path) -> Result<Self> {
        let Some(filename) = path.file_stem().and_then(|s| s.to_str()) else {
            return err!("element file name is not valid UTF-8", "path" => path.display());
        };

        let record: Record = Yaml::read(path)?;
        Ok(Element::new(record, filename))
    }

    pub fn from_yaml<I: Source>(input: I, filename: &str) -> Result<Self> {
        let record: Record = Yaml::read(input)
            .chain_with(|| error!("invalid element definition", "element" => filename))?;

        Ok(Element::new(record, filename))
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn html_name(&self) -> &str {
        self.record.html_name.as_ref().unwrap_or(&self.record.name).as_str()
    }

    pub fn html_filename(&self) -> String {
        format!("{}.html", self.filename)
    }

    pub fn html_link(&self) -> String {
        format!("<a href='/elements/{}'>{}</a>", self.html_filename(), self.html_name())
    }

    pub fn notes(&self) -> impl Iterator<Item = &str> {
        self.record.notes.iter().map(|n| n.as_str())
    }

    pub fn examples(&self) -> impl Iterator<Item = &str> {
        self.record.examples.iter().map(|e| e.as_str())
    }

    pub fn is_test(&self) -> bool {
        self.record.test.is_some()
    }

    pub fn is_mixed(&self) -> bool {
        self.record.mixed.is_some()
    }

    pub fn mapping(&self) -> Option<&str> {
        self.record.mapping.as_ref().map(|m| m.as_str())
    }

    pub fn sobolev(&self) -> Option<&str> {
        self.record.sobolev.as_ref().map(|s| s.as_str())
    }

    pub fn timestamps(&self) -> Option<&Timestamps> {
        self.timestamps.get()
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.timestamps().map(|t| t.created)
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.timestamps().map(|t| t.modified)
    }

    /// Sets the timestamps. Only the first call has an effect.
    pub fn set_timestamps(&self, timestamps: Timestamps) -> bool {
        self.timestamps.set(timestamps).is_ok()
    }

    /// `variant-name: description` for each variant.
    pub fn variants(&self) -> Vec<String> {
        self.record.variants.values()
            .map(|v| match &v.description {
                Some(description) => format!("{}: {description}", v.variant_name),
                None => v.variant_name.to_string(),
            })
            .collect()
    }

    pub fn variant_name(&self, variant: &str) -> Result<&str> {
        match self.record.variants.get(variant) {
            Some(v) => Ok(v.variant_name.as_str()),
            None => err!("unknown variant", "element" => self.name(), "variant" => variant),
        }
    }

    pub fn name_with_variant(&self, variant: Option<&str>) -> Result<String> {
        match variant {
            Some(v) => Ok(format!("{} ({} variant)", self.name(), self.variant_name(v)?)),
            None => Ok(self.name().to_string()),
        }
    }

    pub fn min_order(&self, cell: &str) -> u32 {
        self.record.min_order.as_ref().and_then(|b| b.on(cell)).unwrap_or(0)
    }

    pub fn max_order(&self, cell: &str) -> Option<u32> {
        self.record.max_order.as_ref().and_then(|b| b.on(cell))
    }

    /// The allowed orders as inline math, one line per cell if the bounds
    /// differ by cell.
    pub fn order_range(&self) -> String {
        fn range(min: u32, max: Option<u32>) -> String {
            match max {
                None => format!("\\({min}\\leqslant k\\)"),
                Some(max) if max == min => format!("\\(k={min}\\)"),
                Some(max) => format!("\\({min}\\leqslant k\\leqslant {max}\\)"),
            }
        }

        let (min, max) = (self.record.min_order.as_ref(), self.record.max_order.as_ref());
        let references = &self.record.reference_elements;
        let cells: Vec<&str> = match (min, max) {
            (Some(OrderBound::PerCell(_)), _) | (_, Some(OrderBound::PerCell(_))) if !references.is_empty() => {
                references.iter().map(|c| c.as_str()).collect()
            }
            (Some(OrderBound::PerCell(per_cell)), _) => per_cell.keys().map(|c| c.as_str()).collect(),
            (_, Some(OrderBound::PerCell(per_cell))) => per_cell.keys().map(|c| c.as_str()).collect(),
            _ => {
                let min = min.and_then(|b| b.on("")).unwrap_or(0);
                return range(min, max.and_then(|b| b.on("")));
            }
        };

        cells.iter()
            .map(|cell| format!("{cell}: {}", range(self.min_order(cell), self.max_order(cell))))
            .collect::<Vec<_>>()
            .join("<br />\n")
    }

    /// The reference cells, optionally linked to their lists.
    pub fn reference_elements(&self, link: bool) -> Vec<String> {
        self.record.reference_elements.iter()
            .map(|r| if link {
                format!("<a href='/lists/references/{r}.html'>{r}</a>")
            } else {
                r.clone()
            })
            .collect()
    }

    pub fn reference_ids(&self) -> &[String] {
        &self.record.reference_elements
    }

    pub fn category_ids(&self) -> &[String] {
        &self.record.categories
    }

    /// Parsed complex memberships, with the complex type each is in.
    pub fn complex_entries(&self) -> Result<Vec<(&str, ComplexEntry)>> {
        let mut out = vec![];
        for (kind, entries) in &self.record.complexes {
            for entry in entries.as_slice() {
                let entry = entry.parse::<ComplexEntry>()
                    .chain_with(|| error!("invalid complex entry", "element" => self.name()))?;

                out.push((kind.as_str(), entry));
            }
        }

        Ok(out)
    }

    pub fn mixed_parts(&self) -> Result<Vec<MixedPart>> {
        let Some(parts) = &self.record.mixed else {
            return err!("element is not mixed", "element" => self.name());
        };

        parts.iter().map(|p| p.parse::<MixedPart>()).collect()
    }

    /// Declared, family, and variant names, filtered by `filter`.
    pub fn alternative_names(&self, catalog: &Categoriser, filter: &NameFilter<'_>) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.record.alt_names.iter().map(|n| n.to_string()).collect();
        if filter.include_complexes {
            names.extend(self.family_names(catalog, filter.link)?);
        }

        if filter.include_variants {
            for variant in self.record.variants.values() {
                names.extend(variant.names.iter()
                    .map(|n| format!("{n} ({} variant)", variant.variant_name)));
            }
        }

        if filter.strip_brackets {
            names = names.into_iter()
                .map(|n| match n.strip_prefix('(').and_then(|n| n.strip_suffix(')')) {
                    Some(inner) => inner.to_string(),
                    None => n,
                })
                .collect();
        }

        if let Some(cell) = filter.cell {
            names.retain(|n| !n.contains(" (") || n.contains(cell));
        }

        if filter.strip_cell_name {
            for name in &mut names {
                if let Some(i) = name.find(" (") {
                    name.truncate(i);
                }
            }
        }

        Ok(names)
    }

    pub fn short_names(&self, include_variants: bool) -> Vec<String> {
        let mut names: Vec<String> = self.record.short_names.iter().map(|n| n.to_string()).collect();
        if include_variants {
            for variant in self.record.variants.values() {
                names.extend(variant.short_names.iter()
                    .map(|n| format!("{n} ({} variant)", variant.variant_name)));
            }
        }

        names
    }

    /// Each family name of the element, in every notation its family has.
    pub fn family_names(&self, catalog: &Categoriser, link: bool) -> Result<Vec<String>> {
        let mut out = vec![];
        for (kind, entry) in self.complex_entries()? {
            let family = catalog.family(kind, &entry.family)?;
            for name in family.notations(&entry)? {
                out.push(family_link(&entry.family, name, link));
            }
        }

        Ok(out)
    }

    /// Complex memberships per complex type: raw entries, or their family
    /// names joined with ` / `.
    pub fn complexes(&self, catalog: &Categoriser, link: bool, names: bool)
        -> Result<IndexMap<String, Vec<String>>>
    {
        let mut out: IndexMap<String, Vec<String>> = IndexMap::new();
        if !names {
            for (kind, entries) in &self.record.complexes {
                out.insert(kind.clone(), entries.as_slice().to_vec());
            }

            return Ok(out);
        }

        for (kind, entry) in self.complex_entries()? {
            let family = catalog.family(kind, &entry.family)?;
            let label = family.notations(&entry)?.join(" / ");
            out.entry(kind.to_string()).or_default().push(family_link(&entry.family, label, link));
        }

        Ok(out)
    }

    /// The element's references, then those its families imply.
    pub fn references(&self, catalog: &Categoriser) -> Result<Vec<Citation>> {
        let mut out = self.record.references.clone();
        for (kind, entry) in self.complex_entries()? {
            for citation in catalog.family(kind, &entry.family)?.implied_references() {
                if !out.contains(&citation) {
                    out.push(citation);
                }
            }
        }

        Ok(out)
    }

    pub fn categories(&self, catalog: &Categoriser, link: bool, map_name: bool) -> Result<Vec<String>> {
        self.record.categories.iter()
            .map(|c| -> Result<String> {
                let name = if map_name { catalog.get_category_name(c)? } else { c.as_str() };
                Ok(if link {
                    format!("<a href='/lists/categories/{c}.html'>{name}</a>")
                } else {
                    name.to_string()
                })
            })
            .collect()
    }

    /// The components of a mixed element as list items.
    pub fn sub_elements(&self, catalog: &Categoriser, link: bool) -> Result<Vec<String>> {
        self.mixed_parts()?.iter()
            .map(|part| -> Result<String> {
                let space = catalog.get_space_name(&part.filename, link)?;
                Ok(format!("<li>order \\({}\\) {space} space</li>", part.order))
            })
            .collect()
    }

    pub fn dof_descriptions(&self, catalog: &Categoriser) -> Result<String> {
        match &self.record.dofs {
            Some(dofs) => dofs::descriptions(dofs, catalog)
                .chain_with(|| error!("invalid DOF description", "element" => self.name())),
            None => Ok(String::new()),
        }
    }

    pub fn dof_counts(&self) -> String {
        self.record.ndofs.as_ref().map(dofs::count_html).unwrap_or_default()
    }

    pub fn entity_dof_counts(&self) -> String {
        self.record.entity_ndofs.as_ref().map(dofs::count_html).unwrap_or_default()
    }

    /// The polynomial sets, grouping cells that share one. A set shared by
    /// every reference cell is shown without cell names.
    pub fn polynomial_set_html(&self) -> String {
        let mut sets: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for (cell, set) in &self.record.polynomial_set {
            sets.entry(set.as_str()).or_default().push(cell);
        }

        let cells = self.record.reference_elements.len();
        match sets.first() {
            Some((set, with)) if sets.len() == 1 && cells > 0 && with.len() == cells => {
                format!("\\({set}\\)<br />")
            }
            _ => sets.iter()
                .map(|(set, with)| format!("\\({set}\\) ({})<br />\n", with.join(", ")))
                .collect(),
        }
    }

    pub fn implemented(&self, library: &str) -> bool {
        self.record.implementations.contains_key(library)
    }

    /// The implementation string for `library`, split into the string and
    /// its `key=value` parameters.
    ///
    /// `Ok(None)` means the implementation is given per cell and there is
    /// none for `reference`.
    pub fn get_implementation_string(
        &self,
        library: &str,
        reference: Option<&str>,
        variant: Option<&str>,
    ) -> Result<Option<(String, Params)>, ImplementationError> {
        let Some(data) = self.record.implementations.get(library) else {
            return Err(ImplementationError::NotImplemented { library: library.into() });
        };

        let data = match variant {
            Some(variant) => data.get(variant).ok_or_else(|| ImplementationError::VariantNotImplemented {
                library: library.into(),
                variant: variant.into(),
            })?,
            None => data,
        };

        let string = match data {
            Node::Text(string) => string.as_str(),
            Node::Map(per_cell) => match reference.and_then(|r| per_cell.get(r)) {
                Some(Node::Text(string)) => string.as_str(),
                _ => return Ok(None),
            },
            Node::List(_) => return Ok(None),
        };

        Ok(Some(split_params(string)))
    }

    /// Distinct formatted snippets for `library`, each with the cells and
    /// variants it is used for.
    pub fn list_of_implementation_strings(&self, library: &str, lib: &Library)
        -> Result<IndexMap<String, Vec<String>>>
    {
        let Some(data) = self.record.implementations.get(library) else {
            return Err(ImplementationError::NotImplemented { library: library.into() }.into());
        };

        let mut snippets: IndexMap<String, Vec<String>> = IndexMap::new();
        if let Some(display) = data.get("display").and_then(Node::as_text) {
            snippets.insert(lib.format(display, &Params::new()), vec![]);
            return Ok(snippets);
        }

        let variants: Vec<(Option<&str>, &str)> = match data {
            Node::Map(_) if !self.record.variants.is_empty() => self.record.variants.iter()
                .map(|(id, v)| (Some(id.as_str()), v.variant_name.as_str()))
                .collect(),
            _ => vec![(None, "")],
        };

        for (variant, variant_name) in variants {
            let data = match variant {
                Some(v) => match data.get(v) {
                    Some(data) => data,
                    None => continue,
                },
                None => data,
            };

            let cells: Vec<Option<&str>> = match data {
                Node::Map(per_cell) => per_cell.keys().map(|c| Some(c.as_str())).collect(),
                _ => vec![None],
            };

            for cell in cells {
                let Some((string, params)) = self.get_implementation_string(library, cell, variant)? else {
                    continue;
                };

                let label = match (cell, variant) {
                    (Some(cell), Some(_)) => format!("{cell}, {variant_name}"),
                    (Some(cell), None) => cell.to_string(),
                    (None, _) => variant_name.to_string(),
                };

                snippets.entry(lib.format(&string, &params)).or_default().push(label);
            }
        }

        Ok(snippets)
    }

    /// The snippets for `library` as HTML: one `<code>` block if they all
    /// agree, otherwise each labelled and joined with `joiner`.
    pub fn implementation_html(&self, library: &str, lib: &Library, joiner: &str) -> Result<String> {
        let snippets = self.list_of_implementation_strings(library, lib)?;
        if snippets.len() == 1 {
            if let Some((snippet, _)) = snippets.first() {
                return Ok(format!("<code>{snippet}</code>"));
            }
        }

        Ok(snippets.iter()
            .map(|(snippet, labels)| {
                format!("<code>{snippet}</code> <span style='font-size:60%'>({})</span>", labels.join("; "))
            })
            .collect::<Vec<_>>()
            .join(joiner))
    }
}

fn family_link(family: &str, label: String, link: bool) -> String {
    if link {
        format!("<a class='nou' href='/families/{family}.html'>{label}</a>")
    } else {
        label
    }
}
