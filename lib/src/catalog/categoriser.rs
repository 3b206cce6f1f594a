use std::path::Path;

use chrono::Utc;
use indexmap::IndexMap;
use rayon::prelude::*;

use crate::catalog::family::{Family, Member};
use crate::catalog::history::{HistoryProvider, Timestamps};
use crate::catalog::implementation::Library;
use crate::catalog::Element;
use crate::error::{Chainable, Result};
use crate::source::{read_structured, Source};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub filename: String,
}

/// Complex type -> family key -> family.
pub type Families = IndexMap<String, IndexMap<String, Family>>;

/// Every element of a build, and the registries they refer to.
///
/// Populated by the `load_*` methods, in the order categories,
/// implementations, families, references, elements. Read-only afterwards.
#[derive(Debug, Default)]
pub struct Categoriser {
    elements: Vec<Element>,
    categories: IndexMap<String, Category>,
    references: IndexMap<String, String>,
    families: Families,
    libraries: IndexMap<String, Library>,
}

impl Categoriser {
    pub fn new() -> Self {
        Categoriser::default()
    }

    /// Reads `id: Display Name` lines. A line without a `:` fails the load,
    /// and then no category from the input is registered.
    pub fn load_categories<I: Source>(&mut self, input: I) -> Result<()> {
        let path = input.path().map(|p| p.display().to_string());
        let content = input.read()?;
        let categories = content.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| match line.split_once(':') {
                Some((id, name)) => Ok((id.trim(), name.trim())),
                None => err! {
                    "category lines must be `id: name`",
                    "line" => i + 1,
                    "content" => line,
                    "file path" => path.as_deref().unwrap_or("<inline>"),
                },
            })
            .collect::<Result<Vec<_>>>()?;

        for (id, name) in categories {
            self.add_category(id, name);
        }

        tracing::debug!(count = self.categories.len(), "loaded categories");
        Ok(())
    }

    pub fn add_category(&mut self, id: &str, name: &str) {
        let category = Category { name: name.into(), filename: format!("{id}.html") };
        self.categories.insert(id.into(), category);
    }

    /// Reads one reference cell id per line.
    pub fn load_references<I: Source>(&mut self, input: I) -> Result<()> {
        let content = input.read()?;
        content.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .for_each(|id| self.add_reference(id));

        tracing::debug!(count = self.references.len(), "loaded reference cells");
        Ok(())
    }

    pub fn add_reference(&mut self, id: &str) {
        self.references.insert(id.into(), format!("{id}.html"));
    }

    pub fn load_families<I: Source>(&mut self, input: I) -> Result<()> {
        let mut families: Families = read_structured(input)?;
        families.values_mut()
            .flat_map(|families| families.values_mut())
            .for_each(|family| family.elements.clear());

        tracing::debug!(count = families.values().map(|f| f.len()).sum::<usize>(), "loaded families");
        self.families = families;
        Ok(())
    }

    pub fn load_implementations<I: Source>(&mut self, input: I) -> Result<()> {
        self.libraries = read_structured(input)?;
        tracing::debug!(count = self.libraries.len(), "loaded implementation libraries");
        Ok(())
    }

    /// Loads every non-hidden `.def` file directly in `dir`.
    ///
    /// With a history provider, each element's timestamps are fetched from
    /// the history of `<dir name>/<id>.def`. Without one, they stay unset.
    pub fn load_elements(&mut self, dir: &Path, history: Option<&dyn HistoryProvider>) -> Result<()> {
        let mut paths = vec![];
        for entry in jwalk::WalkDir::new(dir).min_depth(1).max_depth(1).skip_hidden(false).sort(true) {
            let entry = entry.chain_with(|| error!("failed to list elements", "directory" => dir.display()))?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_file() && name.ends_with(".def") && !name.starts_with('.') {
                paths.push(entry.path());
            }
        }

        let elements = paths.par_iter()
            .map(|path| Element::load(path))
            .collect::<Result<Vec<_>>>()?;

        let loaded = elements.len();
        for element in elements {
            let name = element.name().to_string();
            self.add_element(element)
                .chain_with(|| error!("failed to add element", "element" => name))?;
        }

        match history {
            Some(history) => {
                let dir_name = dir.file_name().and_then(|n| n.to_str()).unwrap_or("elements");
                let now = Utc::now();
                self.elements.par_iter().try_for_each(|element| -> Result<()> {
                    let path = format!("{dir_name}/{}.def", element.filename());
                    let commits = history.commits(&path)
                        .chain_with(|| error!("failed to fetch element history", "path" => &path))?;

                    element.set_timestamps(Timestamps::from_commits(&commits, now));
                    Ok(())
                })?;
            }
            None => tracing::warn!("building without a history provider: timestamps will not be set"),
        }

        tracing::info!(count = loaded, "loaded elements");
        self.finish()
    }

    /// Adds `element`, registering it with the families it belongs to.
    ///
    /// Fails without adding anything if the element uses a reference cell or
    /// category that is not registered. Unknown complex types and families
    /// are created, with a warning.
    pub fn add_element(&mut self, element: Element) -> Result<()> {
        for reference in element.reference_ids() {
            if !self.references.contains_key(reference) {
                return err! {
                    "element uses an unregistered reference cell",
                    "element" => element.name(),
                    "reference" => reference,
                };
            }
        }

        for category in element.category_ids() {
            if !self.categories.contains_key(category) {
                return err! {
                    "element is in an unregistered category",
                    "element" => element.name(),
                    "category" => category,
                };
            }
        }

        for (kind, entry) in element.complex_entries()? {
            let families = self.families.entry(kind.to_string()).or_insert_with(|| {
                tracing::warn!(complex = kind, "complex type is not in the families data");
                IndexMap::new()
            });

            let family = families.entry(entry.family.clone()).or_insert_with(|| {
                tracing::warn!(complex = kind, family = %entry.family, "family is not in the families data");
                Family::default()
            });

            let member = Member { name: element.html_name().into(), filename: element.html_filename() };
            if let Some(existing) = family.register(&entry, member) {
                tracing::warn!(
                    element = element.name(),
                    existing = %existing.name,
                    slot = %entry,
                    "family slot is already taken"
                );
            }
        }

        self.elements.push(element);
        Ok(())
    }

    /// Sorts the elements by name and checks that mixed elements only use
    /// known elements.
    pub fn finish(&mut self) -> Result<()> {
        self.elements.sort_by_cached_key(|e| e.name().to_lowercase());
        for element in self.elements.iter().filter(|e| e.is_mixed()) {
            for part in element.mixed_parts()? {
                if !self.elements.iter().any(|e| e.filename() == part.filename) {
                    return err! {
                        "mixed element uses an unknown element",
                        "element" => element.name(),
                        "part" => part.filename,
                    };
                }
            }
        }

        Ok(())
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn categories(&self) -> &IndexMap<String, Category> {
        &self.categories
    }

    /// Reference cell ids and their list filenames.
    pub fn references(&self) -> &IndexMap<String, String> {
        &self.references
    }

    pub fn families(&self) -> &Families {
        &self.families
    }

    pub fn libraries(&self) -> &IndexMap<String, Library> {
        &self.libraries
    }

    pub fn elements_in_category(&self, category: &str) -> Vec<&Element> {
        self.elements.iter()
            .filter(|e| e.category_ids().iter().any(|c| c == category))
            .collect()
    }

    pub fn elements_in_implementation(&self, library: &str) -> Vec<&Element> {
        self.elements.iter().filter(|e| e.implemented(library)).collect()
    }

    pub fn elements_by_reference(&self, reference: &str) -> Vec<&Element> {
        self.elements.iter()
            .filter(|e| e.reference_ids().iter().any(|r| r == reference))
            .collect()
    }

    pub fn get_element(&self, name: &str) -> Result<&Element> {
        match self.elements.iter().find(|e| e.name() == name) {
            Some(element) => Ok(element),
            None => err!("could not find element", "name" => name),
        }
    }

    pub fn element_by_filename(&self, filename: &str) -> Result<&Element> {
        match self.elements.iter().find(|e| e.filename() == filename) {
            Some(element) => Ok(element),
            None => err!("could not find space", "element" => filename),
        }
    }

    /// The display name of the element with id `filename`, optionally as a
    /// link to its page.
    pub fn get_space_name(&self, filename: &str, link: bool) -> Result<String> {
        let element = self.element_by_filename(filename)?;
        Ok(if link { element.html_link() } else { element.html_name().to_string() })
    }

    pub fn get_category_name(&self, id: &str) -> Result<&str> {
        match self.categories.get(id) {
            Some(category) => Ok(category.name.as_str()),
            None => err!("unknown category", "category" => id),
        }
    }

    pub fn family(&self, kind: &str, key: &str) -> Result<&Family> {
        match self.families.get(kind).and_then(|families| families.get(key)) {
            Some(family) => Ok(family),
            None => err!("unknown family", "complex" => kind, "family" => key),
        }
    }

    pub fn library(&self, id: &str) -> Result<&Library> {
        match self.libraries.get(id) {
            Some(library) => Ok(library),
            None => err!("unknown implementation library", "library" => id),
        }
    }

    /// The `n` most recently created elements, newest first.
    ///
    /// Without timestamps this is the first `n` elements by name.
    pub fn recently_added(&self, n: usize) -> Vec<&Element> {
        self.most_recent(n, Element::created)
    }

    /// The `n` most recently modified elements, newest first.
    pub fn recently_updated(&self, n: usize) -> Vec<&Element> {
        self.most_recent(n, Element::modified)
    }

    fn most_recent<K: Ord>(&self, n: usize, key: impl Fn(&Element) -> Option<K>) -> Vec<&Element> {
        let mut elements: Vec<&Element> = self.elements.iter().collect();
        if elements.first().map_or(true, |e| key(e).is_none()) {
            elements.truncate(n);
            return elements;
        }

        elements.sort_by(|a, b| key(b).cmp(&key(a)));
        elements.truncate(n);
        elements
    }
}
