use std::path::{Path, PathBuf};

use defelement::catalog::{Categoriser, HistoryProvider};
use defelement::error;
use defelement::error::{Chainable, Result};

use crate::config::Settings;
use crate::util::dircheck;
use crate::{CATEGORIES_FILE, FAMILIES_FILE, IMPLEMENTATIONS_FILE, REFERENCES_FILE};

/// A loaded site: its settings and the full catalogue.
#[derive(Debug)]
pub struct Site {
    pub settings: Settings,
    pub catalog: Categoriser,
}

impl Site {
    /// Loads the registries in dependency order, then the elements.
    pub fn load(root: &Path, settings: Settings, history: Option<&dyn HistoryProvider>) -> Result<Self> {
        dircheck(root, "site", true)?;
        dircheck(&settings.data, "data", true)?;
        dircheck(&settings.elements, "elements", true)?;

        let data = &settings.data;
        let mut catalog = Categoriser::new();
        catalog.load_categories(&data.join(CATEGORIES_FILE))?;
        catalog.load_implementations(&data.join(IMPLEMENTATIONS_FILE))?;
        catalog.load_families(&data.join(FAMILIES_FILE))?;
        catalog.load_references(&data.join(REFERENCES_FILE))?;
        catalog.load_elements(&settings.elements, history)
            .chain_with(|| error!("failed to load elements", "directory" => settings.elements.display()))?;

        Ok(Site { settings, catalog })
    }

    /// The markup pages, `*.md` directly in the pages directory, sorted.
    /// Includes (names starting with `_`) and hidden files are skipped.
    pub fn pages(&self) -> Result<Vec<PathBuf>> {
        let Some(dir) = dircheck(&self.settings.pages, "pages", false)? else {
            return Ok(vec![]);
        };

        let mut pages = vec![];
        for entry in jwalk::WalkDir::new(dir).min_depth(1).max_depth(1).skip_hidden(false).sort(true) {
            let entry = entry.chain_with(|| error!("failed to list pages", "directory" => dir.display()))?;
            let name = entry.file_name().to_string_lossy();
            if entry.file_type().is_file() && name.ends_with(".md") && !name.starts_with(['.', '_']) {
                pages.push(entry.path());
            }
        }

        Ok(pages)
    }
}

/// Writes a small site under `root`.
#[cfg(test)]
pub fn fixture(root: &Path) {
    let data = root.join("data");
    let elements = root.join("elements");
    let pages = root.join("pages");
    for dir in [&data, &elements, &pages] {
        std::fs::create_dir_all(dir).unwrap();
    }

    std::fs::write(data.join("categories"), "scalar: Scalar elements\n").unwrap();
    std::fs::write(data.join("references"), "interval\ntriangle\n").unwrap();
    std::fs::write(data.join("families.yml"), "de-rham:\n  P:\n    arnold-logg: \\mathcal{P}\n").unwrap();
    std::fs::write(data.join("implementations.yml"), "basix:\n  name: Basix\n").unwrap();
    std::fs::write(elements.join("lagrange.def"), "name: Lagrange\n\
        reference-elements: [interval, triangle]\ncategories: [scalar]\n\
        complexes: {de-rham: \"P,H1,simplex\"}\n").unwrap();
    std::fs::write(pages.join("about.md"), "# About\nA catalogue.").unwrap();
    std::fs::write(pages.join("_footer.md"), "included only").unwrap();
    std::fs::write(pages.join("v1.2.md"), "Cite as {{list contributors|bibtex}}.").unwrap();
    std::fs::write(pages.join("team.md"), "{{list contributors}}").unwrap();
    std::fs::write(data.join("contributors"), "- name: Scroggs, Matthew W.\n  github: mscroggs\n\
        - name: Lee, Alice\n").unwrap();
}
