use std::path::{Path, PathBuf};

use serde::Deserialize;

use defelement::error;
use defelement::error::{Chainable, Result};
use defelement::markup::Symbols;
use defelement::source::{Format, Toml};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Settings {
    /// Registries: `categories`, `references`, `families.yml` and
    /// `implementations.yml`.
    pub data: PathBuf,
    /// Element records, one `.def` file each.
    pub elements: PathBuf,
    /// Markup pages, and what they include.
    pub pages: PathBuf,
    /// Pre-rendered plots.
    pub assets: PathBuf,
    /// The GitHub repository element history is read from, as `owner/name`.
    pub repository: String,
    pub github_token: Option<String>,
    /// How many elements the recently added and updated lists show.
    pub recent: usize,
    pub symbols: Symbols,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            data: "data".into(),
            elements: "elements".into(),
            pages: "pages".into(),
            assets: "img".into(),
            repository: "mscroggs/defelement.com".into(),
            github_token: None,
            recent: 10,
            symbols: Symbols::empty(),
        }
    }
}

impl Settings {
    /// Reads `config` (by default `<root>/config.toml`, if it exists) and
    /// resolves directories against `root`. `GITHUB_TOKEN` overrides the
    /// configured token.
    pub fn load(root: &Path, config: Option<&Path>) -> Result<Self> {
        let default_path = root.join(crate::CONFIG_FILE);
        let mut settings: Settings = match config {
            Some(path) => Toml::read(path)?,
            None if default_path.is_file() => Toml::read(&default_path)?,
            None => Settings::default(),
        };

        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            if !token.is_empty() {
                settings.github_token = Some(token);
            }
        }

        for dir in [&mut settings.data, &mut settings.elements, &mut settings.pages, &mut settings.assets] {
            if dir.is_relative() {
                *dir = root.join(&*dir);
            }
        }

        if settings.repository.split('/').filter(|s| !s.is_empty()).count() != 2 {
            return Err(error!("repository must be `owner/name`", "repository" => &settings.repository))
                .chain_with(|| error!("invalid settings", "site" => root.display()));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use defelement::markup::Symbol;

    use super::*;

    #[test]
    fn defaults_resolve_against_the_root() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.elements, dir.path().join("elements"));
        assert_eq!(settings.assets, dir.path().join("img"));
        assert_eq!(settings.recent, 10);
    }

    #[test]
    fn config_file_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.toml"), r#"
            elements = "defs"
            assets = "/srv/plots"
            recent = 3

            [symbols]
            reference = "T"
            entity = ["a", "b"]
        "#).unwrap();

        let settings = Settings::load(dir.path(), None).unwrap();
        assert_eq!(settings.elements, dir.path().join("defs"));
        assert_eq!(settings.assets, PathBuf::from("/srv/plots"));
        assert_eq!(settings.pages, dir.path().join("pages"));
        assert_eq!(settings.recent, 3);
        assert_eq!(settings.symbols.lookup("reference", None), Some("T"));
        assert_eq!(settings.symbols.lookup("entity", Some(1)), Some("b"));

        let mut expected = Symbols::empty();
        expected.insert("reference", Symbol::Text("T".into()));
        expected.insert("entity", Symbol::Indexed(vec!["a".into(), "b".into()]));
        assert_eq!(settings.symbols, expected);
    }

    #[test]
    fn bad_settings_fail() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("site.toml");
        std::fs::write(&config, "repository = \"defelement\"").unwrap();
        assert!(Settings::load(dir.path(), Some(&config)).is_err());

        std::fs::write(&config, "recent = \"ten\"").unwrap();
        assert!(Settings::load(dir.path(), Some(&config)).is_err());
    }
}
