use std::fs;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{Chainable, ErrorDetail, Result};

/// Something text can be read from: literal content or a file on disk.
pub trait Source: Debug {
    fn read(self) -> Result<Arc<str>>;

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for &str {
    fn read(self) -> Result<Arc<str>> {
        Ok(self.into())
    }
}

impl Source for String {
    fn read(self) -> Result<Arc<str>> {
        Ok(self.into())
    }
}

impl Source for &Path {
    fn read(self) -> Result<Arc<str>> {
        let string = fs::read_to_string(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        Ok(string.into())
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

impl Source for &PathBuf {
    fn read(self) -> Result<Arc<str>> {
        self.as_path().read()
    }

    fn path(&self) -> Option<&Path> {
        Some(self.as_path())
    }
}

pub trait Format: Sized {
    /// The data format's error type.
    type Error: serde::de::Error + ErrorDetail + 'static;

    /// Parses `string` as the data format `Self` as a `T`.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<I: Source, T: DeserializeOwned>(input: I) -> Result<T> {
        let path = input.path().map(|p| p.display().to_string());
        let input = input.read()?;
        Self::from_str(&input).chain_with(|| error! {
            "failed to parse structured data",
            "format" => std::any::type_name::<Self>().rsplit("::").next().unwrap_or("?"),
            "file path" => path.as_deref().unwrap_or("<inline>"),
        })
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty) => (
        #[derive(Debug, Default, Clone, Copy)]
        pub struct $name;

        impl Format for $name {
            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Yaml: serde_yaml::from_str, serde_yaml::Error);
impl_format!(Toml: toml::from_str, toml::de::Error);
impl_format!(Json: serde_json::from_str, serde_json::Error);

/// Reads structured data, choosing the format from the source's extension.
/// Inline content and unknown extensions are read as YAML.
pub fn read_structured<I: Source, T: DeserializeOwned>(input: I) -> Result<T> {
    let ext = input.path()
        .and_then(|p| p.extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("json") => Json::read(input),
        Some("toml") => Toml::read(input),
        _ => Yaml::read(input),
    }
}
