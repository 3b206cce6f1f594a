use std::path::Path;

use defelement::{err, error};
use defelement::error::{Chainable, Result};

pub trait OutputPath {
    /// Writes `content` to `self`, creating parent directories as needed.
    fn write_html(&self, content: &str) -> Result<()>;
}

impl OutputPath for Path {
    fn write_html(&self, content: &str) -> Result<()> {
        if let Some(parent) = self.parent() {
            std::fs::create_dir_all(parent)
                .chain_with(|| error!("failed to create output directory", "path" => parent.display()))?;
        }

        std::fs::write(self, content)
            .chain_with(|| error!("failed to write output", "path" => self.display()))
    }
}

/// Checks that `path` is a directory. Missing directories are only an error
/// if `must_exist`.
#[track_caller]
pub fn dircheck<'a>(path: &'a Path, what: &str, must_exist: bool) -> Result<Option<&'a Path>> {
    match (path.is_dir(), path.exists(), must_exist) {
        (true, _, _) => Ok(Some(path)),
        (false, false, false) => Ok(None),
        (false, true, _) => err! {
            format!("{what} path must point to a directory"),
            "path is not a directory" => path.display(),
        },
        (false, false, true) => err! {
            format!("{what} must point to an existing directory"),
            "path does not exist" => path.display(),
        },
    }
}

/// `<li>` items, one per entry.
pub fn list_items<I, S>(items: I) -> String
    where I: IntoIterator<Item = S>, S: AsRef<str>
{
    items.into_iter()
        .map(|item| format!("<li>{}</li>", item.as_ref()))
        .collect::<Vec<_>>()
        .join("\n")
}
