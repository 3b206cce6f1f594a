use defelement::catalog::HistoryProvider;
use defelement::error::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::contributors::SiteContributors;
use crate::discover::Site;
use crate::github::GitHub;
use crate::plots::StaticPlotter;

mod config;
mod contributors;
mod discover;
mod github;
mod plots;
mod render;
mod util;

pub const CONFIG_FILE: &str = "config.toml";
pub const CATEGORIES_FILE: &str = "categories";
pub const REFERENCES_FILE: &str = "references";
pub const FAMILIES_FILE: &str = "families.yml";
pub const IMPLEMENTATIONS_FILE: &str = "implementations.yml";
pub const CONTRIBUTORS_FILE: &str = "contributors";

mod flags {
    use std::path::PathBuf;

    xflags::xflags! {
        /// Builds the catalogue pages from a site directory.
        cmd defelement-builder {
            /// The site directory.
            required source: PathBuf
            /// Where the rendered fragments are written.
            required output: PathBuf
            /// Skip fetching element history from GitHub.
            optional --offline
            /// Settings file to use instead of `<source>/config.toml`.
            optional -c, --config config: PathBuf
        }
    }
}

pub fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let flags = flags::DefelementBuilder::from_env_or_exit();
    if let Err(e) = run(flags) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(flags: flags::DefelementBuilder) -> Result<()> {
    let settings = Settings::load(&flags.source, flags.config.as_deref())?;
    let github = match (&settings.github_token, flags.offline) {
        (Some(token), false) => Some(GitHub::new(&settings.repository, token)?),
        (None, false) => {
            tracing::info!("no GitHub token set; skipping element history and contributors");
            None
        }
        (_, true) => None,
    };

    let history = github.as_ref().map(|github| github as &dyn HistoryProvider);
    let site = defelement::time!("discovery", Site::load(&flags.source, settings, history)?);

    let assets = site.settings.assets.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("img");

    let plotter = StaticPlotter::new(&site.settings.assets, &format!("/{assets}"));
    let contributors = SiteContributors::load(&site.settings.data.join(CONTRIBUTORS_FILE), github.as_ref())?;
    defelement::time!("render", site.render(&plotter, &contributors, &flags.output)?);
    Ok(())
}
