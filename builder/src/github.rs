//! Element history and repository contributors from the GitHub API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use defelement::catalog::HistoryProvider;
use defelement::error;
use defelement::error::{Chainable, Error, Result};
use defelement::markup::GitHubUser;

const API: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("defelement-builder/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: usize = 100;
const TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
pub struct GitHub {
    client: Client,
    repository: String,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    commit: Commit,
}

#[derive(Debug, Deserialize)]
struct Commit {
    committer: Option<Signature>,
}

#[derive(Debug, Deserialize)]
struct Signature {
    date: DateTime<Utc>,
}

impl GitHub {
    pub fn new(repository: &str, token: &str) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(Error::from_std)
            .chain_with(|| "GitHub token is not a valid header value")?;

        auth.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .map_err(Error::from_std)
            .chain_with(|| "failed to create HTTP client")?;

        Ok(GitHub { client, repository: repository.into() })
    }

    fn get<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        self.client.get(url)
            .query(query)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(Error::from_std)
    }

    fn page(&self, path: &str, page: usize) -> Result<Vec<CommitInfo>> {
        let url = format!("{API}/repos/{}/commits", self.repository);
        let query = [("path", path.to_string()), ("per_page", PER_PAGE.to_string()), ("page", page.to_string())];
        self.get(&url, &query).chain_with(|| error! {
            "GitHub commit query failed",
            "repository" => &self.repository,
            "path" => path,
            "page" => page,
        })
    }

    /// Every account with commits to the repository. Names are not filled in.
    pub fn contributors(&self) -> Result<Vec<GitHubUser>> {
        let url = format!("{API}/repos/{}/contributors", self.repository);
        let mut users = vec![];
        for page in 1.. {
            let query = [("per_page", PER_PAGE.to_string()), ("page", page.to_string())];
            let batch: Vec<GitHubUser> = self.get(&url, &query).chain_with(|| error! {
                "GitHub contributor query failed",
                "repository" => &self.repository,
                "page" => page,
            })?;

            let last = batch.len() < PER_PAGE;
            users.extend(batch);
            if last {
                break;
            }
        }

        tracing::debug!(contributors = users.len(), "fetched repository contributors");
        Ok(users)
    }

    /// The display name of the account `login`, if it has one.
    pub fn user_name(&self, login: &str) -> Result<Option<String>> {
        let user: GitHubUser = self.get(&format!("{API}/users/{login}"), &[])
            .chain_with(|| error!("GitHub user query failed", "login" => login))?;

        Ok(user.name)
    }
}

impl HistoryProvider for GitHub {
    fn commits(&self, path: &str) -> Result<Vec<DateTime<Utc>>> {
        let mut dates = vec![];
        for page in 1.. {
            let commits = self.page(path, page)?;
            let last = commits.len() < PER_PAGE;
            dates.extend(committer_dates(commits));
            if last {
                break;
            }
        }

        tracing::debug!(path, commits = dates.len(), "fetched history");
        Ok(dates)
    }
}

fn committer_dates(commits: Vec<CommitInfo>) -> impl Iterator<Item = DateTime<Utc>> {
    commits.into_iter().filter_map(|info| info.commit.committer).map(|s| s.date)
}
