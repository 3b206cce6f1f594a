use std::path::Path;

use once_cell::sync::OnceCell;

use defelement::error::{Error, Result};
use defelement::markup::{Contributors, GitHubUser, Person};
use defelement::source::{Format, Yaml};

use crate::github::GitHub;

/// The site's contributor data, plus the repository's contributors when a
/// GitHub client is available. The repository is queried at most once.
#[derive(Debug)]
pub struct SiteContributors<'a> {
    people: Vec<Person>,
    github: Option<&'a GitHub>,
    users: OnceCell<Vec<GitHubUser>>,
}

impl<'a> SiteContributors<'a> {
    /// Reads the YAML list of people at `path`. A missing file lists nobody.
    pub fn load(path: &Path, github: Option<&'a GitHub>) -> Result<Self> {
        let people = match path.is_file() {
            true => Yaml::read(path)?,
            false => {
                tracing::debug!(path = %path.display(), "no contributor data");
                vec![]
            }
        };

        Ok(SiteContributors { people, github, users: OnceCell::new() })
    }

    fn listed(&self, login: &str) -> bool {
        self.people.iter().any(|p| p.github.as_deref() == Some(login))
    }
}

impl Contributors for SiteContributors<'_> {
    fn people(&self) -> Result<&[Person]> {
        Ok(&self.people)
    }

    fn repository_contributors(&self) -> Result<Option<&[GitHubUser]>> {
        let Some(github) = self.github else {
            return Ok(None);
        };

        let users = self.users.get_or_try_init(|| {
            let mut users = github.contributors()?;
            for user in users.iter_mut().filter(|u| !self.listed(&u.login)) {
                user.name = github.user_name(&user.login)?;
            }

            Ok::<_, Error>(users)
        })?;

        Ok(Some(users))
    }
}

#[cfg(test)]
mod tests {
    use defelement::markup::{list_contributors, ContributorFormat};

    use super::*;

    #[test]
    fn people_load_from_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contributors");
        std::fs::write(&path, "- name: Scroggs, Matthew W.\n  github: mscroggs\n\
            - name: Lee, Alice\n  mastodon: alee@maths.social\n").unwrap();

        let contributors = SiteContributors::load(&path, None).unwrap();
        let people = contributors.people().unwrap();
        assert_eq!(people.len(), 2);
        assert_eq!(people[1].mastodon.as_deref(), Some("alee@maths.social"));
        assert!(contributors.listed("mscroggs"));
        assert!(contributors.repository_contributors().unwrap().is_none());

        let bibtex = list_contributors(&contributors, ContributorFormat::Bibtex).unwrap();
        assert_eq!(bibtex, "Scroggs, Matthew W. and Lee, Alice");
    }

    #[test]
    fn missing_data_lists_nobody() {
        let dir = tempfile::tempdir().unwrap();
        let contributors = SiteContributors::load(&dir.path().join("contributors"), None).unwrap();
        assert!(contributors.people().unwrap().is_empty());
    }

    #[test]
    fn malformed_data_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("contributors");
        std::fs::write(&path, "- github: nobody\n").unwrap();
        assert!(SiteContributors::load(&path, None).is_err());
    }
}
