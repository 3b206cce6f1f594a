//! The `{{list contributors}}` macro: the people behind the site as an HTML
//! directory, a BibTeX author field, or a citation author list.

use std::fmt::Write;

use serde::Deserialize;

use crate::error::Result;
use crate::markup::citation::{format_names, NameStyle};
use crate::util::heading_with_self_ref;

/// One entry of the site's contributor data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Person {
    /// `Surname, Given Names`.
    pub name: String,
    pub img: Option<String>,
    pub desc: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub github: Option<String>,
    pub twitter: Option<String>,
    /// `handle@server`.
    pub mastodon: Option<String>,
}

impl Person {
    /// `Scroggs, Matthew W.` -> `Matthew W. Scroggs`.
    pub fn display_name(&self) -> String {
        self.name.split(", ").collect::<Vec<_>>().into_iter().rev().collect::<Vec<_>>().join(" ")
    }
}

/// A GitHub account with commits to the site's repository.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub name: Option<String>,
}

/// Supplies contributor data to the renderer.
pub trait Contributors: Send + Sync {
    /// The people listed in the site's contributor data, in file order.
    fn people(&self) -> Result<&[Person]>;

    /// Everyone with commits to the repository, or `None` when the
    /// repository was not queried.
    fn repository_contributors(&self) -> Result<Option<&[GitHubUser]>>;
}

/// For sites without contributor data: listing contributors fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoContributors;

impl Contributors for NoContributors {
    fn people(&self) -> Result<&[Person]> {
        err!("contributor data is not available")
    }

    fn repository_contributors(&self) -> Result<Option<&[GitHubUser]>> {
        Ok(None)
    }
}

/// Output of `{{list contributors|<format>}}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContributorFormat {
    Html,
    Bibtex,
    Citation,
}

impl ContributorFormat {
    pub fn parse(format: &str) -> Result<Self> {
        match format {
            "html" => Ok(ContributorFormat::Html),
            "bibtex" => Ok(ContributorFormat::Bibtex),
            "citation" => Ok(ContributorFormat::Citation),
            _ => err!("unsupported contributor list format", "format" => format),
        }
    }
}

/// Renders the contributor list in `format`.
pub fn list_contributors(source: &dyn Contributors, format: ContributorFormat) -> Result<String> {
    let people = source.people()?;
    let repository = source.repository_contributors()?;
    if repository.is_none() {
        tracing::warn!("repository contributors unavailable; listing known people only");
    }

    let listed = |login: &str| people.iter().any(|p| p.github.as_deref() == Some(login));
    let extras: Vec<&GitHubUser> = repository.unwrap_or_default().iter()
        .filter(|user| !listed(&user.login))
        .collect();

    match format {
        ContributorFormat::Html => directory(people, &extras),
        ContributorFormat::Bibtex | ContributorFormat::Citation => {
            let mut names = author_order(people);
            let style = match format {
                ContributorFormat::Bibtex => {
                    if !extras.is_empty() {
                        names.push("others");
                    }

                    NameStyle::Bibtex
                }
                _ => {
                    if !extras.is_empty() {
                        names.push("et al");
                    }

                    NameStyle::Citation
                }
            };

            Ok(format_names(&names, style))
        }
    }
}

/// The first listed person leads; everyone after is sorted by name.
fn author_order(people: &[Person]) -> Vec<&str> {
    let mut names: Vec<&str> = people.iter().map(|p| p.name.as_str()).collect();
    if names.len() > 1 {
        names[1..].sort_unstable();
    }

    names
}

fn social(out: &mut String, href: &str, icon: &str, label: &str) {
    let _ = write!(out, "<div class='social'><a href='{href}'>\
        <i class='{icon}' aria-hidden='true'></i>&nbsp;{label}</a></div>");
}

fn directory(people: &[Person], extras: &[&GitHubUser]) -> Result<String> {
    let mut out = String::new();
    for person in people {
        if let Some(img) = &person.img {
            let _ = write!(out, "<img src='/img/people/{img}' class='person'>");
        }

        out.push_str(&heading_with_self_ref(2, &person.display_name()));
        if let Some(desc) = &person.desc {
            let _ = write!(out, "<p>{desc}</p>");
        }

        if let Some(website) = &person.website {
            let shown = website.split_once("//").map_or(website.as_str(), |(_, rest)| rest);
            social(&mut out, website, "fa-brands fa-internet-explorer", shown.trim_matches('/'));
        }

        if let Some(email) = &person.email {
            social(&mut out, &format!("mailto:{email}"), "fa-regular fa-envelope", email);
        }

        if let Some(login) = &person.github {
            social(&mut out, &format!("https://github.com/{login}"), "fa-brands fa-github", login);
        }

        if let Some(handle) = &person.twitter {
            let href = format!("https://twitter.com/{handle}");
            social(&mut out, &href, "fa-brands fa-twitter", &format!("@{handle}"));
        }

        if let Some(account) = &person.mastodon {
            let Some((handle, server)) = account.split_once('@') else {
                return err!("mastodon accounts are written `handle@server`",
                    "person" => &person.name, "account" => account);
            };

            let href = format!("https://{server}/@{handle}");
            social(&mut out, &href, "fa-brands fa-mastodon", &format!("@{handle}@{server}"));
        }

        out.push_str("<br style='clear:both' />");
    }

    if extras.is_empty() {
        return Ok(out);
    }

    out.push_str(&heading_with_self_ref(2, "Additional contributors"));
    out.push_str("<p>The following people have contributed to DefElement but are yet to add \
        details about themselves to this page:</p>\n<ul>\n");

    for user in extras {
        let login = &user.login;
        let link = format!("<a href='https://github.com/{login}'>\
            <i class='fa-brands fa-github' aria-hidden='true'></i>&nbsp;{login}</a>");

        match &user.name {
            Some(name) => { let _ = writeln!(out, "<li>{name} ({link})</li>"); }
            None => { let _ = writeln!(out, "<li>{link}</li>"); }
        }
    }

    out.push_str("</ul>");
    out.push_str("<p>If you're listed here, you can find instructions for how to add information \
        about yourself on the [contributing page](contributing.md\
        #Adding+yourself+to+the+contributors+list).</p>");

    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    struct Fixed {
        people: Vec<Person>,
        users: Option<Vec<GitHubUser>>,
    }

    impl Contributors for Fixed {
        fn people(&self) -> Result<&[Person]> {
            Ok(&self.people)
        }

        fn repository_contributors(&self) -> Result<Option<&[GitHubUser]>> {
            Ok(self.users.as_deref())
        }
    }

    fn person(name: &str, github: Option<&str>) -> Person {
        Person { name: name.into(), github: github.map(Into::into), ..Person::default() }
    }

    fn site(users: Option<Vec<GitHubUser>>) -> Fixed {
        Fixed {
            people: vec![
                person("Scroggs, Matthew W.", Some("mscroggs")),
                person("Lee, Alice", None),
                person("Dokken, Jørgen S.", Some("jorgensd")),
            ],
            users,
        }
    }

    fn user(login: &str, name: Option<&str>) -> GitHubUser {
        GitHubUser { login: login.into(), name: name.map(Into::into) }
    }

    #[test]
    fn bibtex_author_fields() {
        let offline = list_contributors(&site(None), ContributorFormat::Bibtex).unwrap();
        assert_eq!(offline, "Scroggs, Matthew W. and Dokken, Jørgen S. and Lee, Alice");

        let users = vec![user("mscroggs", None), user("newcomer", None)];
        let online = list_contributors(&site(Some(users)), ContributorFormat::Bibtex).unwrap();
        assert_eq!(online, "Scroggs, Matthew W. and Dokken, Jørgen S. and Lee, Alice and others");
    }

    #[test]
    fn citation_author_lists() {
        let users = vec![user("mscroggs", None), user("jorgensd", None)];
        let known = list_contributors(&site(Some(users)), ContributorFormat::Citation).unwrap();
        assert_eq!(known, "M. W. Scroggs, J. S. Dokken, and A. Lee");

        let users = vec![user("newcomer", Some("New Comer"))];
        let extra = list_contributors(&site(Some(users)), ContributorFormat::Citation).unwrap();
        assert_eq!(extra, "M. W. Scroggs, J. S. Dokken, A. Lee, et al");
    }

    #[test]
    fn html_directory() {
        let mut site = site(Some(vec![user("mscroggs", None), user("newcomer", Some("New Comer"))]));
        site.people[0].img = Some("mws.jpg".into());
        site.people[0].desc = Some("Maintainer".into());
        site.people[0].website = Some("https://www.mscroggs.co.uk/".into());
        site.people[0].mastodon = Some("mscroggs@mathstodon.xyz".into());

        let html = list_contributors(&site, ContributorFormat::Html).unwrap();
        assert!(html.starts_with("<img src='/img/people/mws.jpg' class='person'>\
            <h2 id=\"Matthew+W.+Scroggs\"><a href=\"#Matthew+W.+Scroggs\">Matthew W. Scroggs</a></h2>\n\
            <p>Maintainer</p>"));

        assert!(html.contains("&nbsp;www.mscroggs.co.uk</a>"));
        assert!(html.contains("<a href='https://mathstodon.xyz/@mscroggs'>"));
        assert!(html.contains("<h2 id=\"Alice+Lee\">"));
        assert!(html.contains("Additional contributors"));
        assert!(html.contains("<li>New Comer (<a href='https://github.com/newcomer'>"));
        assert!(!html.contains("<li><a href='https://github.com/mscroggs'>"));
    }

    #[test]
    fn html_without_extras_has_no_additional_section() {
        let html = list_contributors(&site(None), ContributorFormat::Html).unwrap();
        assert_eq!(html.matches("<br style='clear:both' />").count(), 3);
        assert!(!html.contains("Additional contributors"));
    }

    #[test]
    fn bad_input_fails() {
        assert!(ContributorFormat::parse("json").is_err());
        assert!(list_contributors(&NoContributors, ContributorFormat::Html).is_err());

        let mut site = site(None);
        site.people[1].mastodon = Some("no-server".into());
        assert!(list_contributors(&site, ContributorFormat::Html).is_err());
    }
}
