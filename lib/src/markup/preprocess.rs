//! Source-level expansions that run before the line pass: page includes,
//! contributor lists, and author blocks. Their output is ordinary markup.

use std::borrow::Cow;
use std::path::Path;

use crate::error::{Chainable, Result};
use crate::markup::citation::{format_names, NameStyle};
use crate::markup::contributors::{list_contributors, ContributorFormat, Contributors};
use crate::util::join_prose;

const SITE: &str = "https://defelement.com";

/// Expands `{{<name>.md}}` includes from `include_dir`, then
/// `{{list contributors[|<format>]}}` lists, then `{{author-info::...}}`
/// blocks.
///
/// Includes naming a file that does not exist are left alone. Included
/// content is not searched for further includes.
pub fn preprocess<'a>(
    content: &'a str,
    include_dir: Option<&Path>,
    contributors: &dyn Contributors,
) -> Result<Cow<'a, str>> {
    let mut content = Cow::Borrowed(content);
    if let Some(dir) = include_dir {
        content = expand(content, |call| {
            let name = match call.strip_suffix(".md") {
                Some(stem) if is_file_name(stem) => call,
                _ => return Ok(None),
            };

            let path = dir.join(name);
            if !path.is_file() {
                return Ok(None);
            }

            std::fs::read_to_string(&path)
                .chain_with(|| error!("failed to read page include", "file path" => path.display()))
                .map(Some)
        })?;
    }

    content = expand(content, |call| {
        let format = match call.strip_prefix("list contributors") {
            Some("") => ContributorFormat::Html,
            Some(rest) => match rest.strip_prefix('|') {
                Some(format) => ContributorFormat::parse(format)?,
                None => return Ok(None),
            },
            None => return Ok(None),
        };

        list_contributors(contributors, format).map(Some)
    })?;

    expand(content, |call| match call.strip_prefix("author-info::") {
        Some(args) => author_info(args).map(Some),
        None => Ok(None),
    })
}

fn is_file_name(stem: &str) -> bool {
    !stem.is_empty() && !stem.contains(['{', '}', ':', '/', '\\', '\n'])
}

/// Replaces every `{{call}}` for which `f` returns text. The replacement is
/// not rescanned.
fn expand<'a, F>(content: Cow<'a, str>, mut f: F) -> Result<Cow<'a, str>>
    where F: FnMut(&str) -> Result<Option<String>>
{
    if !content.contains("{{") {
        return Ok(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut changed = false;
    let mut rest = &*content;
    while let Some(start) = rest.find("{{") {
        let (before, call) = rest.split_at(start);
        out.push_str(before);

        let Some(end) = call[2..].find("}}") else {
            rest = call;
            break;
        };

        match f(&call[2..2 + end])? {
            Some(replacement) => {
                out.push_str(&replacement);
                rest = &call[end + 4..];
                changed = true;
            }
            None => {
                out.push_str("{{");
                rest = &call[2..];
            }
        }
    }

    out.push_str(rest);
    if !changed {
        return Ok(content);
    }

    Ok(Cow::Owned(out))
}

/// `Last, First;Last, First|Title|path` to an author line plus a collapsible
/// block with BibTeX and a formatted citation for the page.
fn author_info(args: &str) -> Result<String> {
    let mut parts = args.split('|');
    let (Some(authors), Some(title), Some(url), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return err!("author info needs `authors|title|url`", "arguments" => args);
    };

    let authors: Vec<&str> = authors.split(';').map(str::trim).collect();
    let written_by: Vec<String> = authors.iter()
        .map(|name| name.split(", ").collect::<Vec<_>>().into_iter().rev().collect::<Vec<_>>().join(" "))
        .collect();

    let bibtex = format_names(&authors, NameStyle::Bibtex);
    let citation = format_names(&authors, NameStyle::Citation);

    let mut out = format!("<div class='authors'>Written by {}</div>\n", join_prose(&written_by, "and"));
    out.push_str("<a class='show_eg_link' href='javascript:show_author_cite_info()' \
        id='showcitelink' style='display:block'>&darr; Cite this page &darr;</a>");
    out.push_str("<div id='authorcite' style='display:none'>");
    out.push_str("<a class='show_eg_link' href='javascript:hide_author_cite_info()' \
        id='hidecitelink' style='display:block'>&uarr; Hide citation info &uarr;</a>");
    out.push_str("You can cite this page using the following BibTeX:\n\n```\n");
    out.push_str("@misc{defelement,\n");
    out.push_str(&format!("       AUTHOR = {{{bibtex}}},\n"));
    out.push_str(&format!("        TITLE = {{{{D}}ef{{E}}lement: {title}}},\n"));
    out.push_str("         YEAR = {{{{date:Y}}}},\n");
    out.push_str(&format!(" HOWPUBLISHED = {{\\url{{{SITE}/{url}}}}},\n"));
    out.push_str("         NOTE = {[Online; accessed {{date:D-M-Y}}]}\n");
    out.push_str("}\n```\n\n");
    out.push_str("This will create a reference along the lines of:\n\n");
    out.push_str(&format!(
        "<ul class='citations'><li>{citation}. <i>DefElement: {title}</i>, {{{{date:Y}}}}, \
        <a href='{SITE}/{url}'>{SITE}/{url}</a> [Online; accessed: {{{{date:D-M-Y}}}}]</li>\n"
    ));
    out.push_str("</ul></div>");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::markup::NoContributors;
    use super::*;

    #[test]
    fn includes_known_pages_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("about.md"), "# About\ntext").unwrap();

        let out = preprocess("{{about.md}}\n{{missing.md}}\n{{tick}}", Some(dir.path()), &NoContributors).unwrap();
        assert_eq!(out, "# About\ntext\n{{missing.md}}\n{{tick}}");
    }

    #[test]
    fn untouched_content_is_borrowed() {
        let out = preprocess("plain {{tick}} text", None, &NoContributors).unwrap();
        assert!(matches!(out, Cow::Borrowed(_)));
    }

    #[test]
    fn author_blocks() {
        let out = preprocess(
            "{{author-info::Scroggs, Matthew W.;Dokken, Jørgen S.|How to cite|citing.html}}",
            None,
            &NoContributors,
        ).unwrap();

        assert!(out.starts_with("<div class='authors'>Written by Matthew W. Scroggs and Jørgen S. Dokken</div>"));
        assert!(out.contains("AUTHOR = {Scroggs, Matthew W. and Dokken, Jørgen S.},"));
        assert!(out.contains("TITLE = {{D}ef{E}lement: How to cite},"));
        assert!(out.contains("YEAR = {{{{date:Y}}}},"));
        assert!(out.contains("HOWPUBLISHED = {\\url{https://defelement.com/citing.html}},"));
        assert!(out.contains("<li>M. W. Scroggs and J. S. Dokken. <i>DefElement: How to cite</i>, {{date:Y}},"));
    }

    #[test]
    fn contributor_macros_need_a_known_format() {
        let out = preprocess("{{list contributorship}}", None, &NoContributors).unwrap();
        assert_eq!(out, "{{list contributorship}}");

        let error = preprocess("{{list contributors|yaml}}", None, &NoContributors).unwrap_err();
        assert!(error.mentions("yaml"));
        assert!(preprocess("{{list contributors}}", None, &NoContributors).is_err());
    }

    #[test]
    fn malformed_author_blocks_fail() {
        assert!(preprocess("{{author-info::Someone|Title}}", None, &NoContributors).is_err());
    }
}
