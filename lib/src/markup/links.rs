use std::borrow::Cow;

/// The one link target kept for compatibility with the old page name.
const LEGACY_TARGETS: &[(&str, &str)] = &[("CODE_OF_CONDUCT.md", "code-of-conduct.md")];

/// Rewrites a site-internal link target to its URL.
///
/// Returns `None` if `target` is not one of the internal forms, in which
/// case it is used as written.
pub fn resolve_target(target: &str) -> Option<String> {
    let target = LEGACY_TARGETS.iter()
        .find(|(old, _)| *old == target)
        .map_or(target, |(_, new)| *new);

    if let Some(element) = target.strip_prefix("element::") {
        return Some(format!("/elements/{element}.html"));
    }

    if let Some(reference) = target.strip_prefix("reference::") {
        return Some(format!("/lists/references/{reference}.html"));
    }

    if let Some(index) = target.strip_prefix("index::") {
        return Some(match index {
            "all" => "/elements/index.html".into(),
            "families" => "/families/index.html".into(),
            "recent" => "/lists/recent.html".into(),
            _ => match index.split_once("::") {
                Some((list, item)) => format!("/lists/{list}/{item}.html"),
                None => format!("/lists/{index}"),
            }
        });
    }

    if target.contains("://") {
        return None;
    }

    if let Some((page, anchor)) = target.split_once(".md#") {
        if !page.is_empty() && !anchor.is_empty() {
            return Some(format!("/{page}.html#{anchor}"));
        }
    }

    match target.strip_suffix(".md") {
        Some(page) if !page.is_empty() => Some(format!("/{page}.html")),
        _ => None,
    }
}

/// A `[text](target)` link starting at the beginning of `input`.
///
/// Returns the link text, the raw target, and the length consumed.
pub fn parse_link(input: &str) -> Option<(&str, &str, usize)> {
    let rest = input.strip_prefix('[')?;
    let close = memchr::memchr(b']', rest.as_bytes())?;
    let text = &rest[..close];
    let after = rest[close + 1..].strip_prefix('(')?;
    let end = memchr::memchr(b')', after.as_bytes())?;
    let target = &after[..end];
    if text.is_empty() || target.is_empty() {
        return None;
    }

    Some((text, target, 1 + close + 2 + end + 1))
}

/// A bare `(target)` group at the start of `input` that names an internal
/// page. Returns the rewritten group and the length consumed.
pub fn parse_bare_target(input: &str) -> Option<(String, usize)> {
    let rest = input.strip_prefix('(')?;
    let end = memchr::memchr(b')', rest.as_bytes())?;
    let url = resolve_target(&rest[..end])?;
    Some((format!("({url})"), end + 2))
}

/// Rewrites internal targets and `[text](target)` links in plain text.
///
/// Used for prose that does not go through the full markup renderer, like
/// the quoted spaces in DOF descriptions.
pub fn insert_links(text: &str) -> Cow<'_, str> {
    if !text.contains('(') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        let rest = &text[i..];
        if let Some((label, target, len)) = parse_link(rest) {
            let href = resolve_target(target).unwrap_or_else(|| target.to_string());
            out.push_str(&format!("<a href='{href}'>{label}</a>"));
            i += len;
        } else if let Some((group, len)) = parse_bare_target(rest) {
            out.push_str(&group);
            i += len;
        } else {
            let c = rest.chars().next().map_or(1, |c| c.len_utf8());
            out.push_str(&rest[..c]);
            i += c;
        }
    }

    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_targets() {
        let cases = [
            ("element::lagrange", Some("/elements/lagrange.html")),
            ("reference::triangle", Some("/lists/references/triangle.html")),
            ("index::all", Some("/elements/index.html")),
            ("index::families", Some("/families/index.html")),
            ("index::recent", Some("/lists/recent.html")),
            ("index::categories::scalar", Some("/lists/categories/scalar.html")),
            ("index::implementations", Some("/lists/implementations")),
            ("contributing.md", Some("/contributing.html")),
            ("contributing.md#Adding+yourself", Some("/contributing.html#Adding+yourself")),
            ("CODE_OF_CONDUCT.md", Some("/code-of-conduct.html")),
            ("https://example.com/readme.md", None),
            ("https://defelement.com", None),
            ("x, y", None),
        ];

        for (target, expected) in cases {
            assert_eq!(resolve_target(target).as_deref(), expected, "target: {target}");
        }
    }

    #[test]
    fn links_in_plain_text() {
        let text = "an [order 1 Lagrange](element::lagrange) space (see (index::recent)) (k+1)";
        assert_eq!(
            insert_links(text),
            "an <a href='/elements/lagrange.html'>order 1 Lagrange</a> space \
            (see (/lists/recent.html)) (k+1)"
        );

        assert!(matches!(insert_links("no groups here"), Cow::Borrowed(_)));
    }
}
