mod macros;
mod text;

pub use macros::*;
pub use text::Text;

/// Percent-encodes `string` the way HTML form data is encoded: unreserved
/// characters pass through, spaces become `+`, everything else is `%XX`.
pub fn quote_plus(string: &str) -> String {
    urlencoding::encode(string).replace("%20", "+")
}

/// A heading of `level` whose anchor id is the encoded heading text and which
/// links to itself.
pub fn heading_with_self_ref(level: usize, content: &str) -> String {
    heading_with_id(level, &quote_plus(content), content)
}

/// Like [`heading_with_self_ref()`], but with the anchor computed elsewhere.
pub fn heading_with_id(level: usize, id: &str, content: &str) -> String {
    format!("<h{level} id=\"{id}\"><a href=\"#{id}\">{content}</a></h{level}>\n")
}

/// Uppercases the first character of `string`.
pub fn cap_first(string: &str) -> String {
    let mut chars = string.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Protects spaces so that code lines keep their indentation in HTML.
pub fn nbsp(line: &str) -> String {
    line.replace(' ', "&nbsp;")
}

/// Joins `items` as English prose: "a", "a and b", "a, b, and c".
pub fn join_prose<S: AsRef<str>>(items: &[S], conjunction: &str) -> String {
    match items {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [a, b] => format!("{} {conjunction} {}", a.as_ref(), b.as_ref()),
        [init @ .., last] => {
            let init = init.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(", ");
            format!("{init}, {conjunction} {}", last.as_ref())
        }
    }
}
