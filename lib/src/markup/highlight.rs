use std::fmt::Write;

use crate::util::nbsp;

const SPACE: &str = "&nbsp;";
const COMMENT: &str = "#FF8800";
const STRING: &str = "#DD2299";

/// Which highlighter a fenced code block uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeLang {
    Plain,
    Python,
    Bash,
}

impl CodeLang {
    /// The language named by a fence line, if `line` is a fence.
    pub fn from_fence(line: &str) -> Option<CodeLang> {
        match line {
            "```" => Some(CodeLang::Plain),
            "```python" => Some(CodeLang::Python),
            "```bash" => Some(CodeLang::Bash),
            _ => None,
        }
    }

    /// Renders one source line of code as HTML with protected spaces.
    pub fn highlight(self, line: &str) -> String {
        let line = nbsp(line);
        match self {
            CodeLang::Plain => line,
            CodeLang::Python => python(&line),
            CodeLang::Bash => bash(&line),
        }
    }
}

/// Colours comments and double-quoted strings.
fn python(line: &str) -> String {
    let (code, comment) = match line.split_once('#') {
        Some((code, comment)) => (code, Some(comment)),
        None => (line, None),
    };

    let mut out = String::with_capacity(line.len());
    for (i, part) in code.split('"').enumerate() {
        match i {
            0 => out.push_str(part),
            i if i % 2 == 1 => { let _ = write!(out, "<span style='color:{STRING}'>\"{part}"); }
            _ => { let _ = write!(out, "\"</span>{part}"); }
        }
    }

    if let Some(comment) = comment {
        let _ = write!(out, "<span style='color:{COMMENT}'>#{comment}</span>");
    }

    out
}

/// Colours `python`/`python3` invocations, including a `-m module` argument.
fn bash(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    while let Some(i) = rest.find("python") {
        out.push_str(&rest[..i]);
        rest = &rest[i..];
        match invocation_len(rest) {
            Some(len) => {
                let _ = write!(out, "<span style='color:{COMMENT}'>{}</span>", &rest[..len]);
                rest = &rest[len..];
            }
            None => {
                out.push_str("python");
                rest = &rest["python".len()..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Length of `python3? (-m <module> )?` at the start of `s`, spaces protected.
fn invocation_len(s: &str) -> Option<usize> {
    let mut i = "python".len();
    if s[i..].starts_with('3') {
        i += 1;
    }

    let module_flag = "&nbsp;-m&nbsp;";
    if s[i..].starts_with(module_flag) {
        let j = i + module_flag.len();
        if let Some(c) = s[j..].chars().next() {
            let k = j + c.len_utf8();
            if let Some(end) = s[k..].find(SPACE) {
                return Some(k + end + SPACE.len());
            }
        }
    }

    s[i..].starts_with(SPACE).then(|| i + SPACE.len())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fences() {
        assert_eq!(CodeLang::from_fence("```"), Some(CodeLang::Plain));
        assert_eq!(CodeLang::from_fence("```python"), Some(CodeLang::Python));
        assert_eq!(CodeLang::from_fence("```bash"), Some(CodeLang::Bash));
        assert_eq!(CodeLang::from_fence("```rust"), None);
        assert_eq!(CodeLang::from_fence(" ```"), None);
    }

    #[test]
    fn python_strings_and_comments() {
        assert_eq!(
            CodeLang::Python.highlight("e = create(\"P\", 1)  # degree"),
            "e&nbsp;=&nbsp;create(<span style='color:#DD2299'>\"P\"</span>,&nbsp;1)&nbsp;&nbsp;\
            <span style='color:#FF8800'>#&nbsp;degree</span>"
        );
    }

    #[test]
    fn bash_python_invocations() {
        assert_eq!(
            CodeLang::Bash.highlight("python3 -m pip install symfem"),
            "<span style='color:#FF8800'>python3&nbsp;-m&nbsp;pip&nbsp;</span>install&nbsp;symfem"
        );

        assert_eq!(
            CodeLang::Bash.highlight("python build.py"),
            "<span style='color:#FF8800'>python&nbsp;</span>build.py"
        );

        assert_eq!(CodeLang::Bash.highlight("echo pythonic"), "echo&nbsp;pythonic");
    }

    #[test]
    fn plain_code_keeps_spaces() {
        assert_eq!(CodeLang::Plain.highlight("  a *b*"), "&nbsp;&nbsp;a&nbsp;*b*");
    }
}
