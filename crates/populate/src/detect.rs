//! Output-dialect detection.

use markup::Dialect;

/// Configured serialization mode. `Auto` defers to the document's doctype.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Auto,
    Html,
    Xhtml,
}

impl OutputMode {
    /// Parses a configuration string. Anything unrecognized falls back to
    /// `Auto`, the configuration-misuse rule.
    pub fn parse(s: &str) -> OutputMode {
        if s.eq_ignore_ascii_case("html") {
            OutputMode::Html
        } else if s.eq_ignore_ascii_case("xhtml") {
            OutputMode::Xhtml
        } else {
            OutputMode::Auto
        }
    }
}

const XHTML_PUBLIC_PREFIX: &str = "-//W3C//DTD XHTML";

/// Decision order: forced mode wins; otherwise a doctype whose PUBLIC
/// identifier is XHTML-family selects `Xhtml`; the default is `Html`.
pub fn dialect(mode: OutputMode, doctype: Option<&str>) -> Dialect {
    match mode {
        OutputMode::Html => Dialect::Html,
        OutputMode::Xhtml => Dialect::Xhtml,
        OutputMode::Auto => {
            let prefix = XHTML_PUBLIC_PREFIX.as_bytes();
            let is_xhtml = doctype
                .and_then(public_identifier)
                .is_some_and(|id| {
                    id.len() >= prefix.len()
                        && id.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix)
                });
            if is_xhtml { Dialect::Xhtml } else { Dialect::Html }
        }
    }
}

// Pulls the quoted PUBLIC identifier out of a raw doctype string, e.g.
// `DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Strict//EN" "http://…"`.
fn public_identifier(doctype: &str) -> Option<&str> {
    let bytes = doctype.as_bytes();
    let mut i = 0;
    let keyword = b"public";
    loop {
        if i + keyword.len() > bytes.len() {
            return None;
        }
        if bytes[i..i + keyword.len()].eq_ignore_ascii_case(keyword)
            && (i == 0 || bytes[i - 1].is_ascii_whitespace())
            && bytes
                .get(i + keyword.len())
                .is_none_or(|b| b.is_ascii_whitespace() || *b == b'"' || *b == b'\'')
        {
            i += keyword.len();
            break;
        }
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    let quote = *bytes.get(i)?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    i += 1;
    let start = i;
    while i < bytes.len() && bytes[i] != quote {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    Some(&doctype[start..i])
}
