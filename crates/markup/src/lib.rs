pub mod serializer;

mod dom_builder;
mod entities;
mod tokenizer;
mod types;

use memchr::{memchr, memchr2};

pub use crate::dom_builder::build_dom;
pub use crate::serializer::{Dialect, cdata_fix, serialize, strip_xml_prolog};
pub use crate::tokenizer::tokenize;
pub use crate::types::{Node, Token};

/// Detects an explicit `<?xml … ?>` declaration anywhere in the raw body.
/// Prolog presence is a serialization-time decision, so it is tracked from
/// the original text rather than from the parsed tree.
pub fn has_xml_prolog(body: &str) -> bool {
    xml_prolog(body).is_some()
}

/// Returns the body's `<?xml … ?>` declaration verbatim, if any. The parser
/// drops processing instructions, so a caller that must keep the prolog in
/// the output takes it from here.
pub fn xml_prolog(body: &str) -> Option<&str> {
    let start = find_ignore_ascii_case(body, b"<?xml")?;
    let end = body[start..].find("?>")?;
    Some(&body[start..start + end + 2])
}

fn find_ignore_ascii_case(haystack: &str, needle: &[u8]) -> Option<usize> {
    let hay = haystack.as_bytes();
    let n = needle.len();
    if n == 0 {
        return Some(0);
    }
    if hay.len() < n {
        return None;
    }
    let first = needle[0];
    let (a, b) = if first.is_ascii_alphabetic() {
        (first.to_ascii_lowercase(), first.to_ascii_uppercase())
    } else {
        (first, first)
    };
    let mut i = 0;
    while i + n <= hay.len() {
        let rel = if a == b {
            memchr(a, &hay[i..])
        } else {
            memchr2(a, b, &hay[i..])
        };
        let pos = i + rel?;
        if pos + n <= hay.len() && hay[pos..pos + n].eq_ignore_ascii_case(needle) {
            return Some(pos);
        }
        i = pos + 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_xml_prolog() {
        assert!(has_xml_prolog("<?xml version=\"1.0\"?>\n<html></html>"));
        assert!(has_xml_prolog("<?XML version=\"1.0\" ?><html></html>"));
        assert!(!has_xml_prolog("<!DOCTYPE html><html></html>"));
        assert!(!has_xml_prolog("<?xml never closed"));
    }

    #[test]
    fn extracts_the_prolog_text_verbatim() {
        assert_eq!(
            xml_prolog("<?xml version=\"1.0\" encoding=\"latin1\"?>\n<html></html>"),
            Some("<?xml version=\"1.0\" encoding=\"latin1\"?>")
        );
        assert_eq!(xml_prolog("<!DOCTYPE html>"), None);
    }
}
