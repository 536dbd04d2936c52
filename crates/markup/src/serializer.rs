//! Re-emits a document tree as text in one of two dialects.
//!
//! `Html` follows permissive conventions: void elements stay unclosed,
//! script/style payloads are emitted verbatim, valueless attributes are bare.
//! `Xhtml` follows strict XML-compatible rules: an XML prolog, self-closed
//! void elements, every attribute valued, and script/style payloads wrapped
//! in CDATA sections.

use crate::entities::{escape_attr, escape_text};
use crate::tokenizer::is_void_element;
use crate::types::Node;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Html,
    Xhtml,
}

const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n";

// Browser-safe comment wrappers around CDATA sections in style/script
// payloads; the serializer must also recognize them on re-serialization.
const STYLE_CDATA_OPEN: &str = "<!--/*--><![CDATA[/*><!--*/";
const SCRIPT_CDATA_OPEN: &str = "<!--//--><![CDATA[//><!--";

pub fn serialize(doc: &Node, dialect: Dialect) -> String {
    let mut out = String::new();
    if dialect == Dialect::Xhtml {
        out.push_str(XML_PROLOG);
    }
    if let Node::Document { doctype, children } = doc {
        if let Some(dt) = doctype {
            out.push('<');
            out.push('!');
            out.push_str(dt);
            out.push('>');
        }
        for child in children {
            emit(child, dialect, TextMode::Escaped, &mut out);
        }
    } else {
        emit(doc, dialect, TextMode::Escaped, &mut out);
    }
    out
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TextMode {
    Escaped,
    // script/style payloads: emitted as-is in HTML, CDATA-wrapped in XHTML
    Raw,
}

fn emit(node: &Node, dialect: Dialect, mode: TextMode, out: &mut String) {
    match node {
        Node::Document { children, .. } => {
            for child in children {
                emit(child, dialect, mode, out);
            }
        }
        Node::Element {
            name,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(name);
            for (key, value) in attributes {
                out.push(' ');
                out.push_str(key);
                match (value, dialect) {
                    (Some(v), _) => {
                        out.push_str("=\"");
                        out.push_str(&escape_attr(v));
                        out.push('"');
                    }
                    (None, Dialect::Html) => {}
                    (None, Dialect::Xhtml) => out.push_str("=\"\""),
                }
            }
            if is_void_element(name) {
                match dialect {
                    Dialect::Html => out.push('>'),
                    Dialect::Xhtml => out.push_str(" />"),
                }
                return;
            }
            out.push('>');
            let child_mode = if name == "script" || name == "style" {
                TextMode::Raw
            } else {
                TextMode::Escaped
            };
            for child in children {
                emit(child, dialect, child_mode, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Node::Text { text } => match (mode, dialect) {
            (TextMode::Raw, Dialect::Html) => out.push_str(text),
            (TextMode::Raw, Dialect::Xhtml) => push_raw_xml(text, out),
            (TextMode::Escaped, _) => out.push_str(&escape_text(text)),
        },
        Node::Comment { text } => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

// Payloads that already carry CDATA sectioning from a previous
// serialization pass are emitted verbatim; wrapping them again would nest
// the sections and re-application would never stabilize.
fn push_raw_xml(text: &str, out: &mut String) {
    let already_sectioned = text.starts_with(STYLE_CDATA_OPEN)
        || text.starts_with(SCRIPT_CDATA_OPEN)
        || (text.starts_with("<![CDATA[") && text.ends_with("]]>"));
    if already_sectioned {
        out.push_str(text);
    } else {
        push_cdata(text, out);
    }
}

// A CDATA section cannot contain "]]>"; split into adjacent sections.
fn push_cdata(text: &str, out: &mut String) {
    out.push_str("<![CDATA[");
    let mut rest = text;
    while let Some(pos) = rest.find("]]>") {
        out.push_str(&rest[..pos + 2]);
        out.push_str("]]><![CDATA[");
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out.push_str("]]>");
}

/// Rewrites serializer-emitted CDATA sections around style/script payloads
/// into the comment-wrapped form that legacy non-XML-aware browsers accept:
/// `<!--/*--><![CDATA[/*><!--*/ … /*]]>*/-->` for style and the
/// comment-slashes variant for script.
pub fn cdata_fix(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            if let Some((next, replacement)) = match_cdata_open(input, i, "style")
                .or_else(|| match_cdata_open(input, i, "script"))
            {
                out.push_str(&replacement);
                i = next;
                continue;
            }
        }
        if bytes[i] == b']' {
            if input[i..].len() >= 3 && input[i..].starts_with("]]>") {
                let after = i + 3;
                if starts_with_close_tag(input, after, "style") {
                    out.push_str("/*]]>*/-->");
                    i = after;
                    continue;
                }
                if starts_with_close_tag(input, after, "script") {
                    out.push_str("//--><!]]>");
                    i = after;
                    continue;
                }
            }
        }
        let ch_len = next_char_len(input, i);
        out.push_str(&input[i..i + ch_len]);
        i += ch_len;
    }
    out
}

fn next_char_len(s: &str, i: usize) -> usize {
    let mut end = i + 1;
    while end < s.len() && !s.is_char_boundary(end) {
        end += 1;
    }
    end - i
}

// Matches `<style…attrs…>` (or script) followed by optional whitespace and
// `<![CDATA[`; returns the resume position and the rewritten opening.
fn match_cdata_open(input: &str, i: usize, tag: &str) -> Option<(usize, String)> {
    let bytes = input.as_bytes();
    let open = format!("<{tag}");
    if bytes.len() < i + open.len()
        || !bytes[i..i + open.len()].eq_ignore_ascii_case(open.as_bytes())
    {
        return None;
    }
    let mut j = i + open.len();
    // Reject longer tag names sharing the prefix.
    match bytes.get(j) {
        Some(b'>') | Some(b'/') => {}
        Some(b) if b.is_ascii_whitespace() => {}
        _ => return None,
    }
    let attrs_start = j;
    while j < bytes.len() && bytes[j] != b'>' {
        j += 1;
    }
    if j >= bytes.len() {
        return None;
    }
    let attrs = &input[attrs_start..j];
    j += 1;
    let mut k = j;
    while k < bytes.len() && bytes[k].is_ascii_whitespace() {
        k += 1;
    }
    if !input[k..].starts_with("<![CDATA[") {
        return None;
    }
    let resume = k + "<![CDATA[".len();
    let wrapper = if tag == "style" {
        STYLE_CDATA_OPEN
    } else {
        SCRIPT_CDATA_OPEN
    };
    Some((resume, format!("<{tag}{attrs}>{wrapper}")))
}

fn starts_with_close_tag(input: &str, i: usize, tag: &str) -> bool {
    let close = format!("</{tag}>");
    let bytes = input.as_bytes();
    bytes.len() >= i + close.len()
        && bytes[i..i + close.len()].eq_ignore_ascii_case(close.as_bytes())
}

/// Strips a leading XML prolog (plus one trailing whitespace character), used
/// when serialization introduced a prolog the original document never had.
pub fn strip_xml_prolog(input: &str) -> String {
    let bytes = input.as_bytes();
    if bytes.len() < 5 || !bytes[..5].eq_ignore_ascii_case(b"<?xml") {
        return input.to_string();
    }
    let Some(end) = input.find("?>") else {
        return input.to_string();
    };
    let mut rest = &input[end + 2..];
    let mut chars = rest.chars();
    if let Some(c) = chars.next() {
        if c.is_whitespace() {
            rest = chars.as_str();
        }
    }
    rest.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom_builder::build_dom;
    use crate::tokenizer::tokenize;

    fn roundtrip(input: &str, dialect: Dialect) -> String {
        serialize(&build_dom(&tokenize(input)), dialect)
    }

    #[test]
    fn html_keeps_void_elements_unclosed() {
        let out = roundtrip("<form action=\"/x\"><input type=\"text\" name=\"a\"></form>", Dialect::Html);
        assert_eq!(
            out,
            "<form action=\"/x\"><input type=\"text\" name=\"a\"></form>"
        );
    }

    #[test]
    fn html_emits_valueless_attributes_bare() {
        let out = roundtrip("<input checked>", Dialect::Html);
        assert_eq!(out, "<input checked>");
    }

    #[test]
    fn html_escapes_text_and_attributes() {
        let out = roundtrip("<p title=\"a &amp; b\">1 &lt; 2</p>", Dialect::Html);
        assert_eq!(out, "<p title=\"a &amp; b\">1 &lt; 2</p>");
    }

    #[test]
    fn html_emits_script_verbatim() {
        let out = roundtrip("<script>if (a < b && c) {}</script>", Dialect::Html);
        assert_eq!(out, "<script>if (a < b && c) {}</script>");
    }

    #[test]
    fn xhtml_self_closes_void_elements_and_emits_prolog() {
        let out = roundtrip("<input checked>", Dialect::Xhtml);
        assert_eq!(out, format!("{XML_PROLOG}<input checked=\"\" />"));
    }

    #[test]
    fn xhtml_wraps_script_in_cdata() {
        let out = roundtrip("<script>a < b</script>", Dialect::Xhtml);
        assert!(
            out.ends_with("<script><![CDATA[a < b]]></script>"),
            "got: {out}"
        );
    }

    #[test]
    fn xhtml_reserialization_of_wrapped_payloads_is_stable() {
        let style =
            "<style><!--/*--><![CDATA[/*><!--*/body { color: red; }/*]]>*/--></style>";
        let out = roundtrip(style, Dialect::Xhtml);
        assert!(out.ends_with(style), "got: {out}");

        let script = "<script><!--//--><![CDATA[//><!--var x;//--><!]]></script>";
        let out = roundtrip(script, Dialect::Xhtml);
        assert!(out.ends_with(script), "got: {out}");
    }

    #[test]
    fn xhtml_reserialization_of_plain_cdata_sections_is_stable() {
        let style = "<style><![CDATA[body { color: red; }]]></style>";
        let out = roundtrip(style, Dialect::Xhtml);
        assert!(out.ends_with(style), "got: {out}");
    }

    #[test]
    fn cdata_fix_leaves_wrapped_payloads_alone() {
        let wrapped =
            "<style type=\"text/css\"><!--/*--><![CDATA[/*><!--*/body{}/*]]>*/--></style>";
        assert_eq!(cdata_fix(wrapped), wrapped);
    }

    #[test]
    fn cdata_split_on_terminator_sequence() {
        let mut out = String::new();
        push_cdata("a]]>b", &mut out);
        assert_eq!(out, "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn doctype_is_preserved() {
        let out = roundtrip("<!DOCTYPE html><p>x</p>", Dialect::Html);
        assert_eq!(out, "<!DOCTYPE html><p>x</p>");
    }

    #[test]
    fn cdata_fix_rewrites_style_blocks() {
        let fixed = cdata_fix("<style type=\"text/css\"><![CDATA[body{}]]></style>");
        assert_eq!(
            fixed,
            "<style type=\"text/css\"><!--/*--><![CDATA[/*><!--*/body{}/*]]>*/--></style>"
        );
    }

    #[test]
    fn cdata_fix_rewrites_script_blocks() {
        let fixed = cdata_fix("<script><![CDATA[var x;]]></script>");
        assert_eq!(
            fixed,
            "<script><!--//--><![CDATA[//><!--var x;//--><!]]></script>"
        );
    }

    #[test]
    fn cdata_fix_ignores_plain_blocks_and_longer_tag_names() {
        let plain = "<script>var x;</script><stylesheet><![CDATA[x]]></stylesheet>";
        assert_eq!(cdata_fix(plain), plain);
    }

    #[test]
    fn strip_xml_prolog_removes_leading_prolog_only() {
        assert_eq!(
            strip_xml_prolog("<?xml version=\"1.0\"?>\n<html></html>"),
            "<html></html>"
        );
        assert_eq!(strip_xml_prolog("<html></html>"), "<html></html>");
    }
}
