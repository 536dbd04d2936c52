//! Tolerant HTML tokenizer with a constrained, practical tag-name character set.
//!
//! Supported tag/attribute name characters (ASCII only): `[A-Za-z0-9:_-]`.
//!
//! This is not a full HTML5 state machine. The input is rendered output of
//! unknown quality, so the contract is best-effort: anything that cannot be
//! read as a tag, comment, doctype, processing instruction, or CDATA section
//! falls out as plain text, and tokenization never fails.
//!
//! Known limitations (intentional):
//! - No HTML5 parse-error recovery paths.
//! - Rawtext close-tag scanning accepts only ASCII whitespace before `>`.
use crate::entities::decode_entities;
use crate::types::Token;
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";
const CDATA_START: &str = "<![CDATA[";
const CDATA_END: &str = "]]>";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

// Rawtext close tags only begin at ASCII '<', which cannot appear in UTF-8
// continuation bytes, so a byte scan is safe.
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";
const TEXTAREA_CLOSE_TAG: &[u8] = b"</textarea";

fn rawtext_close_tag(name: &str) -> Option<&'static [u8]> {
    if name.eq_ignore_ascii_case("script") {
        Some(SCRIPT_CLOSE_TAG)
    } else if name.eq_ignore_ascii_case("style") {
        Some(STYLE_CLOSE_TAG)
    } else if name.eq_ignore_ascii_case("textarea") {
        Some(TEXTAREA_CLOSE_TAG)
    } else {
        None
    }
}

fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = close_tag.len();
    debug_assert!(close_tag.starts_with(b"</") && close_tag.is_ascii());
    if len < n {
        return None;
    }
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if hay_bytes[i + 1] == b'/' && starts_with_ignore_ascii_case_at(hay_bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

pub(crate) fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub fn tokenize(input: &str) -> Vec<Token> {
    let mut out = Vec::new();
    let mut i = 0;
    let bytes = input.as_bytes();
    // Invariant: slices are only cut at ASCII structural bytes or at positions
    // reached by scanning ASCII-only tokens, so endpoints stay UTF-8 boundaries.
    while i < bytes.len() {
        if bytes[i] != b'<' {
            let start = i;
            while i < bytes.len() && bytes[i] != b'<' {
                i += 1;
            }
            let decoded = decode_entities(&input[start..i]);
            if !decoded.is_empty() {
                out.push(Token::Text(decoded));
            }
            continue;
        }
        if input[i..].starts_with(HTML_COMMENT_START) {
            let body_start = i + HTML_COMMENT_START.len();
            if let Some(end) = input[body_start..].find(HTML_COMMENT_END) {
                out.push(Token::Comment(input[body_start..body_start + end].to_string()));
                i = body_start + end + HTML_COMMENT_END.len();
            } else {
                out.push(Token::Comment(input[body_start..].to_string()));
                i = bytes.len();
            }
            continue;
        }
        if input[i..].starts_with(CDATA_START) {
            // CDATA outside rawtext elements degrades to a text run.
            let body_start = i + CDATA_START.len();
            if let Some(end) = input[body_start..].find(CDATA_END) {
                let body = &input[body_start..body_start + end];
                if !body.is_empty() {
                    out.push(Token::Text(body.to_string()));
                }
                i = body_start + end + CDATA_END.len();
            } else {
                out.push(Token::Text(input[body_start..].to_string()));
                i = bytes.len();
            }
            continue;
        }
        if i + 1 < bytes.len() && bytes[i + 1] == b'?' {
            // Processing instruction (e.g. an XML prolog). Prolog presence is
            // detected by a separate textual scan; the node itself is dropped.
            if let Some(end) = input[i + 2..].find('>') {
                i += 2 + end + 1;
            } else {
                i = bytes.len();
            }
            continue;
        }
        if starts_with_ignore_ascii_case_at(bytes, i, b"<!doctype") {
            let rest = &input[i + 2..];
            if let Some(end) = rest.find('>') {
                out.push(Token::Doctype(rest[..end].trim().to_string()));
                i += 2 + end + 1;
                continue;
            }
            break;
        }
        // end tag?
        if i + 2 <= bytes.len() && bytes[i + 1] == b'/' {
            let start = i + 2;
            let mut j = start;
            while j < bytes.len() && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = input[start..j].to_ascii_lowercase();
            while j < bytes.len() && bytes[j] != b'>' {
                j += 1;
            }
            if j < bytes.len() {
                j += 1;
            }
            out.push(Token::EndTag(name));
            i = j;
            continue;
        }
        // start tag
        let start = i + 1;
        let mut j = start;
        while j < bytes.len() && is_name_char(bytes[j]) {
            j += 1;
        }
        if j == start {
            // '<' followed by nothing tag-like; treat the bracket as text.
            out.push(Token::Text("<".to_string()));
            i += 1;
            continue;
        }
        let name = input[start..j].to_ascii_lowercase();
        let mut k = j;
        let mut attributes: Vec<(String, Option<String>)> = Vec::new();
        let len = bytes.len();
        let mut self_closing = false;

        let skip_whitespace = |k: &mut usize| {
            while *k < len && bytes[*k].is_ascii_whitespace() {
                *k += 1;
            }
        };

        loop {
            skip_whitespace(&mut k);
            if k >= len {
                break;
            }
            if bytes[k] == b'>' {
                k += 1;
                break;
            }
            if bytes[k] == b'/' {
                if k + 1 < len && bytes[k + 1] == b'>' {
                    self_closing = true;
                    k += 2;
                    break;
                }
                k += 1;
                continue;
            }
            let name_start = k;
            while k < len && is_name_char(bytes[k]) {
                k += 1;
            }
            if name_start == k {
                k += 1;
                continue;
            }
            let attribute_name = input[name_start..k].to_ascii_lowercase();

            skip_whitespace(&mut k);
            let value: Option<String>;
            if k < len && bytes[k] == b'=' {
                k += 1;
                skip_whitespace(&mut k);
                if k < len && (bytes[k] == b'"' || bytes[k] == b'\'') {
                    let quote = bytes[k];
                    k += 1;
                    let vstart = k;
                    while k < len && bytes[k] != quote {
                        k += 1;
                    }
                    let raw = &input[vstart..k];
                    if k < len {
                        k += 1;
                    }
                    value = Some(decode_entities(raw));
                } else {
                    let vstart = k;
                    while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                        if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                            break;
                        }
                        k += 1;
                    }
                    value = Some(decode_entities(&input[vstart..k]));
                }
            } else {
                value = None;
            }
            attributes.push((attribute_name, value));
        }
        if is_void_element(&name) {
            self_closing = true;
        }
        if k < len && bytes[k] == b'>' {
            k += 1;
        }
        let content_start = k;
        let rawtext = if self_closing {
            None
        } else {
            rawtext_close_tag(&name)
        };

        out.push(Token::StartTag {
            name: name.clone(),
            attributes,
            self_closing,
        });

        if let Some(close_tag) = rawtext {
            // Textarea is escapable rawtext; script and style are verbatim.
            let decode = name == "textarea";
            let j = content_start;
            if let Some((rel_start, rel_end)) = find_rawtext_close_tag(&input[j..], close_tag) {
                let raw = &input[j..j + rel_start];
                if !raw.is_empty() {
                    out.push(Token::Text(if decode {
                        decode_entities(raw)
                    } else {
                        raw.to_string()
                    }));
                }
                out.push(Token::EndTag(name));
                i = j + rel_end;
            } else {
                // Missing close tag: the remainder is rawtext content.
                let raw = &input[j..];
                if !raw.is_empty() {
                    out.push(Token::Text(if decode {
                        decode_entities(raw)
                    } else {
                        raw.to_string()
                    }));
                }
                out.push(Token::EndTag(name));
                i = bytes.len();
            }
            continue;
        }

        i = content_start;
    }
    out
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}
