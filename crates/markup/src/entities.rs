//! Minimal entity decoding and escaping.
//!
//! Decoded named entities: `&amp;`, `&lt;`, `&gt;`, `&quot;`, `&apos;`,
//! `&nbsp;`. Numeric references (`&#215;`, `&#xD7;`) decode only when
//! well-formed, semicolon-terminated, and a valid Unicode scalar. Everything
//! else passes through unchanged. This is intentionally not HTML5-complete;
//! the narrow contract keeps decode/escape round trips stable.

const NAMED: &[(&str, char)] = &[
    ("&amp;", '&'),
    ("&lt;", '<'),
    ("&gt;", '>'),
    ("&quot;", '"'),
    ("&apos;", '\''),
    ("&nbsp;", '\u{00A0}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

// Bounded scan so adversarial digit runs stay linear.
fn scan_numeric(bytes: &[u8], start: usize, max_digits: usize, hex: bool) -> Option<usize> {
    let mut j = start;
    let mut digits = 0usize;
    while j < bytes.len() {
        let b = bytes[j];
        if b == b';' {
            return (digits > 0).then_some(j);
        }
        if digits == max_digits {
            return None;
        }
        let ok = if hex {
            b.is_ascii_hexdigit()
        } else {
            b.is_ascii_digit()
        };
        if !ok {
            return None;
        }
        digits += 1;
        j += 1;
    }
    None
}

pub(crate) fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let mut copy_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }
        if copy_start < i {
            out.push_str(&s[copy_start..i]);
        }

        if let Some((name, ch)) = NAMED
            .iter()
            .find(|(name, _)| s[i..].starts_with(name))
        {
            out.push(*ch);
            i += name.len();
            copy_start = i;
            continue;
        }

        let (digits_start, hex, max) = if s[i..].starts_with("&#x") || s[i..].starts_with("&#X") {
            (i + 3, true, MAX_HEX_DIGITS)
        } else if s[i..].starts_with("&#") {
            (i + 2, false, MAX_DEC_DIGITS)
        } else {
            // Unknown entity, keep the '&' as-is.
            out.push('&');
            i += 1;
            copy_start = i;
            continue;
        };

        let Some(end) = scan_numeric(bytes, digits_start, max, hex) else {
            out.push('&');
            i += 1;
            copy_start = i;
            continue;
        };
        let digits = &s[digits_start..end];
        let scalar = if hex {
            u32::from_str_radix(digits, 16).ok()
        } else {
            digits.parse::<u32>().ok()
        };
        if let Some(ch) = scalar.and_then(char::from_u32) {
            out.push(ch);
        } else {
            // Well-terminated but not a valid scalar; keep the sequence.
            out.push_str(&s[i..=end]);
        }
        i = end + 1;
        copy_start = i;
    }

    if copy_start < bytes.len() {
        out.push_str(&s[copy_start..]);
    }
    out
}

/// Escape text content for serialization.
pub(crate) fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape a double-quoted attribute value.
pub(crate) fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
