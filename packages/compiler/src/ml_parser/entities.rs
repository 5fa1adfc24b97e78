//! HTML Character References
//!
//! Named and numeric references decoded in attribute values and text. Named
//! references need their terminating `;`; unknown ones stay literal.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::parse_util::OffsetMap;

pub static NAMED_ENTITIES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    [
        ("amp", "&"),
        ("lt", "<"),
        ("gt", ">"),
        ("quot", "\""),
        ("apos", "'"),
        ("nbsp", "\u{00A0}"),
        ("iexcl", "\u{00A1}"),
        ("cent", "\u{00A2}"),
        ("pound", "\u{00A3}"),
        ("curren", "\u{00A4}"),
        ("yen", "\u{00A5}"),
        ("brvbar", "\u{00A6}"),
        ("sect", "\u{00A7}"),
        ("uml", "\u{00A8}"),
        ("copy", "\u{00A9}"),
        ("ordf", "\u{00AA}"),
        ("laquo", "\u{00AB}"),
        ("not", "\u{00AC}"),
        ("shy", "\u{00AD}"),
        ("reg", "\u{00AE}"),
        ("macr", "\u{00AF}"),
        ("deg", "\u{00B0}"),
        ("plusmn", "\u{00B1}"),
        ("sup2", "\u{00B2}"),
        ("sup3", "\u{00B3}"),
        ("acute", "\u{00B4}"),
        ("micro", "\u{00B5}"),
        ("para", "\u{00B6}"),
        ("middot", "\u{00B7}"),
        ("cedil", "\u{00B8}"),
        ("sup1", "\u{00B9}"),
        ("ordm", "\u{00BA}"),
        ("raquo", "\u{00BB}"),
        ("frac14", "\u{00BC}"),
        ("frac12", "\u{00BD}"),
        ("frac34", "\u{00BE}"),
        ("iquest", "\u{00BF}"),
        ("times", "\u{00D7}"),
        ("divide", "\u{00F7}"),
        ("ndash", "\u{2013}"),
        ("mdash", "\u{2014}"),
        ("lsquo", "\u{2018}"),
        ("rsquo", "\u{2019}"),
        ("sbquo", "\u{201A}"),
        ("ldquo", "\u{201C}"),
        ("rdquo", "\u{201D}"),
        ("bdquo", "\u{201E}"),
        ("dagger", "\u{2020}"),
        ("Dagger", "\u{2021}"),
        ("bull", "\u{2022}"),
        ("hellip", "\u{2026}"),
        ("permil", "\u{2030}"),
        ("prime", "\u{2032}"),
        ("lsaquo", "\u{2039}"),
        ("rsaquo", "\u{203A}"),
        ("euro", "\u{20AC}"),
        ("trade", "\u{2122}"),
        ("larr", "\u{2190}"),
        ("uarr", "\u{2191}"),
        ("rarr", "\u{2192}"),
        ("darr", "\u{2193}"),
        ("harr", "\u{2194}"),
        ("minus", "\u{2212}"),
        ("le", "\u{2264}"),
        ("ge", "\u{2265}"),
        ("ne", "\u{2260}"),
        ("infin", "\u{221E}"),
        ("ensp", "\u{2002}"),
        ("emsp", "\u{2003}"),
        ("thinsp", "\u{2009}"),
        ("zwnj", "\u{200C}"),
        ("zwj", "\u{200D}"),
        ("lrm", "\u{200E}"),
        ("rlm", "\u{200F}"),
    ]
    .into_iter()
    .collect()
});

/// Decode the character references in `raw`, which starts at absolute offset `origin`.
pub fn decode_entities(raw: &str, origin: usize) -> (String, OffsetMap) {
    let mut map = OffsetMap::verbatim(origin);
    if !raw.contains('&') {
        return (raw.to_string(), map);
    }
    let mut out = String::with_capacity(raw.len());
    let mut pos = 0;
    while let Some(found) = raw[pos..].find('&') {
        let at = pos + found;
        out.push_str(&raw[pos..at]);
        match read_reference(&raw[at..]) {
            Some((len, decoded)) => {
                let start = out.len();
                out.push_str(&decoded);
                map.record((start, out.len()), (at, at + len));
                pos = at + len;
            }
            None => {
                out.push('&');
                pos = at + 1;
            }
        }
    }
    out.push_str(&raw[pos..]);
    (out, map)
}

/// Length and expansion of the reference at the start of `text` (which begins with `&`).
fn read_reference(text: &str) -> Option<(usize, String)> {
    let body = &text[1..];
    if let Some(numeric) = body.strip_prefix('#') {
        let (digits, radix, prefix) = match numeric.strip_prefix('x').or_else(|| numeric.strip_prefix('X')) {
            Some(hex) => (hex, 16, 3),
            None => (numeric, 10, 2),
        };
        let count = digits
            .bytes()
            .take_while(|b| if radix == 16 { b.is_ascii_hexdigit() } else { b.is_ascii_digit() })
            .count();
        if count == 0 {
            return None;
        }
        let ch = u32::from_str_radix(&digits[..count], radix)
            .ok()
            .and_then(char::from_u32)
            .filter(|c| *c != '\0')
            .unwrap_or('\u{FFFD}');
        let mut len = prefix + count;
        if text[len..].starts_with(';') {
            len += 1;
        }
        return Some((len, ch.to_string()));
    }
    let count = body.bytes().take_while(u8::is_ascii_alphanumeric).count();
    if count == 0 || !body[count..].starts_with(';') {
        return None;
    }
    let value = NAMED_ENTITIES.get(&body[..count])?;
    Some((count + 2, value.to_string()))
}
