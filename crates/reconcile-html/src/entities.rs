//! Character reference decoding.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//!
//! Text and attribute values are decoded in one pass after the tokenizer has
//! found their extent, rather than character by character. Unknown references
//! are left untouched. The named table covers the entities that show up in
//! real markup; the full spec defines 2,231 of them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Longest entity name in the table, including the trailing `;`.
const MAX_NAME_LEN: usize = 10;

/// Maps entity names (without the leading '&') to their replacement strings.
///
/// Entities are matched WITH the trailing semicolon when present, but some
/// legacy entities also work without it (e.g. "&amp" matches like "&amp;").
static NAMED_ENTITIES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("amp;", "&"),
        ("amp", "&"), // Legacy (no semicolon)
        ("lt;", "<"),
        ("lt", "<"),
        ("gt;", ">"),
        ("gt", ">"),
        ("quot;", "\""),
        ("quot", "\""),
        ("apos;", "'"),
        ("nbsp;", "\u{00A0}"),
        ("nbsp", "\u{00A0}"),
        ("copy;", "\u{00A9}"),
        ("copy", "\u{00A9}"),
        ("reg;", "\u{00AE}"),
        ("reg", "\u{00AE}"),
        ("trade;", "\u{2122}"),
        ("mdash;", "\u{2014}"),
        ("ndash;", "\u{2013}"),
        ("hellip;", "\u{2026}"),
        ("bull;", "\u{2022}"),
        ("middot;", "\u{00B7}"),
        ("middot", "\u{00B7}"),
        ("lsquo;", "\u{2018}"),
        ("rsquo;", "\u{2019}"),
        ("sbquo;", "\u{201A}"),
        ("ldquo;", "\u{201C}"),
        ("rdquo;", "\u{201D}"),
        ("bdquo;", "\u{201E}"),
        ("laquo;", "\u{00AB}"),
        ("laquo", "\u{00AB}"),
        ("raquo;", "\u{00BB}"),
        ("raquo", "\u{00BB}"),
        ("lsaquo;", "\u{2039}"),
        ("rsaquo;", "\u{203A}"),
        ("dagger;", "\u{2020}"),
        ("Dagger;", "\u{2021}"),
        ("permil;", "\u{2030}"),
        ("prime;", "\u{2032}"),
        ("Prime;", "\u{2033}"),
        ("sect;", "\u{00A7}"),
        ("sect", "\u{00A7}"),
        ("para;", "\u{00B6}"),
        ("para", "\u{00B6}"),
        ("iexcl;", "\u{00A1}"),
        ("iexcl", "\u{00A1}"),
        ("iquest;", "\u{00BF}"),
        ("iquest", "\u{00BF}"),
        ("shy;", "\u{00AD}"),
        ("shy", "\u{00AD}"),
        ("ensp;", "\u{2002}"),
        ("emsp;", "\u{2003}"),
        ("thinsp;", "\u{2009}"),
        ("zwnj;", "\u{200C}"),
        ("zwj;", "\u{200D}"),
        ("lrm;", "\u{200E}"),
        ("rlm;", "\u{200F}"),
        // Currency
        ("cent;", "\u{00A2}"),
        ("cent", "\u{00A2}"),
        ("pound;", "\u{00A3}"),
        ("pound", "\u{00A3}"),
        ("euro;", "\u{20AC}"),
        ("yen;", "\u{00A5}"),
        ("yen", "\u{00A5}"),
        ("curren;", "\u{00A4}"),
        ("curren", "\u{00A4}"),
        // Math symbols
        ("times;", "\u{00D7}"),
        ("times", "\u{00D7}"),
        ("divide;", "\u{00F7}"),
        ("divide", "\u{00F7}"),
        ("plusmn;", "\u{00B1}"),
        ("plusmn", "\u{00B1}"),
        ("minus;", "\u{2212}"),
        ("ne;", "\u{2260}"),
        ("le;", "\u{2264}"),
        ("ge;", "\u{2265}"),
        ("asymp;", "\u{2248}"),
        ("equiv;", "\u{2261}"),
        ("infin;", "\u{221E}"),
        ("sum;", "\u{2211}"),
        ("prod;", "\u{220F}"),
        ("radic;", "\u{221A}"),
        ("part;", "\u{2202}"),
        ("int;", "\u{222B}"),
        ("deg;", "\u{00B0}"),
        ("deg", "\u{00B0}"),
        ("micro;", "\u{00B5}"),
        ("micro", "\u{00B5}"),
        ("frac12;", "\u{00BD}"),
        ("frac12", "\u{00BD}"),
        ("frac14;", "\u{00BC}"),
        ("frac14", "\u{00BC}"),
        ("frac34;", "\u{00BE}"),
        ("frac34", "\u{00BE}"),
        ("sup1;", "\u{00B9}"),
        ("sup2;", "\u{00B2}"),
        ("sup3;", "\u{00B3}"),
        // Arrows
        ("larr;", "\u{2190}"),
        ("uarr;", "\u{2191}"),
        ("rarr;", "\u{2192}"),
        ("darr;", "\u{2193}"),
        ("harr;", "\u{2194}"),
        ("lArr;", "\u{21D0}"),
        ("rArr;", "\u{21D2}"),
        ("hArr;", "\u{21D4}"),
        // Greek letters
        ("alpha;", "\u{03B1}"),
        ("beta;", "\u{03B2}"),
        ("gamma;", "\u{03B3}"),
        ("delta;", "\u{03B4}"),
        ("epsilon;", "\u{03B5}"),
        ("lambda;", "\u{03BB}"),
        ("mu;", "\u{03BC}"),
        ("pi;", "\u{03C0}"),
        ("sigma;", "\u{03C3}"),
        ("tau;", "\u{03C4}"),
        ("phi;", "\u{03C6}"),
        ("omega;", "\u{03C9}"),
        ("Delta;", "\u{0394}"),
        ("Sigma;", "\u{03A3}"),
        ("Omega;", "\u{03A9}"),
        // Latin-1 letters
        ("Agrave;", "\u{00C0}"),
        ("Aacute;", "\u{00C1}"),
        ("Auml;", "\u{00C4}"),
        ("Auml", "\u{00C4}"),
        ("Ccedil;", "\u{00C7}"),
        ("Eacute;", "\u{00C9}"),
        ("Ntilde;", "\u{00D1}"),
        ("Ouml;", "\u{00D6}"),
        ("Ouml", "\u{00D6}"),
        ("Uuml;", "\u{00DC}"),
        ("Uuml", "\u{00DC}"),
        ("szlig;", "\u{00DF}"),
        ("szlig", "\u{00DF}"),
        ("agrave;", "\u{00E0}"),
        ("aacute;", "\u{00E1}"),
        ("acirc;", "\u{00E2}"),
        ("auml;", "\u{00E4}"),
        ("auml", "\u{00E4}"),
        ("aring;", "\u{00E5}"),
        ("ccedil;", "\u{00E7}"),
        ("egrave;", "\u{00E8}"),
        ("eacute;", "\u{00E9}"),
        ("eacute", "\u{00E9}"),
        ("ecirc;", "\u{00EA}"),
        ("iacute;", "\u{00ED}"),
        ("ntilde;", "\u{00F1}"),
        ("oacute;", "\u{00F3}"),
        ("ouml;", "\u{00F6}"),
        ("ouml", "\u{00F6}"),
        ("oslash;", "\u{00F8}"),
        ("uacute;", "\u{00FA}"),
        ("uuml;", "\u{00FC}"),
        ("uuml", "\u{00FC}"),
    ])
});

/// Decode character references in text content.
///
/// Mirrors what `html.UnescapeString`-style helpers do: named, decimal and
/// hexadecimal references are replaced; anything unrecognized is kept as is.
#[must_use]
pub fn unescape(input: &str) -> Cow<'_, str> {
    decode(input, false)
}

/// Decode character references in an attribute value.
///
/// [§ 13.2.5.73](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
/// "If the character reference was consumed as part of an attribute, and the
/// last character matched is not a U+003B SEMICOLON character (;), and the
/// next input character is either a U+003D EQUALS SIGN character (=) or an
/// ASCII alphanumeric, then, for historical reasons, flush code points
/// consumed as a character reference and switch to the return state."
#[must_use]
pub fn unescape_attribute(input: &str) -> Cow<'_, str> {
    decode(input, true)
}

fn decode(input: &str, in_attribute: bool) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        match decode_reference(after, in_attribute, &mut out) {
            Some(consumed) => rest = &after[consumed..],
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Try to decode the reference that starts right after a `&`.
///
/// On success, appends the replacement to `out` and returns how many bytes of
/// `after` were consumed.
fn decode_reference(after: &str, in_attribute: bool, out: &mut String) -> Option<usize> {
    if let Some(numeric) = after.strip_prefix('#') {
        let consumed = decode_numeric(numeric, out)?;
        return Some(consumed + 1);
    }
    decode_named(after, in_attribute, out)
}

/// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
fn decode_numeric(after_hash: &str, out: &mut String) -> Option<usize> {
    let (radix, prefix_len) = match after_hash.as_bytes().first() {
        Some(b'x' | b'X') => (16, 1),
        _ => (10, 0),
    };
    let digits = &after_hash[prefix_len..];
    let digit_len = digits
        .bytes()
        .take_while(|b| char::from(*b).is_digit(radix))
        .count();
    if digit_len == 0 {
        // "absence-of-digits-in-numeric-character-reference parse error"
        return None;
    }

    let mut code: u32 = 0;
    for b in digits[..digit_len].bytes() {
        let digit = char::from(b).to_digit(radix).unwrap_or(0);
        code = code
            .checked_mul(radix)
            .and_then(|c| c.checked_add(digit))
            .unwrap_or(u32::MAX);
    }
    out.push(numeric_replacement(code));

    let mut consumed = prefix_len + digit_len;
    if digits[digit_len..].starts_with(';') {
        consumed += 1;
    }
    Some(consumed)
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
fn numeric_replacement(code: u32) -> char {
    let remapped = match code {
        0x80 => 0x20AC,
        0x82 => 0x201A,
        0x83 => 0x0192,
        0x84 => 0x201E,
        0x85 => 0x2026,
        0x86 => 0x2020,
        0x87 => 0x2021,
        0x88 => 0x02C6,
        0x89 => 0x2030,
        0x8A => 0x0160,
        0x8B => 0x2039,
        0x8C => 0x0152,
        0x8E => 0x017D,
        0x91 => 0x2018,
        0x92 => 0x2019,
        0x93 => 0x201C,
        0x94 => 0x201D,
        0x95 => 0x2022,
        0x96 => 0x2013,
        0x97 => 0x2014,
        0x98 => 0x02DC,
        0x99 => 0x2122,
        0x9A => 0x0161,
        0x9B => 0x203A,
        0x9C => 0x0153,
        0x9E => 0x017E,
        0x9F => 0x0178,
        // "null-character-reference parse error": U+FFFD
        0 => 0xFFFD,
        other => other,
    };
    // Surrogates and values past U+10FFFF are rejected by `from_u32`.
    char::from_u32(remapped).unwrap_or('\u{FFFD}')
}

/// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
///
/// "Consume the maximum number of characters possible, where the consumed
/// characters are one of the identifiers in the named character references
/// table."
fn decode_named(after: &str, in_attribute: bool, out: &mut String) -> Option<usize> {
    let name_len = after
        .bytes()
        .take(MAX_NAME_LEN)
        .take_while(u8::is_ascii_alphanumeric)
        .count();
    if name_len == 0 {
        return None;
    }

    if after[name_len..].starts_with(';') {
        if let Some(replacement) = NAMED_ENTITIES.get(&after[..=name_len]) {
            out.push_str(replacement);
            return Some(name_len + 1);
        }
    }

    // Legacy entities: longest prefix without a semicolon.
    for len in (2..=name_len).rev() {
        let Some(replacement) = NAMED_ENTITIES.get(&after[..len]) else {
            continue;
        };
        let next = after[len..].bytes().next();
        if in_attribute && next.is_some_and(|b| b == b'=' || b.is_ascii_alphanumeric()) {
            return None;
        }
        out.push_str(replacement);
        return Some(len);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_references_borrows() {
        assert!(matches!(unescape("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn test_named_references() {
        assert_eq!(unescape("a &lt;b&gt; &amp; c"), "a <b> & c");
        assert_eq!(unescape("&copy; 2024"), "\u{00A9} 2024");
    }

    #[test]
    fn test_legacy_reference_without_semicolon() {
        assert_eq!(unescape("fish &amp chips"), "fish & chips");
        assert_eq!(unescape("&ampx"), "&x");
    }

    #[test]
    fn test_legacy_reference_in_attribute_is_kept() {
        assert_eq!(unescape_attribute("?a=1&amp=2"), "?a=1&amp=2");
        assert_eq!(unescape_attribute("?a=1&ampb"), "?a=1&ampb");
        assert_eq!(unescape_attribute("?a=1&amp;b"), "?a=1&b");
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(unescape("&#65;&#x42;&#X43"), "ABC");
        assert_eq!(unescape("&#0;"), "\u{FFFD}");
        assert_eq!(unescape("&#x80;"), "\u{20AC}");
        assert_eq!(unescape("&#xD800;"), "\u{FFFD}");
        assert_eq!(unescape("&#99999999999;"), "\u{FFFD}");
    }

    #[test]
    fn test_unknown_references_untouched() {
        assert_eq!(unescape("&bogus; & &#; &#x;"), "&bogus; & &#; &#x;");
    }
}
