//! Character reference decoding.
//!
//! Named entities cover the ones that actually show up in template
//! markup; numeric references (`&#65;` / `&#x41;`) decode for any
//! codepoint. Anything unrecognized passes through verbatim, ampersand
//! included.

use std::borrow::Cow;

use memchr::memchr;

const NAMED: [(&[u8], char); 16] = [
    (b"lt", '<'),
    (b"gt", '>'),
    (b"amp", '&'),
    (b"quot", '"'),
    (b"apos", '\''),
    (b"nbsp", '\u{a0}'),
    (b"copy", '\u{a9}'),
    (b"reg", '\u{ae}'),
    (b"trade", '\u{2122}'),
    (b"ndash", '\u{2013}'),
    (b"mdash", '\u{2014}'),
    (b"lsquo", '\u{2018}'),
    (b"rsquo", '\u{2019}'),
    (b"ldquo", '\u{201c}'),
    (b"rdquo", '\u{201d}'),
    (b"hellip", '\u{2026}'),
];

/// Decode text content. Borrows when the input contains no ampersand at
/// all, which is the common case for template text.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input))
}

pub fn decode_entities(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = memchr(b'&', rest) {
        out.extend_from_slice(&rest[..amp]);
        rest = &rest[amp..];
        match reference_at(rest) {
            Some((ch, consumed)) => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
                rest = &rest[consumed..];
            }
            None => {
                // Bare or unknown ampersand passes through; its tail is
                // re-scanned as ordinary text
                out.push(b'&');
                rest = &rest[1..];
            }
        }
    }
    out.extend_from_slice(rest);
    out
}

/// Decode the reference starting at `rest[0] == b'&'`. Returns the
/// character and the byte count consumed, both delimiters included.
fn reference_at(rest: &[u8]) -> Option<(char, usize)> {
    let semi = memchr(b';', rest)?;
    let body = &rest[1..semi];
    let ch = match body.split_first() {
        Some((b'#', digits)) => numeric_reference(digits)?,
        _ => named_reference(body)?,
    };
    Some((ch, semi + 1))
}

fn numeric_reference(digits: &[u8]) -> Option<char> {
    let (radix, digits) = match digits.split_first() {
        Some((b'x' | b'X', hex)) => (16, hex),
        _ => (10, digits),
    };
    let text = std::str::from_utf8(digits).ok()?;
    let codepoint = u32::from_str_radix(text, radix).ok()?;
    char::from_u32(codepoint)
}

fn named_reference(body: &[u8]) -> Option<char> {
    NAMED
        .iter()
        .find(|(name, _)| *name == body)
        .map(|&(_, ch)| ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_borrows() {
        let result = decode_text(b"Hello, World!");
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result.as_ref(), b"Hello, World!");
    }

    #[test]
    fn test_core_named_entities() {
        let result = decode_text(b"&lt;hello&gt; &amp; &quot;world&quot;");
        assert_eq!(result.as_ref(), b"<hello> & \"world\"");
    }

    #[test]
    fn test_nbsp_decodes_to_a0() {
        let result = decode_text(b"a&nbsp;b");
        assert_eq!(std::str::from_utf8(result.as_ref()).unwrap(), "a\u{a0}b");
    }

    #[test]
    fn test_typographic_entities() {
        let result = decode_text(b"a&mdash;b&hellip;");
        assert_eq!(
            std::str::from_utf8(result.as_ref()).unwrap(),
            "a\u{2014}b\u{2026}"
        );
    }

    #[test]
    fn test_numeric_references() {
        assert_eq!(decode_text(b"&#65;&#66;&#67;").as_ref(), b"ABC");
        assert_eq!(decode_text(b"&#x41;&#x42;&#x43;").as_ref(), b"ABC");
    }

    #[test]
    fn test_unknown_entity_passes_through() {
        let result = decode_text(b"&unknown;");
        assert_eq!(result.as_ref(), b"&unknown;");
    }

    #[test]
    fn test_bare_ampersand_survives() {
        let result = decode_text(b"fish & chips");
        assert_eq!(result.as_ref(), b"fish & chips");
    }
}
