//! Attribute parsing for raw tag content.
//!
//! Tolerates what real markup contains: double-quoted, single-quoted,
//! unquoted, and bare boolean attributes. Names canonicalize to ASCII
//! lowercase; values get their character references decoded.

use std::borrow::Cow;

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char};

#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// ASCII-lowercased
    pub name: Cow<'a, [u8]>,
    /// Entities decoded; empty for bare attributes
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        let name = if name.iter().any(u8::is_ascii_uppercase) {
            Cow::Owned(name.to_ascii_lowercase())
        } else {
            Cow::Borrowed(name)
        };
        Attribute { name, value }
    }

    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.name).ok()
    }

    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.value).ok()
    }
}

/// Parse the run between the element name and the closing `>`.
pub fn parse_attributes(input: &[u8]) -> Vec<Attribute<'_>> {
    let mut cursor = AttrCursor { input, pos: 0 };
    let mut attrs = Vec::new();
    while let Some(attr) = cursor.next_attribute() {
        attrs.push(attr);
    }
    attrs
}

struct AttrCursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> AttrCursor<'a> {
    fn next_attribute(&mut self) -> Option<Attribute<'a>> {
        loop {
            self.skip_whitespace();
            match self.peek()? {
                b'/' | b'>' => return None,
                b if is_name_start_char(b) => break,
                // Junk byte, resync on the next name
                _ => self.pos += 1,
            }
        }
        let name = self.take_while(is_name_char);
        self.skip_whitespace();
        if self.peek() != Some(b'=') {
            return Some(Attribute::new(name, Cow::Borrowed(b"")));
        }
        self.pos += 1;
        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                self.pos += 1;
                let body = self.take_while(|b| b != q);
                self.pos = (self.pos + 1).min(self.input.len());
                body
            }
            Some(_) => self.take_while(|b| !is_whitespace(b) && b != b'>'),
            None => b"" as &[u8],
        };
        Some(Attribute::new(name, decode_text(value)))
    }

    fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a [u8] {
        let start = self.pos;
        while self.pos < self.input.len() && keep(self.input[self.pos]) {
            self.pos += 1;
        }
        &self.input[start..self.pos]
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
}

#[inline]
fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_and_single_quotes() {
        let attrs = parse_attributes(b" id=\"test\" class='foo'");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("test"));
        assert_eq!(attrs[1].name_str(), Some("class"));
        assert_eq!(attrs[1].value_str(), Some("foo"));
    }

    #[test]
    fn test_names_fold_to_lowercase() {
        let attrs = parse_attributes(b" ID=\"x\" OnClick='f()'");
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[1].name_str(), Some("onclick"));
    }

    #[test]
    fn test_unquoted_values() {
        let attrs = parse_attributes(b" width=100 align=left");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].value_str(), Some("100"));
        assert_eq!(attrs[1].value_str(), Some("left"));
    }

    #[test]
    fn test_bare_attributes_get_empty_values() {
        let attrs = parse_attributes(b" checked disabled");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].name_str(), Some("checked"));
        assert_eq!(attrs[0].value_str(), Some(""));
        assert_eq!(attrs[1].name_str(), Some("disabled"));
    }

    #[test]
    fn test_entities_decode_in_values() {
        let attrs = parse_attributes(b" title=\"&lt;hello&gt;\"");
        assert_eq!(attrs[0].value_str(), Some("<hello>"));
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_attributes(b"").is_empty());
    }

    #[test]
    fn test_space_padded_equals() {
        let attrs = parse_attributes(b"  id  =  \"test\"  ");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("test"));
    }

    #[test]
    fn test_unterminated_quote_takes_the_rest() {
        let attrs = parse_attributes(b" id=\"unclosed");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].value_str(), Some("unclosed"));
    }

    #[test]
    fn test_stray_bytes_resync() {
        let attrs = parse_attributes(b" = id='x'");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs[0].name_str(), Some("id"));
        assert_eq!(attrs[0].value_str(), Some("x"));
    }
}
