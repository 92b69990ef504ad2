//! Byte cursor over the raw input.
//!
//! Delimiter hunts go through memchr, which picks SSE2/AVX2/NEON at
//! runtime. The tokenizer only ever moves the cursor forward.

use memchr::{memchr, memchr3_iter, memchr_iter, memmem};

pub struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    #[inline]
    pub fn new(bytes: &'a [u8]) -> Self {
        Scanner { bytes, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    #[inline]
    pub fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Absolute positions; callers pass values previously handed out by
    /// the find methods.
    #[inline]
    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.bytes[start..end]
    }

    #[inline]
    pub fn starts_with(&self, needle: &[u8]) -> bool {
        self.bytes[self.pos..].starts_with(needle)
    }

    /// Position of the next `<`.
    #[inline]
    pub fn find_tag_start(&self) -> Option<usize> {
        memchr(b'<', &self.bytes[self.pos..]).map(|i| self.pos + i)
    }

    /// Position of the next `>` outside quoted attribute values.
    pub fn find_tag_end_quoted(&self) -> Option<usize> {
        let window = &self.bytes[self.pos..];
        let mut quote: Option<u8> = None;
        for at in memchr3_iter(b'>', b'"', b'\'', window) {
            match (quote, window[at]) {
                (None, b'>') => return Some(self.pos + at),
                (None, q) => quote = Some(q),
                (Some(q), b) if q == b => quote = None,
                _ => {}
            }
        }
        None
    }

    /// Position of the next occurrence of `needle`.
    pub fn find_sequence(&self, needle: &[u8]) -> Option<usize> {
        memmem::find(&self.bytes[self.pos..], needle).map(|i| self.pos + i)
    }

    /// Position of the next `</name` with the name compared ASCII
    /// case-insensitively. Raw-text elements like script and style need
    /// this because their content may contain bare `<`.
    pub fn find_end_tag_ci(&self, name: &[u8]) -> Option<usize> {
        let window = &self.bytes[self.pos..];
        for at in memchr_iter(b'<', window) {
            let rest = &window[at..];
            if rest.len() > name.len() + 1
                && rest[1] == b'/'
                && rest[2..2 + name.len()].eq_ignore_ascii_case(name)
            {
                return Some(self.pos + at);
            }
        }
        None
    }

    /// Consume a tag or attribute name: letter or underscore start, then
    /// letters, digits, `-`, `_`, `.`. Bytes >= 0x80 pass so UTF-8 names
    /// survive.
    pub fn read_name(&mut self) -> Option<&'a [u8]> {
        let rest = &self.bytes[self.pos..];
        if !rest.first().copied().is_some_and(is_name_start_char) {
            return None;
        }
        let len = 1 + rest[1..].iter().take_while(|&&b| is_name_char(b)).count();
        self.pos += len;
        Some(&rest[..len])
    }
}

#[inline]
pub(crate) fn is_name_start_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_') || b >= 0x80
}

#[inline]
pub(crate) fn is_name_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'_' | b'-' | b'.') || b >= 0x80
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tag_start() {
        let cursor = Scanner::new(b"ahead <tag>");
        assert_eq!(cursor.find_tag_start(), Some(6));
    }

    #[test]
    fn test_tag_end_skips_quoted_gt() {
        let cursor = Scanner::new(b"<a alt=\">x\">body");
        assert_eq!(cursor.find_tag_end_quoted(), Some(11));
    }

    #[test]
    fn test_tag_end_unterminated_quote() {
        let cursor = Scanner::new(b"<a alt=\"unclosed body");
        assert_eq!(cursor.find_tag_end_quoted(), None);
    }

    #[test]
    fn test_read_name_takes_the_name_chars() {
        let mut cursor = Scanner::new(b"data-role=\"x\"");
        assert_eq!(cursor.read_name(), Some(b"data-role" as &[u8]));
        assert_eq!(cursor.position(), 9);
    }

    #[test]
    fn test_read_name_rejects_digit_start() {
        let mut cursor = Scanner::new(b"9lives");
        assert_eq!(cursor.read_name(), None);
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_end_tag_search_ignores_bare_lt() {
        let cursor = Scanner::new(b"if (a < b) x();</SCRIPT>");
        assert_eq!(cursor.find_end_tag_ci(b"script"), Some(15));
    }

    #[test]
    fn test_find_sequence() {
        let cursor = Scanner::new(b"abc<!--x-->");
        assert_eq!(cursor.find_sequence(b"-->"), Some(8));
    }
}
