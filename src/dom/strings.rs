//! Interned string storage.
//!
//! Tag and attribute names repeat constantly in template markup, so the
//! pool stores each distinct byte string once and hands out dense u32
//! ids. Normalization rewrites most strings on the way in, which is why
//! the pool owns its bytes outright: one shared buffer plus (offset,
//! len) spans, with a hash table of id lists resolved by content
//! comparison.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy)]
struct Span {
    offset: u32,
    len: u32,
}

#[derive(Debug)]
pub struct StringPool {
    /// Span for id `n` lives at index `n - 1`; id 0 is the empty string
    spans: Vec<Span>,
    bytes: Vec<u8>,
    by_hash: HashMap<u64, Vec<u32>>,
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

impl StringPool {
    pub fn new() -> Self {
        StringPool {
            spans: Vec::with_capacity(256),
            bytes: Vec::with_capacity(4096),
            by_hash: HashMap::new(),
        }
    }

    /// Intern `s` and return its id. Equal content always gets an equal
    /// id.
    pub fn intern(&mut self, s: &[u8]) -> u32 {
        if s.is_empty() {
            return 0;
        }
        let hash = content_hash(s);
        if let Some(ids) = self.by_hash.get(&hash) {
            for &id in ids {
                if self.get(id) == s {
                    return id;
                }
            }
        }
        self.spans.push(Span {
            offset: self.bytes.len() as u32,
            len: s.len() as u32,
        });
        self.bytes.extend_from_slice(s);
        let id = self.spans.len() as u32;
        self.by_hash.entry(hash).or_default().push(id);
        id
    }

    /// Bytes for `id`; unknown ids read as empty.
    pub fn get(&self, id: u32) -> &[u8] {
        let span = id
            .checked_sub(1)
            .and_then(|index| self.spans.get(index as usize));
        match span {
            Some(span) => {
                let start = span.offset as usize;
                &self.bytes[start..start + span.len as usize]
            }
            None => b"",
        }
    }

    pub fn get_str(&self, id: u32) -> &str {
        std::str::from_utf8(self.get(id)).unwrap_or("")
    }
}

fn content_hash(s: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    s.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_round_trips() {
        let mut pool = StringPool::new();
        let id = pool.intern(b"hello");
        assert!(id > 0);
        assert_eq!(pool.get(id), b"hello");
        assert_eq!(pool.get_str(id), "hello");
    }

    #[test]
    fn test_equal_content_shares_an_id() {
        let mut pool = StringPool::new();
        assert_eq!(pool.intern(b"hello"), pool.intern(b"hello"));
        assert_ne!(pool.intern(b"hello"), pool.intern(b"world"));
    }

    #[test]
    fn test_empty_string_is_id_zero() {
        let mut pool = StringPool::new();
        assert_eq!(pool.intern(b""), 0);
        assert_eq!(pool.get(0), b"");
    }

    #[test]
    fn test_unknown_id_reads_empty() {
        let pool = StringPool::new();
        assert_eq!(pool.get(42), b"");
    }
}
