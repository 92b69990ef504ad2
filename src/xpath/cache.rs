//! Compiled Expression Cache
//!
//! Rule application evaluates the same locator against every document in a
//! batch, from several worker threads at once. Compiling each locator once
//! and sharing the result through a process-wide LRU keeps the per-document
//! work down to evaluation only.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, OnceLock};

use lru::LruCache;

use super::compiler::{self, CompiledExpr};

/// Plenty for a rule set; distinct locators number in the dozens, not
/// thousands
const CACHE_CAPACITY: usize = 512;

static CACHE: OnceLock<Mutex<LruCache<String, Arc<CompiledExpr>>>> = OnceLock::new();

fn cache() -> &'static Mutex<LruCache<String, Arc<CompiledExpr>>> {
    CACHE.get_or_init(|| {
        Mutex::new(LruCache::new(NonZeroUsize::new(CACHE_CAPACITY).unwrap()))
    })
}

/// Fetch the compiled form of a locator, compiling on first sight.
///
/// Lookup and insert happen under one lock, so concurrent workers asking for
/// the same locator compile it once. Compile errors are returned, not cached;
/// a malformed locator fails identically on every call.
pub fn get_or_compile(xpath: &str) -> Result<Arc<CompiledExpr>, String> {
    let mut cache = match cache().lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    if let Some(hit) = cache.get(xpath) {
        return Ok(Arc::clone(hit));
    }
    let compiled = Arc::new(compiler::compile(xpath)?);
    cache.put(xpath.to_string(), Arc::clone(&compiled));
    Ok(compiled)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeat_lookup_shares_compilation() {
        let first = get_or_compile("//CACHE-TEST/text()[1]").unwrap();
        let second = get_or_compile("//CACHE-TEST/text()[1]").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_error_not_cached() {
        assert!(get_or_compile("//[").is_err());
        assert!(get_or_compile("//[").is_err());
    }
}
