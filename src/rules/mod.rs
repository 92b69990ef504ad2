//! Rule generation - locator compilation and the induced rule set
//!
//! Two generators feed one [`RuleSet`]: the relative generator anchors
//! on template pivots and replays explored navigation paths, the
//! positional generator falls back to root- or id-anchored ordinal
//! climbs. Every candidate is verified against the document it came
//! from before it is kept.

pub mod locator;
pub mod positional;
pub mod relative;

use indexmap::IndexSet;

/// Induced locators, deduplicated, in first-discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    locators: IndexSet<String>,
}

impl RuleSet {
    pub fn new() -> Self {
        RuleSet {
            locators: IndexSet::new(),
        }
    }

    /// Add a locator; false when it was already present.
    pub fn insert(&mut self, locator: String) -> bool {
        self.locators.insert(locator)
    }

    pub fn contains(&self, locator: &str) -> bool {
        self.locators.contains(locator)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.locators.get_index(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.locators.iter().map(String::as_str)
    }
}

impl Extend<String> for RuleSet {
    fn extend<T: IntoIterator<Item = String>>(&mut self, iter: T) {
        self.locators.extend(iter);
    }
}
