//! Path explorer - bounded depth-first search around one pivot occurrence
//!
//! Walks outward from a pivot occurrence, spending a distance budget on
//! each move, and records every path that ends on a usable value leaf.
//! Exploration never continues through a recorded value ("never cross a
//! value"), never lets a branch fold back over a node already on its own
//! walk, and never claims a node where a closer pivot occurrence would
//! root a shorter, dominant rule.
//!
//! An explorer is transient: one call covers one (document, origin,
//! budget) triple and returns the paths it found.

use std::collections::HashSet;

use super::path::NavPath;
use super::session::NavSession;
use crate::dom::NodeId;

/// Predicates the explorer consumes. The template scanner implements
/// them per document.
pub trait Suitability {
    /// Text leaf acceptable as an extraction target: non-empty after
    /// trimming, within the configured length bound, and not
    /// template-invariant.
    fn is_value_leaf(&self, node: NodeId) -> bool;
    /// Node where some pivot has a concrete occurrence.
    fn is_pivot_occurrence(&self, node: NodeId) -> bool;
}

/// One bounded search rooted at one pivot occurrence.
pub struct PathExplorer<'a, 's, S> {
    nav: &'s mut NavSession<'a>,
    suitability: &'s S,
    origin: NodeId,
    found: Vec<NavPath>,
    claimed: HashSet<NodeId>,
}

/// Explore outward from `origin`, returning every path that ends on a
/// usable value leaf within `budget` distance. At most one path claims
/// each leaf; the depth-first order of [`NavSession::available_steps`]
/// decides which.
pub fn explore<S: Suitability>(
    nav: &mut NavSession<'_>,
    suitability: &S,
    origin: NodeId,
    budget: usize,
) -> Vec<NavPath> {
    PathExplorer::new(nav, suitability, origin).explore(budget)
}

impl<'a, 's, S: Suitability> PathExplorer<'a, 's, S> {
    pub fn new(nav: &'s mut NavSession<'a>, suitability: &'s S, origin: NodeId) -> Self {
        PathExplorer {
            nav,
            suitability,
            origin,
            found: Vec::new(),
            claimed: HashSet::new(),
        }
    }

    /// Run the search and hand back the recorded paths.
    pub fn explore(mut self, budget: usize) -> Vec<NavPath> {
        self.visit(self.origin, NavPath::new(), budget);
        self.found
    }

    fn visit(&mut self, node: NodeId, path: NavPath, remaining: usize) {
        // A usable value ends the branch whether or not budget remains
        if self.suitability.is_value_leaf(node) {
            if self.claimed.insert(node) {
                self.found.push(path);
            }
            return;
        }
        if remaining == 0 {
            return;
        }
        for step in self.nav.available_steps(node) {
            let dest = match self.nav.apply(step, node) {
                Some(dest) => dest,
                None => continue,
            };
            if path.has_knot(self.nav, self.origin, step) {
                continue;
            }
            if self.suitability.is_pivot_occurrence(dest) {
                continue;
            }
            let cost = self.nav.move_cost(node, dest);
            self.visit(dest, path.append(step), remaining - cost);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::nav::step::Step;

    fn doc(input: &str) -> Document {
        Document::parse(input).unwrap()
    }

    fn by_text(d: &Document, text: &str) -> NodeId {
        d.descendants(d.document_node())
            .find(|&n| d.is_text(n) && d.text(n) == text)
            .unwrap()
    }

    /// Minimal stand-in for the template scanner's per-document view.
    struct Oracle<'a> {
        doc: &'a Document,
        pivots: HashSet<NodeId>,
        invariant: HashSet<&'static str>,
    }

    impl<'a> Oracle<'a> {
        fn new(doc: &'a Document, pivot: NodeId, token: &'static str) -> Self {
            Oracle {
                doc,
                pivots: HashSet::from([pivot]),
                invariant: HashSet::from([token]),
            }
        }
    }

    impl Suitability for Oracle<'_> {
        fn is_value_leaf(&self, node: NodeId) -> bool {
            if !self.doc.is_text(node) {
                return false;
            }
            let trimmed = self.doc.text(node).trim();
            !trimmed.is_empty()
                && !self.invariant.contains(trimmed)
                && !self.pivots.contains(&node)
        }

        fn is_pivot_occurrence(&self, node: NodeId) -> bool {
            self.pivots.contains(&node)
        }
    }

    #[test]
    fn test_finds_the_adjacent_value() {
        let d = doc("<HTML><BODY><P>pivot</P>target</BODY></HTML>");
        let pivot = by_text(&d, "pivot");
        let oracle = Oracle::new(&d, pivot, "pivot");
        let mut nav = NavSession::new(&d);
        // The climb out of the singleton P is free, so budget 1 suffices
        let paths = explore(&mut nav, &oracle, pivot, 1);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].steps(), &[Step::Up, Step::Right]);
    }

    #[test]
    fn test_larger_budget_keeps_the_local_route() {
        let d = doc("<HTML><BODY><P>pivot</P>target</BODY></HTML>");
        let pivot = by_text(&d, "pivot");
        let oracle = Oracle::new(&d, pivot, "pivot");
        let mut nav = NavSession::new(&d);
        // The climb-and-descend route to the same leaf is discarded as a
        // duplicate claim, whatever the budget
        let paths = explore(&mut nav, &oracle, pivot, 5);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].steps(), &[Step::Up, Step::Right]);
    }

    #[test]
    fn test_budget_bounds_the_walk() {
        let d = doc("<P>pivot</P><BR/>target");
        let pivot = by_text(&d, "pivot");
        let oracle = Oracle::new(&d, pivot, "pivot");

        let mut nav = NavSession::new(&d);
        let paths = explore(&mut nav, &oracle, pivot, 2);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].steps(), &[Step::Up, Step::Right, Step::Right]);

        let mut nav = NavSession::new(&d);
        assert!(explore(&mut nav, &oracle, pivot, 1).is_empty());
    }

    #[test]
    fn test_never_claims_through_another_occurrence() {
        let d = doc("<DIV><P>pivot</P><P>pivot</P>target</DIV>");
        let first = d
            .descendants(d.document_node())
            .find(|&n| d.is_text(n) && d.text(n) == "pivot")
            .unwrap();
        let second = d
            .descendants(d.document_node())
            .filter(|&n| d.is_text(n) && d.text(n) == "pivot")
            .nth(1)
            .unwrap();
        let mut oracle = Oracle::new(&d, first, "pivot");
        oracle.pivots.insert(second);
        let mut nav = NavSession::new(&d);
        // Every route from the first occurrence toward the target leads
        // through the second occurrence's P, whose own text is barred;
        // the sideways route over the P element itself stays open
        let paths = explore(&mut nav, &oracle, first, 3);
        for path in &paths {
            let mut current = first;
            for &step in path.steps() {
                current = nav.apply(step, current).unwrap();
                assert_ne!(current, second);
            }
        }
    }
}
