//! Navigation paths - immutable step sequences
//!
//! A path records the moves taken from a pivot occurrence toward a
//! candidate value. Exploration branches share nothing: `append` copies,
//! so a recorded path is never mutated by later branches.

use std::collections::HashSet;
use std::fmt;

use super::session::NavSession;
use super::step::Step;
use crate::dom::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NavPath {
    steps: Vec<Step>,
}

impl NavPath {
    pub fn new() -> Self {
        NavPath { steps: Vec::new() }
    }

    /// A new path with `step` added at the end; `self` is unchanged.
    pub fn append(&self, step: Step) -> NavPath {
        let mut steps = Vec::with_capacity(self.steps.len() + 1);
        steps.extend_from_slice(&self.steps);
        steps.push(step);
        NavPath { steps }
    }

    /// Drop the first step; no-op on an empty path. Text-pivot locators
    /// use this: the leading climb out of the pivot's own text node is
    /// already expressed by the anchor predicate.
    pub fn strip_leading(&self) -> NavPath {
        if self.steps.is_empty() {
            self.clone()
        } else {
            NavPath {
                steps: self.steps[1..].to_vec(),
            }
        }
    }

    pub fn first_step(&self) -> Option<Step> {
        self.steps.first().copied()
    }

    pub fn last_step(&self) -> Option<Step> {
        self.steps.last().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Concatenated query fragments of every step, in order.
    pub fn to_xpath(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&step.fragment());
        }
        out
    }

    /// Walk `origin` through every step of this path and then through
    /// `candidate`; true when any node along that walk, the origin
    /// included, repeats by identity. A knotted candidate folds the walk
    /// back over itself, and so would every longer path extending it.
    /// Checking against the exploration's original starting node catches
    /// indirect cycles that a purely local check would miss.
    pub fn has_knot(&self, nav: &mut NavSession<'_>, origin: NodeId, candidate: Step) -> bool {
        let mut visited = HashSet::new();
        visited.insert(origin);
        let mut current = origin;
        for step in self.steps.iter().copied().chain(std::iter::once(candidate)) {
            match nav.apply(step, current) {
                Some(next) => {
                    if !visited.insert(next) {
                        return true;
                    }
                    current = next;
                }
                // An inapplicable step cannot complete the walk, let
                // alone revisit a node.
                None => return false,
            }
        }
        false
    }
}

impl fmt::Display for NavPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}
