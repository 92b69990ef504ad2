//! Navigation session - step application over one document
//!
//! The session owns the side structures used while exploring a single
//! document: a memoized classification of each node's children into
//! contiguous-text groups and element children. The classification runs
//! once per parent and is keyed by arena node id. Comments separate text
//! runs during parsing but are not addressable by any step, so they never
//! appear in either list.
//!
//! Sessions are single-threaded and live only for the duration of rule
//! generation; parallel rule application never touches one.

use std::collections::HashMap;

use super::step::Step;
use crate::dom::{Document, NodeId};

/// Child classification for one parent, computed on first use.
struct DownEntry {
    /// One node per contiguous-text group, in document order.
    text_groups: Vec<NodeId>,
    /// Element children in document order.
    elements: Vec<NodeId>,
}

/// Step application and move costing over one parsed document.
pub struct NavSession<'a> {
    doc: &'a Document,
    down_cache: HashMap<NodeId, DownEntry>,
}

impl<'a> NavSession<'a> {
    pub fn new(doc: &'a Document) -> Self {
        NavSession {
            doc,
            down_cache: HashMap::new(),
        }
    }

    pub fn doc(&self) -> &'a Document {
        self.doc
    }

    /// Apply one step from `node`. `None` means the move is structurally
    /// absent there: no parent element, no navigable sibling, or an
    /// ordinal past the available count. Absence is not an error.
    pub fn apply(&mut self, step: Step, node: NodeId) -> Option<NodeId> {
        let doc = self.doc;
        match step {
            Step::Up => doc.parent(node).filter(|&p| doc.is_element(p)),
            Step::Left => doc.prev_sibling(node).filter(|&s| is_navigable(doc, s)),
            Step::Right => doc.next_sibling(node).filter(|&s| is_navigable(doc, s)),
            Step::DownToText(k) => {
                let i = k.checked_sub(1)?;
                self.down_entry(node).text_groups.get(i).copied()
            }
            Step::DownToElement(k) => {
                let i = k.checked_sub(1)?;
                self.down_entry(node).elements.get(i).copied()
            }
        }
    }

    /// Every step available from `node`, in the fixed exploration order:
    /// Left, Right, the down ordinals, then Up. Local moves come before
    /// the climb so that a value is claimed by the route through its own
    /// neighbourhood rather than by a longer climb-and-descend route.
    pub fn available_steps(&mut self, node: NodeId) -> Vec<Step> {
        let doc = self.doc;
        let mut steps = Vec::new();
        if doc.prev_sibling(node).is_some_and(|s| is_navigable(doc, s)) {
            steps.push(Step::Left);
        }
        if doc.next_sibling(node).is_some_and(|s| is_navigable(doc, s)) {
            steps.push(Step::Right);
        }
        let entry = self.down_entry(node);
        steps.extend((1..=entry.text_groups.len()).map(Step::DownToText));
        steps.extend((1..=entry.elements.len()).map(Step::DownToElement));
        if doc.parent(node).is_some_and(|p| doc.is_element(p)) {
            steps.push(Step::Up);
        }
        steps
    }

    /// Cost of a move between adjacent positions. Sideways moves always
    /// cost 1. A vertical move is free when its child endpoint is the only
    /// structurally significant child of its parent: passing through a
    /// singleton wrapper does not make a rule less specific.
    pub fn move_cost(&self, from: NodeId, to: NodeId) -> usize {
        let doc = self.doc;
        let child_end = if doc.parent(to) == Some(from) {
            to
        } else if doc.parent(from) == Some(to) {
            from
        } else {
            return 1;
        };
        let parent = match doc.parent(child_end) {
            Some(p) => p,
            None => return 1,
        };
        let significant = doc
            .children(parent)
            .filter(|&c| is_significant(doc, c))
            .count();
        if significant == 1 {
            0
        } else {
            1
        }
    }

    fn down_entry(&mut self, parent: NodeId) -> &DownEntry {
        let doc = self.doc;
        self.down_cache
            .entry(parent)
            .or_insert_with(|| classify_children(doc, parent))
    }
}

/// Steps may land on text or element nodes only.
fn is_navigable(doc: &Document, node: NodeId) -> bool {
    doc.is_element(node) || doc.is_text(node)
}

/// Element children and non-whitespace text count toward the singleton
/// wrapper test; whitespace-only runs and comments do not.
fn is_significant(doc: &Document, node: NodeId) -> bool {
    doc.is_element(node) || (doc.is_text(node) && !doc.is_whitespace_text(node))
}

fn classify_children(doc: &Document, parent: NodeId) -> DownEntry {
    let mut entry = DownEntry {
        text_groups: Vec::new(),
        elements: Vec::new(),
    };
    for child in doc.children(parent) {
        if doc.is_text(child) {
            entry.text_groups.push(child);
        } else if doc.is_element(child) {
            entry.elements.push(child);
        }
    }
    entry
}
