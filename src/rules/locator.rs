//! Locator compilation - navigation paths to query strings
//!
//! Three locator forms come out of induction. Relative forms anchor on a
//! pivot (a `contains(text(),...)` predicate over the pivot's parent tag,
//! or an `@id` predicate over a template element) and replay a navigation
//! path from there. The positional form is pivot-independent: it climbs
//! from a text leaf to the nearest id-bearing ancestor or the document
//! root, recording one ordinal per level.
//!
//! Compilation can refuse. XPath 1.0 string literals have no escapes, so
//! a value containing both quote kinds is inexpressible; and a text-pivot
//! path that does not lead with the climb out of the pivot's own text
//! node cannot be replayed from a parent-tag anchor. Refusal returns
//! `None` and the generators skip the candidate.

use crate::dom::{Document, NodeId};
use crate::nav::{NavPath, Step};
use crate::xpath;

/// Quote a literal for embedding: single-quoted unless the value holds a
/// single quote, then double-quoted; `None` when it holds both kinds.
pub fn xpath_literal(value: &str) -> Option<String> {
    match (value.contains('\''), value.contains('"')) {
        (false, _) => Some(format!("'{}'", value)),
        (true, false) => Some(format!("\"{}\"", value)),
        (true, true) => None,
    }
}

/// Relative locator for a text pivot. `path` runs from the pivot's own
/// text node and must lead with Up; the anchor predicate already
/// expresses that first move, so only the stripped tail is replayed.
pub fn relative_text(parent_tag: &str, token: &str, path: &NavPath) -> Option<String> {
    if path.first_step() != Some(Step::Up) {
        return None;
    }
    let literal = xpath_literal(token)?;
    let tail = path.strip_leading();
    let mut locator = format!("//{}[contains(text(),{})]", parent_tag, literal);
    locator.push_str(&tail.to_xpath());
    locator.push_str(trailing_clause(&tail));
    Some(locator)
}

/// Relative locator for an id-bearing element pivot. The anchor is the
/// origin itself, so the whole path is replayed.
pub fn relative_id(tag: &str, id: &str, path: &NavPath) -> Option<String> {
    let literal = xpath_literal(id)?;
    let mut locator = format!("//{}[@id={}]", tag, literal);
    locator.push_str(&path.to_xpath());
    locator.push_str(trailing_clause(path));
    Some(locator)
}

/// A replayed path ends on the target already, so a final `self::text()`
/// confirms its kind; with nothing replayed the target is addressed as
/// the anchor's text.
fn trailing_clause(translated: &NavPath) -> &'static str {
    if translated.is_empty() {
        "/text()"
    } else {
        "/self::text()"
    }
}

/// Nearest ancestor element of `node` carrying an id attribute.
pub fn nearest_id_ancestor(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut current = doc.parent(node);
    while let Some(n) = current {
        if doc.is_element(n) && doc.attribute(n, "id").is_some() {
            return Some(n);
        }
        current = doc.parent(n);
    }
    None
}

/// Positional locator for a text leaf: climb to the nearest id-bearing
/// ancestor (or to the document root), then descend by per-level
/// ordinals down to the leaf's own text-group ordinal.
pub fn positional(doc: &Document, leaf: NodeId) -> Option<String> {
    if !doc.is_text(leaf) {
        return None;
    }
    let parent = doc.parent(leaf)?;
    if !doc.is_element(parent) {
        // Text outside any element has no tag to anchor on
        return None;
    }
    let group = doc
        .children(parent)
        .filter(|&c| doc.is_text(c))
        .position(|c| c == leaf)?
        + 1;

    let mut segments: Vec<String> = Vec::new();
    let mut current = parent;
    let anchor = loop {
        if let Some(id) = doc.attribute(current, "id") {
            let literal = xpath_literal(id)?;
            break format!("//{}[@id={}]", doc.name(current), literal);
        }
        let segment = format!("{}[{}]", doc.name(current), same_tag_ordinal(doc, current));
        match doc.parent(current).filter(|&p| doc.is_element(p)) {
            Some(p) => {
                segments.push(segment);
                current = p;
            }
            // The root element carries the absolute anchor itself
            None => break format!("/{}", segment),
        }
    };

    let mut locator = anchor;
    for segment in segments.iter().rev() {
        locator.push('/');
        locator.push_str(segment);
    }
    locator.push_str(&format!("/text()[{}]", group));
    Some(locator)
}

/// 1-based position of `element` among its same-tag siblings.
fn same_tag_ordinal(doc: &Document, element: NodeId) -> usize {
    let name = doc.name(element);
    let parent = match doc.parent(element) {
        Some(p) => p,
        None => return 1,
    };
    doc.children(parent)
        .filter(|&c| doc.is_element(c) && doc.name(c) == name)
        .position(|c| c == element)
        .map_or(1, |i| i + 1)
}

/// True when evaluating `locator` over `doc` yields exactly `[node]`.
/// Generators verify every candidate this way before keeping it, which
/// is what makes the compiled-locator round trip a guarantee instead of
/// a hope: ambiguous anchors and inexpressible routes are discarded at
/// the source.
pub fn locator_selects(doc: &Document, locator: &str, node: NodeId) -> bool {
    let compiled = match xpath::get_or_compile(locator) {
        Ok(compiled) => compiled,
        Err(_) => return false,
    };
    match xpath::evaluate_compiled(&compiled, &xpath::root_context(doc)) {
        Ok(value) => value
            .as_nodeset()
            .map(|nodes| nodes.len() == 1 && nodes[0] == node)
            .unwrap_or(false),
        Err(_) => false,
    }
}
