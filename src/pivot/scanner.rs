//! Template scanner - pivots shared by every sample document
//!
//! Induction anchors rules on parts of the page that belong to the
//! template rather than to the payload. Two kinds qualify: text tokens
//! whose whole trimmed content appears in every sample document, and
//! (tag, id) element pairs present in every sample document. The scanner
//! finds both in one stateful pass and afterwards answers, per document,
//! the suitability questions the explorer and generators ask.
//!
//! Orderings are canonical (tokens sorted, pairs sorted, occurrences by
//! document index then node id) so the discovered pivot list does not
//! depend on the order the samples were supplied in.

use std::collections::HashSet;
use std::fmt;

use crate::config::EngineConfig;
use crate::dom::{Document, DocumentSet, NodeId};
use crate::nav::Suitability;

/// One template anchor discovered across every sample document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePivot {
    /// Invariant text token; occurrences are text nodes containing it.
    Text { token: String },
    /// Invariant (tag, id) pair; occurrences are the matching elements.
    Element { tag: String, id: String },
}

impl fmt::Display for TemplatePivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplatePivot::Text { token } => write!(f, "text {:?}", token),
            TemplatePivot::Element { tag, id } => write!(f, "element {}#{}", tag, id),
        }
    }
}

/// One concrete place a pivot appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Occurrence {
    pub doc: usize,
    pub node: NodeId,
}

/// Cross-document template detection plus the per-document predicate
/// tables derived from it.
pub struct TemplateScanner {
    min_token_len: usize,
    max_token_len: usize,
    max_value_len: usize,
    pivots: Vec<TemplatePivot>,
    /// Parallel to `pivots`, each ordered by (doc index, node id).
    occurrences: Vec<Vec<Occurrence>>,
    /// Invariant tokens, for the template-invariance test on leaves.
    tokens: HashSet<String>,
    /// Invariant (tag, id) pairs.
    template_elements: HashSet<(String, String)>,
    /// Per document: every node that is an occurrence of some pivot.
    occurrence_nodes: Vec<HashSet<NodeId>>,
}

impl TemplateScanner {
    pub fn new(config: &EngineConfig) -> Self {
        TemplateScanner {
            min_token_len: config.min_token_len,
            max_token_len: config.max_token_len,
            max_value_len: config.max_value_len,
            pivots: Vec::new(),
            occurrences: Vec::new(),
            tokens: HashSet::new(),
            template_elements: HashSet::new(),
            occurrence_nodes: Vec::new(),
        }
    }

    /// Scan the sample collection and rebuild the pivot tables. Text
    /// pivots come first, in token order; element pivots follow, in
    /// (tag, id) order.
    pub fn find_template_tokens(&mut self, docs: &DocumentSet) {
        let mut invariant: HashSet<String> = HashSet::new();
        let mut pairs: HashSet<(String, String)> = HashSet::new();

        for (index, doc) in docs.iter().enumerate() {
            let mut texts_here = HashSet::new();
            let mut pairs_here = HashSet::new();
            for node in doc.descendants(doc.document_node()) {
                if doc.is_text(node) {
                    let trimmed = doc.text(node).trim();
                    let len = trimmed.chars().count();
                    if len >= self.min_token_len && len <= self.max_token_len {
                        texts_here.insert(trimmed.to_string());
                    }
                } else if doc.is_element(node) {
                    if let Some(id) = doc.attribute(node, "id") {
                        pairs_here.insert((doc.name(node).to_string(), id.to_string()));
                    }
                }
            }
            if index == 0 {
                invariant = texts_here;
                pairs = pairs_here;
            } else {
                invariant.retain(|t| texts_here.contains(t));
                pairs.retain(|p| pairs_here.contains(p));
            }
        }

        let mut tokens: Vec<String> = invariant.iter().cloned().collect();
        tokens.sort_unstable();
        let mut element_pairs: Vec<(String, String)> = pairs.iter().cloned().collect();
        element_pairs.sort_unstable();

        self.tokens = invariant;
        self.template_elements = pairs;
        self.pivots = tokens
            .iter()
            .map(|token| TemplatePivot::Text {
                token: token.clone(),
            })
            .chain(element_pairs.iter().map(|(tag, id)| TemplatePivot::Element {
                tag: tag.clone(),
                id: id.clone(),
            }))
            .collect();

        self.occurrences = vec![Vec::new(); self.pivots.len()];
        self.occurrence_nodes = vec![HashSet::new(); docs.len()];
        for (doc_index, doc) in docs.iter().enumerate() {
            for node in doc.descendants(doc.document_node()) {
                if doc.is_text(node) {
                    let content = doc.text(node);
                    for (p, token) in tokens.iter().enumerate() {
                        if content.contains(token.as_str()) {
                            self.occurrences[p].push(Occurrence {
                                doc: doc_index,
                                node,
                            });
                            self.occurrence_nodes[doc_index].insert(node);
                        }
                    }
                } else if doc.is_element(node) {
                    if let Some(id) = doc.attribute(node, "id") {
                        for (e, (tag, pair_id)) in element_pairs.iter().enumerate() {
                            if tag == doc.name(node) && pair_id == id {
                                self.occurrences[tokens.len() + e].push(Occurrence {
                                    doc: doc_index,
                                    node,
                                });
                                self.occurrence_nodes[doc_index].insert(node);
                            }
                        }
                    }
                }
            }
        }

        tracing::debug!(
            text_pivots = tokens.len(),
            element_pivots = element_pairs.len(),
            docs = docs.len(),
            "template scan complete"
        );
    }

    /// The ordered pivot list from the last scan.
    pub fn template_tokens(&self) -> &[TemplatePivot] {
        &self.pivots
    }

    /// Occurrences of one pivot, ordered by (doc index, node id).
    pub fn occurrences(&self, pivot: usize) -> &[Occurrence] {
        &self.occurrences[pivot]
    }

    /// Per-document predicate view consumed by the explorer and the
    /// generators. `doc` must be the document at `doc_index` in the set
    /// the scanner last scanned.
    pub fn view<'a>(&'a self, doc: &'a Document, doc_index: usize) -> TemplateView<'a> {
        TemplateView {
            doc,
            scanner: self,
            doc_index,
        }
    }
}

/// Suitability answers over one document of the scanned collection.
pub struct TemplateView<'a> {
    doc: &'a Document,
    scanner: &'a TemplateScanner,
    doc_index: usize,
}

impl TemplateView<'_> {
    /// Id-bearing element whose (tag, id) pair is a template pivot.
    pub fn is_template_element(&self, node: NodeId) -> bool {
        if !self.doc.is_element(node) {
            return false;
        }
        match self.doc.attribute(node, "id") {
            Some(id) => self
                .scanner
                .template_elements
                .contains(&(self.doc.name(node).to_string(), id.to_string())),
            None => false,
        }
    }
}

impl Suitability for TemplateView<'_> {
    fn is_value_leaf(&self, node: NodeId) -> bool {
        if !self.doc.is_text(node) {
            return false;
        }
        let trimmed = self.doc.text(node).trim();
        if trimmed.is_empty() || trimmed.chars().count() > self.scanner.max_value_len {
            return false;
        }
        !self.scanner.tokens.contains(trimmed) && !self.is_pivot_occurrence(node)
    }

    fn is_pivot_occurrence(&self, node: NodeId) -> bool {
        self.scanner.occurrence_nodes[self.doc_index].contains(&node)
    }
}
