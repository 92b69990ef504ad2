//! Positional rule generation - pivot-independent fallback locators
//!
//! A full tree walk per document compiles an ordinal locator for every
//! usable value leaf whose nearest id-bearing ancestor (if any) belongs
//! to the template. A payload id would change from page to page, so a
//! leaf under one is skipped rather than anchored on it; a leaf with no
//! id-bearing ancestor at all anchors on the document root. The builder
//! merges directly adjacent text runs, so every text child of an
//! element is a whole run and the text-group ordinals are stable.

use tracing::debug;

use super::locator;
use super::RuleSet;
use crate::dom::DocumentSet;
use crate::nav::Suitability;
use crate::pivot::TemplateScanner;

/// Run the positional generator over a scanned collection, adding every
/// new verified locator to `rules`.
pub fn generate(scanner: &TemplateScanner, docs: &DocumentSet, rules: &mut RuleSet) {
    for (doc_index, doc) in docs.iter().enumerate() {
        let view = scanner.view(doc, doc_index);
        let mut yielded = 0usize;

        for node in doc.descendants(doc.document_node()) {
            if !view.is_value_leaf(node) {
                continue;
            }
            if let Some(anchor) = locator::nearest_id_ancestor(doc, node) {
                if !view.is_template_element(anchor) {
                    continue;
                }
            }
            let Some(candidate) = locator::positional(doc, node) else {
                continue;
            };
            if !locator::locator_selects(doc, &candidate, node) {
                continue;
            }
            if rules.insert(candidate) {
                yielded += 1;
            }
        }

        // Per-document yield is diagnostic only
        debug!(doc = doc_index, rules = yielded, "positional walk complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;

    fn induce(inputs: &[&str]) -> RuleSet {
        let docs = DocumentSet::parse_all(inputs).unwrap();
        let mut scanner = TemplateScanner::new(&EngineConfig::default());
        scanner.find_template_tokens(&docs);
        let mut rules = RuleSet::new();
        generate(&scanner, &docs, &mut rules);
        rules
    }

    #[test]
    fn test_template_id_anchors_the_leaf() {
        let rules = induce(&[
            "<HTML><BODY><DIV id=\"p\">text0</DIV></BODY></HTML>",
            "<HTML><BODY><DIV id=\"p\">text1</DIV></BODY></HTML>",
        ]);
        assert!(rules.contains("//DIV[@id='p']/text()[1]"));
    }

    #[test]
    fn test_payload_id_disqualifies_the_leaf() {
        // The id differs between documents, so the DIV is no template
        // element and its leaf gets no positional rule
        let rules = induce(&[
            "<HTML><BODY><DIV id=\"row-1\">alpha</DIV></BODY></HTML>",
            "<HTML><BODY><DIV id=\"row-2\">beta</DIV></BODY></HTML>",
        ]);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_root_anchor_without_ids() {
        let rules = induce(&[
            "<HTML><BODY><DIV>alpha</DIV></BODY></HTML>",
            "<HTML><BODY><DIV>beta</DIV></BODY></HTML>",
        ]);
        assert_eq!(
            rules.iter().collect::<Vec<_>>(),
            vec!["/HTML[1]/BODY[1]/DIV[1]/text()[1]"]
        );
    }

    #[test]
    fn test_template_text_is_not_a_value() {
        // "label" is invariant across the samples and must not become a
        // positional rule target; the varying leaf still does
        let rules = induce(&[
            "<HTML><BODY><P>label</P><P>alpha</P></BODY></HTML>",
            "<HTML><BODY><P>label</P><P>beta</P></BODY></HTML>",
        ]);
        assert_eq!(
            rules.iter().collect::<Vec<_>>(),
            vec!["/HTML[1]/BODY[1]/P[2]/text()[1]"]
        );
    }

    #[test]
    fn test_comment_separated_runs_each_yield_a_rule() {
        let rules = induce(&[
            "<HTML><BODY><DIV>alpha<!--sep-->beta</DIV></BODY></HTML>",
            "<HTML><BODY><DIV>gamma<!--sep-->delta</DIV></BODY></HTML>",
        ]);
        assert!(rules.contains("/HTML[1]/BODY[1]/DIV[1]/text()[1]"));
        assert!(rules.contains("/HTML[1]/BODY[1]/DIV[1]/text()[2]"));
    }

    #[test]
    fn test_merged_run_counts_as_one_group() {
        // A stray end tag does not split the run, so the leaf stays one
        // text node and exactly one rule comes out
        let rules = induce(&[
            "<HTML><BODY><DIV>alpha</SPAN>beta</DIV></BODY></HTML>",
            "<HTML><BODY><DIV>gamma</SPAN>delta</DIV></BODY></HTML>",
        ]);
        assert_eq!(
            rules.iter().collect::<Vec<_>>(),
            vec!["/HTML[1]/BODY[1]/DIV[1]/text()[1]"]
        );
    }
}
