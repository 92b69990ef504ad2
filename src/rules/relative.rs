//! Relative rule generation - pivot-anchored locators
//!
//! For each pivot, in discovery order, each of its occurrences is
//! explored and every discovered path compiled and verified against the
//! occurrence's own document. Occurrences of one pivot tend to repeat
//! the same neighbourhood, so a patience bound cuts the tail: once a
//! configured number of consecutive occurrences contribute nothing new,
//! the rest of that pivot's occurrences are abandoned. Any new locator
//! resets the counter.

use tracing::{debug, trace, warn};

use super::locator;
use super::RuleSet;
use crate::config::EngineConfig;
use crate::dom::{DocumentSet, NodeId};
use crate::nav::{explore, NavPath, NavSession};
use crate::pivot::{TemplatePivot, TemplateScanner};

/// Run the pivot-anchored generator over a scanned collection, adding
/// every new verified locator to `rules`.
pub fn generate(
    scanner: &TemplateScanner,
    docs: &DocumentSet,
    config: &EngineConfig,
    rules: &mut RuleSet,
) {
    let mut sessions: Vec<NavSession<'_>> = docs.iter().map(NavSession::new).collect();

    for (pivot_index, pivot) in scanner.template_tokens().iter().enumerate() {
        let anchor_literal = match pivot {
            TemplatePivot::Text { token } => locator::xpath_literal(token),
            TemplatePivot::Element { id, .. } => locator::xpath_literal(id),
        };
        if anchor_literal.is_none() {
            warn!(pivot = %pivot, "anchor value mixes both quote kinds, pivot skipped");
            continue;
        }

        let before = rules.len();
        let mut unproductive = 0u32;
        let mut abandoned = false;

        for occurrence in scanner.occurrences(pivot_index) {
            if unproductive >= config.occurrence_patience {
                abandoned = true;
                break;
            }
            let doc = docs.get(occurrence.doc);
            let view = scanner.view(doc, occurrence.doc);
            let nav = &mut sessions[occurrence.doc];
            let paths = explore(nav, &view, occurrence.node, config.max_distance as usize);
            trace!(
                pivot = %pivot,
                doc = occurrence.doc,
                node = occurrence.node,
                paths = paths.len(),
                "explored occurrence"
            );

            let mut contributed = false;
            for path in &paths {
                let candidate = match pivot {
                    TemplatePivot::Text { token } => doc
                        .parent(occurrence.node)
                        .filter(|&p| doc.is_element(p))
                        .and_then(|p| locator::relative_text(doc.name(p), token, path)),
                    TemplatePivot::Element { tag, id } => {
                        locator::relative_id(tag, id, path)
                    }
                };
                let Some(candidate) = candidate else {
                    trace!(pivot = %pivot, path = %path, "path not expressible");
                    continue;
                };
                let target = walk(nav, occurrence.node, path);
                let verified = target
                    .is_some_and(|t| locator::locator_selects(doc, &candidate, t));
                if !verified {
                    trace!(pivot = %pivot, locator = %candidate, "candidate failed verification");
                    continue;
                }
                if rules.insert(candidate) {
                    contributed = true;
                }
            }

            if contributed {
                unproductive = 0;
            } else {
                unproductive += 1;
            }
        }

        if abandoned {
            warn!(pivot = %pivot, "abandoned after unproductive occurrences");
        }
        debug!(pivot = %pivot, new_rules = rules.len() - before, "pivot complete");
    }
}

/// Replay `path` from `origin`; `None` if any step fails to apply.
fn walk(nav: &mut NavSession<'_>, origin: NodeId, path: &NavPath) -> Option<NodeId> {
    let mut current = origin;
    for &step in path.steps() {
        current = nav.apply(step, current)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn induce(inputs: &[&str], config: &EngineConfig) -> RuleSet {
        let docs = DocumentSet::parse_all(inputs).unwrap();
        let mut scanner = TemplateScanner::new(config);
        scanner.find_template_tokens(&docs);
        let mut rules = RuleSet::new();
        generate(&scanner, &docs, config, &mut rules);
        rules
    }

    #[test]
    fn test_text_pivot_yields_the_sibling_rule() {
        let rules = induce(
            &[
                "<HTML><BODY><P>pivot</P>target</BODY></HTML>",
                "<HTML><BODY><P>pivot</P>other</BODY></HTML>",
            ],
            &EngineConfig::default(),
        );
        assert!(rules.contains(
            "//P[contains(text(),'pivot')]/following-sibling::node()[1]/self::text()"
        ));
    }

    #[test]
    fn test_element_pivot_yields_the_text_rule() {
        let rules = induce(
            &[
                "<HTML><BODY><DIV id=\"p\">text0</DIV></BODY></HTML>",
                "<HTML><BODY><DIV id=\"p\">text1</DIV></BODY></HTML>",
            ],
            &EngineConfig::default(),
        );
        assert!(rules.contains("//DIV[@id='p']/text()[1]/self::text()"));
    }

    #[test]
    fn test_budget_gates_discovery() {
        let inputs = [
            "<P>pivot</P><BR/>target",
            "<P>pivot</P><BR/>other",
        ];
        let mut config = EngineConfig::default();
        config.max_distance = 2;
        let rules = induce(&inputs, &config);
        assert!(rules.contains(
            "//P[contains(text(),'pivot')]/following-sibling::node()[1]\
             /following-sibling::node()[1]/self::text()"
        ));

        config.max_distance = 1;
        let rules = induce(&inputs, &config);
        assert!(rules.is_empty());
    }

    #[test]
    fn test_occurrences_deduplicate() {
        // The same neighbourhood repeats, so one rule comes out
        let rules = induce(
            &[
                "<HTML><BODY><P>pivot</P>alpha</BODY></HTML>",
                "<HTML><BODY><P>pivot</P>beta</BODY></HTML>",
                "<HTML><BODY><P>pivot</P>gamma</BODY></HTML>",
            ],
            &EngineConfig::default(),
        );
        assert_eq!(
            rules.iter().collect::<Vec<_>>(),
            vec!["//P[contains(text(),'pivot')]/following-sibling::node()[1]/self::text()"]
        );
    }

    #[test]
    fn test_patience_abandons_the_occurrence_tail() {
        // Occurrences two to four repeat the first neighbourhood, so the
        // unproductive counter hits the default patience of 3 before the
        // SPAN occurrence in the last document is reached
        let inputs = [
            "<HTML><BODY><P>pivot</P>alpha</BODY></HTML>",
            "<HTML><BODY><P>pivot</P>beta</BODY></HTML>",
            "<HTML><BODY><P>pivot</P>gamma</BODY></HTML>",
            "<HTML><BODY><P>pivot</P>delta</BODY></HTML>",
            "<HTML><BODY><SPAN>pivot</SPAN>omega</BODY></HTML>",
        ];
        let span_rule =
            "//SPAN[contains(text(),'pivot')]/following-sibling::node()[1]/self::text()";

        let rules = induce(&inputs, &EngineConfig::default());
        assert!(rules.contains(
            "//P[contains(text(),'pivot')]/following-sibling::node()[1]/self::text()"
        ));
        assert!(!rules.contains(span_rule));

        let mut config = EngineConfig::default();
        config.occurrence_patience = 8;
        let rules = induce(&inputs, &config);
        assert!(rules.contains(span_rule));
    }
}
