//! wrapgen - wrapper induction for HTML-like documents
//!
//! Pages generated from one server-side template share invariant text and
//! id-bearing elements; the values worth extracting vary around them. The
//! engine scans a few sample documents for those invariants (pivots),
//! explores the tree neighborhood of every pivot occurrence under a
//! distance budget, and compiles each surviving path into an XPath
//! locator. The induced rule set is then applied to whole document
//! collections on a worker pool.
//!
//! ```
//! use wrapgen::{DocumentSet, EngineConfig};
//!
//! let samples = DocumentSet::parse_all(&[
//!     "<html><body><p>Price:</p>12.40</body></html>",
//!     "<html><body><p>Price:</p>8.99</body></html>",
//! ])?;
//! let config = EngineConfig::default();
//!
//! let rules = wrapgen::induce_rules(&samples, &config)?;
//! assert!(!rules.is_empty());
//!
//! let extractions = wrapgen::apply_rules(&rules, &samples, &config)?;
//! assert_eq!(extractions[0].values[0].as_deref(), Some("12.40"));
//! # Ok::<(), wrapgen::Error>(())
//! ```

pub mod apply;
pub mod config;
pub mod dom;
pub mod error;
pub mod html;
pub mod nav;
pub mod pivot;
pub mod rules;
pub mod xpath;

pub use apply::{apply_rules, RuleExtraction};
pub use config::EngineConfig;
pub use dom::{Document, DocumentSet, NodeId};
pub use error::{Error, Result};
pub use nav::{NavPath, NavSession, PathExplorer, Step};
pub use pivot::{Occurrence, TemplatePivot, TemplateScanner};
pub use rules::RuleSet;

use tracing::debug;

/// Induce an extraction rule set from sample documents of one source.
///
/// Runs the template scan, then the relative generator (pivot-anchored
/// locators) and the positional generator (id- or root-anchored climb
/// locators). Every returned locator has been verified to select exactly
/// its target in the sample it came from; the set is deduplicated and
/// keeps insertion order.
pub fn induce_rules(samples: &DocumentSet, config: &EngineConfig) -> Result<RuleSet> {
    config.validate()?;

    let mut scanner = TemplateScanner::new(config);
    scanner.find_template_tokens(samples);

    let mut rules = RuleSet::new();
    rules::relative::generate(&scanner, samples, config, &mut rules);
    rules::positional::generate(&scanner, samples, &mut rules);

    debug!(
        docs = samples.len(),
        pivots = scanner.template_tokens().len(),
        rules = rules.len(),
        "rule induction finished"
    );
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(inputs: &[&str]) -> DocumentSet {
        DocumentSet::parse_all(inputs).unwrap()
    }

    #[test]
    fn test_sibling_value_rule_end_to_end() {
        let samples = parse(&[
            "<HTML><BODY><P>pivot</P>target</BODY></HTML>",
            "<HTML><BODY><P>pivot</P>other</BODY></HTML>",
        ]);
        let config = EngineConfig::default();

        let rules = induce_rules(&samples, &config).unwrap();
        assert!(
            rules.contains(
                "//P[contains(text(),'pivot')]/following-sibling::node()[1]/self::text()"
            ),
            "induced: {:?}",
            rules.iter().collect::<Vec<_>>()
        );

        let extractions = apply_rules(&rules, &samples, &config).unwrap();
        let sibling = extractions
            .iter()
            .find(|e| e.rule.starts_with("//P["))
            .unwrap();
        assert_eq!(
            sibling.values,
            vec![Some("target".to_string()), Some("other".to_string())]
        );
    }

    #[test]
    fn test_id_anchored_positional_rule() {
        let samples = parse(&[
            "<HTML><BODY><DIV id=\"p\">text0</DIV></BODY></HTML>",
            "<HTML><BODY><DIV id=\"p\">text1</DIV></BODY></HTML>",
        ]);
        let rules = induce_rules(&samples, &EngineConfig::default()).unwrap();
        assert!(
            rules.contains("//DIV[@id='p']/text()[1]"),
            "induced: {:?}",
            rules.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_distance_budget_gates_induction() {
        let samples = parse(&["<P>pivot</P><BR/>target", "<P>pivot</P><BR/>other"]);
        let mut config = EngineConfig::default();

        // The two sideways moves cost one each; the climb out of P is free
        config.max_distance = 1;
        assert!(induce_rules(&samples, &config).unwrap().is_empty());

        config.max_distance = 2;
        let rules = induce_rules(&samples, &config).unwrap();
        let expected = "//P[contains(text(),'pivot')]\
            /following-sibling::node()[1]/following-sibling::node()[1]/self::text()";
        assert_eq!(rules.iter().collect::<Vec<_>>(), vec![expected]);
    }

    #[test]
    fn test_rule_set_is_order_independent() {
        let a = "<HTML><BODY><P>pivot</P>alpha<DIV id=\"m\">beta</DIV></BODY></HTML>";
        let b = "<HTML><BODY><P>pivot</P>gamma<DIV id=\"m\">delta</DIV></BODY></HTML>";
        let config = EngineConfig::default();

        let forward = induce_rules(&parse(&[a, b]), &config).unwrap();
        let backward = induce_rules(&parse(&[b, a]), &config).unwrap();

        let mut f: Vec<&str> = forward.iter().collect();
        let mut g: Vec<&str> = backward.iter().collect();
        f.sort_unstable();
        g.sort_unstable();
        assert_eq!(f, g);
        assert!(!f.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let samples = parse(&["<P>x</P>"]);
        let mut config = EngineConfig::default();
        config.max_distance = 0;
        assert!(matches!(
            induce_rules(&samples, &config),
            Err(Error::Config(_))
        ));
    }
}
