//! XPath 1.0 value types: node-set, boolean, number, string.
//!
//! Attribute steps produce plain strings here (attributes are not arena
//! nodes), so a fifth variant carries multiple attribute values.

use crate::dom::NodeId;

#[derive(Debug, Clone)]
#[must_use]
pub enum XPathValue {
    /// Nodes in document order, no duplicates
    NodeSet(Vec<NodeId>),
    Boolean(bool),
    Number(f64),
    String(String),
    /// Attribute values when a step matched more than one
    StringList(Vec<String>),
}

impl XPathValue {
    pub fn empty_nodeset() -> Self {
        Self::NodeSet(Vec::new())
    }

    pub fn single_node(id: NodeId) -> Self {
        Self::NodeSet(vec![id])
    }

    /// boolean() conversion: non-empty, non-zero, non-NaN is true.
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Boolean(flag) => *flag,
            Self::Number(value) => *value != 0.0 && !value.is_nan(),
            Self::String(text) => !text.is_empty(),
            Self::NodeSet(set) => !set.is_empty(),
            Self::StringList(values) => !values.is_empty(),
        }
    }

    /// number() conversion. Unparseable strings become NaN, never an error.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Boolean(true) => 1.0,
            Self::Boolean(false) => 0.0,
            Self::String(text) => parse_number(text),
            Self::NodeSet(_) => parse_number(&self.to_string_value()),
            Self::StringList(values) => values.first().map_or(f64::NAN, |v| parse_number(v)),
        }
    }

    /// string() conversion.
    ///
    /// A `NodeSet` comes back empty: its string-value is the string-value
    /// of its first node, which cannot be resolved without the document.
    /// Callers holding a document use `Document::string_value` on
    /// `first_node()` instead.
    pub fn to_string_value(&self) -> String {
        match self {
            Self::String(text) => text.clone(),
            Self::Boolean(flag) => flag.to_string(),
            Self::Number(value) => format_number(*value),
            Self::NodeSet(_) => String::new(),
            Self::StringList(values) => values.first().cloned().unwrap_or_default(),
        }
    }

    pub fn is_nodeset(&self) -> bool {
        matches!(self, Self::NodeSet(_))
    }

    pub fn as_nodeset(&self) -> Option<&Vec<NodeId>> {
        match self {
            Self::NodeSet(set) => Some(set),
            _ => None,
        }
    }

    /// First node of a non-empty node set. Sets keep document order, so
    /// this is plain `first()`.
    pub fn first_node(&self) -> Option<NodeId> {
        self.as_nodeset().and_then(|set| set.first().copied())
    }
}

fn parse_number(text: &str) -> f64 {
    text.trim().parse().unwrap_or(f64::NAN)
}

/// XPath 1.0 number-to-string: integral values print without a decimal
/// point, NaN and the infinities print as NaN, Infinity and -Infinity.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        (if value > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if value == value.trunc() && value.abs() < 1e15 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_conversion() {
        let truthy = [
            XPathValue::NodeSet(vec![1]),
            XPathValue::Boolean(true),
            XPathValue::Number(1.0),
            XPathValue::String("hi".to_string()),
        ];
        assert!(truthy.iter().all(XPathValue::to_boolean));
        let falsy = [
            XPathValue::NodeSet(vec![]),
            XPathValue::Boolean(false),
            XPathValue::Number(0.0),
            XPathValue::Number(f64::NAN),
            XPathValue::String(String::new()),
        ];
        assert!(!falsy.iter().any(XPathValue::to_boolean));
    }

    #[test]
    fn test_number_conversion() {
        let cases = [
            (XPathValue::Boolean(true), 1.0),
            (XPathValue::Boolean(false), 0.0),
            (XPathValue::String(" 42 ".to_string()), 42.0),
        ];
        for (value, expected) in cases {
            assert_eq!(value.to_number(), expected);
        }
        assert!(XPathValue::String("abc".to_string()).to_number().is_nan());
    }

    #[test]
    fn test_number_formatting() {
        let cases = [
            (42.0, "42"),
            (-7.0, "-7"),
            (3.25, "3.25"),
            (f64::NAN, "NaN"),
            (f64::NEG_INFINITY, "-Infinity"),
        ];
        for (value, expected) in cases {
            assert_eq!(XPathValue::Number(value).to_string_value(), expected);
        }
    }

    #[test]
    fn test_first_node() {
        assert_eq!(XPathValue::NodeSet(vec![3, 7]).first_node(), Some(3));
        assert_eq!(XPathValue::empty_nodeset().first_node(), None);
        assert_eq!(XPathValue::Number(1.0).first_node(), None);
    }
}
