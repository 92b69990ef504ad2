//! Navigation steps - the move alphabet of the path explorer
//!
//! A step is one move between adjacent tree positions: up to the parent
//! element, sideways to an adjacent sibling, or down to a child selected
//! by ordinal. Down ordinals address the classification maintained by the
//! session (contiguous-text groups and element children are numbered
//! independently, both 1-based). Each step knows the query fragment that
//! reproduces it, so a whole path translates by concatenation.

use std::fmt;

/// One navigation move. Equality and hashing are structural: two
/// `DownToText(2)` values are the same step no matter where they were
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// To the parent element; absent at the root element.
    Up,
    /// To the immediately preceding sibling, when it is text or element.
    Left,
    /// To the immediately following sibling, when it is text or element.
    Right,
    /// To the k-th contiguous-text group among this node's children.
    DownToText(usize),
    /// To the k-th element child of this node.
    DownToElement(usize),
}

impl Step {
    /// Query fragment reproducing this move during locator compilation.
    pub fn fragment(&self) -> String {
        match self {
            Step::Up => "/..".to_string(),
            Step::Left => "/preceding-sibling::node()[1]".to_string(),
            Step::Right => "/following-sibling::node()[1]".to_string(),
            Step::DownToText(k) => format!("/text()[{}]", k),
            Step::DownToElement(k) => format!("/child::*[{}]", k),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Up => f.write_str("Up"),
            Step::Left => f.write_str("Left"),
            Step::Right => f.write_str("Right"),
            Step::DownToText(k) => write!(f, "DownToText({})", k),
            Step::DownToElement(k) => write!(f, "DownToElement({})", k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fragments() {
        assert_eq!(Step::Up.fragment(), "/..");
        assert_eq!(Step::Left.fragment(), "/preceding-sibling::node()[1]");
        assert_eq!(Step::Right.fragment(), "/following-sibling::node()[1]");
        assert_eq!(Step::DownToText(3).fragment(), "/text()[3]");
        assert_eq!(Step::DownToElement(1).fragment(), "/child::*[1]");
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Step::DownToText(2), Step::DownToText(2));
        assert_ne!(Step::DownToText(2), Step::DownToText(3));
        assert_ne!(Step::DownToText(1), Step::DownToElement(1));
        assert_eq!(Step::Left, Step::Left);
    }
}
