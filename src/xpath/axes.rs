//! Axis navigation over the arena tree.
//!
//! Candidates come back in axis order: forward axes in document order,
//! preceding-sibling nearest first. Positional step predicates count in
//! this order, which is what makes `preceding-sibling::node()[1]` mean
//! the adjacent sibling.

use std::iter::successors;

use super::compiler::StepTest;
use super::parser::Axis;
use crate::dom::{Document, NodeId, NodeKind};

pub fn navigate(doc: &Document, origin: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => doc.children(origin).collect(),
        Axis::Descendant => doc.descendants(origin).collect(),
        Axis::DescendantOrSelf => {
            let mut nodes = vec![origin];
            nodes.extend(doc.descendants(origin));
            nodes
        }
        Axis::Parent => doc.parent(origin).into_iter().collect(),
        Axis::FollowingSibling => {
            successors(doc.next_sibling(origin), |&n| doc.next_sibling(n)).collect()
        }
        Axis::PrecedingSibling => {
            successors(doc.prev_sibling(origin), |&n| doc.prev_sibling(n)).collect()
        }
        Axis::SelfAxis => vec![origin],
        // Attributes are not arena nodes; the evaluator reads them off
        // the element and produces strings instead of a node set
        Axis::Attribute => Vec::new(),
    }
}

/// Does `node` pass the step's node test?
pub fn test_node(doc: &Document, node: NodeId, test: &StepTest) -> bool {
    match test {
        StepTest::Named(name) => doc.is_element(node) && doc.name(node) == name.as_str(),
        // The wildcard means any element, not any node
        StepTest::Wildcard => doc.is_element(node),
        // node() accepts every kind, the document node included; an
        // emitted `..` from the root element has to land somewhere
        StepTest::Node => true,
        StepTest::Text => doc.kind(node) == NodeKind::Text,
        StepTest::Comment => doc.kind(node) == NodeKind::Comment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(input: &str) -> Document {
        Document::parse(input).unwrap()
    }

    fn names(d: &Document, nodes: &[NodeId]) -> Vec<String> {
        nodes.iter().map(|&n| d.name(n).to_string()).collect()
    }

    #[test]
    fn test_sibling_axes_order() {
        let d = doc("<ROOT><A></A><B></B><C></C></ROOT>");
        let root = d.root_element().unwrap();
        let b = d.children(root).nth(1).unwrap();
        assert_eq!(names(&d, &navigate(&d, b, Axis::FollowingSibling)), ["C"]);
        let c = d.children(root).nth(2).unwrap();
        assert_eq!(
            names(&d, &navigate(&d, c, Axis::PrecedingSibling)),
            ["B", "A"]
        );
    }

    #[test]
    fn test_downward_axes_cover_the_subtree() {
        let d = doc("<ROOT><A><B></B></A><C></C></ROOT>");
        let root = d.root_element().unwrap();
        assert_eq!(navigate(&d, root, Axis::Child).len(), 2);
        assert_eq!(navigate(&d, root, Axis::Descendant).len(), 3);
        assert_eq!(navigate(&d, root, Axis::DescendantOrSelf).len(), 4);
    }

    #[test]
    fn test_parent_axis_ends_at_the_document_node() {
        let d = doc("<ROOT></ROOT>");
        let root = d.root_element().unwrap();
        assert_eq!(navigate(&d, root, Axis::Parent), vec![d.document_node()]);
        assert!(navigate(&d, d.document_node(), Axis::Parent).is_empty());
    }

    #[test]
    fn test_node_test_kinds() {
        let d = doc("<ROOT><A>x</A></ROOT>");
        let root = d.root_element().unwrap();
        let a = d.first_child(root).unwrap();
        let text = d.first_child(a).unwrap();
        assert!(test_node(&d, a, &StepTest::Named("A".to_string())));
        assert!(!test_node(&d, a, &StepTest::Named("B".to_string())));
        assert!(test_node(&d, a, &StepTest::Wildcard));
        assert!(test_node(&d, text, &StepTest::Text));
        assert!(!test_node(&d, text, &StepTest::Wildcard));
        assert!(test_node(&d, d.document_node(), &StepTest::Node));
        assert!(!test_node(&d, d.document_node(), &StepTest::Wildcard));
    }
}
