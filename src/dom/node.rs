//! Arena node layout.
//!
//! Nodes refer to each other by `NodeId`, an index into the arena. Ids
//! are handed out in document order, so comparing ids compares document
//! positions.

/// Index into the arena
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element,
    Text,
    Comment,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// None only for the document node
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// String pool index: tag name for elements, content for text and
    /// comment nodes
    pub name_id: u32,
    /// Attribute table range for elements
    pub attr_start: u32,
    pub attr_count: u16,
}

impl Node {
    fn fresh(kind: NodeKind, name_id: u32, parent: Option<NodeId>) -> Self {
        Node {
            kind,
            name_id,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            attr_start: 0,
            attr_count: 0,
        }
    }

    pub fn document() -> Self {
        Self::fresh(NodeKind::Document, 0, None)
    }

    pub fn element(name_id: u32, parent: Option<NodeId>) -> Self {
        Self::fresh(NodeKind::Element, name_id, parent)
    }

    /// `content_id` points at the pooled text.
    pub fn text(content_id: u32, parent: Option<NodeId>) -> Self {
        Self::fresh(NodeKind::Text, content_id, parent)
    }

    pub fn comment(content_id: u32, parent: Option<NodeId>) -> Self {
        Self::fresh(NodeKind::Comment, content_id, parent)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element)
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text)
    }
}

/// Stored attribute; both halves live in the string pool.
#[derive(Debug, Clone)]
pub struct Attr {
    pub name_id: u32,
    pub value_id: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_node_has_no_parent() {
        let root = Node::document();
        assert!(matches!(root.kind, NodeKind::Document));
        assert!(root.parent.is_none());
    }

    #[test]
    fn test_constructors_set_kind_and_links() {
        let elem = Node::element(1, Some(0));
        assert!(elem.is_element() && !elem.is_text());
        assert_eq!((elem.parent, elem.name_id), (Some(0), 1));
        assert!(Node::text(3, Some(1)).is_text());
        assert!(matches!(Node::comment(4, Some(1)).kind, NodeKind::Comment));
    }
}
