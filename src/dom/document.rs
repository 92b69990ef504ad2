//! Document - arena-based tree representation
//!
//! Tree storage for lenient HTML parses:
//! - Arena allocation for nodes, NodeId indices for traversal
//! - String interning for names, attribute values, and text
//! - All normalization happens here, at build time; nothing is computed
//!   lazily afterwards, so a parsed document is read-only and safe to share
//!   across rule-application workers.
//!
//! Normalization rules: tag names uppercased, attribute names lowercased,
//! entities decoded, NBSP replaced by a plain space, directly adjacent text
//! runs merged into one text node (comments keep neighbouring runs apart),
//! void elements never take children.

use super::node::{Attr, Node, NodeId, NodeKind};
use super::strings::StringPool;
use crate::error::{Error, Result};
use crate::html::{is_void_element, HtmlToken, Tokenizer};

/// A parsed document stored in arena format
#[derive(Debug)]
pub struct Document {
    /// Arena of nodes; node 0 is the document node
    nodes: Vec<Node>,
    /// Arena of attributes
    attributes: Vec<Attr>,
    /// Interned strings
    strings: StringPool,
    /// Root element node ID (not the document node)
    root_element: Option<NodeId>,
}

impl Document {
    /// Parse a document (lenient). Fails only when the input contains no
    /// element at all, which signals a payload that is not markup.
    pub fn parse(input: &str) -> std::result::Result<Self, String> {
        let mut doc = Document {
            nodes: Vec::with_capacity(256),
            attributes: Vec::with_capacity(64),
            strings: StringPool::new(),
            root_element: None,
        };
        doc.nodes.push(Node::document());
        doc.build(input.as_bytes());

        if doc.root_element.is_none() {
            return Err("no element content".to_string());
        }
        Ok(doc)
    }

    fn build(&mut self, input: &[u8]) {
        let mut stack: Vec<NodeId> = vec![0];
        // Adjacent text tokens accumulate here and become one text node;
        // a token that creates a node flushes the run first.
        let mut pending_text = String::new();

        for token in Tokenizer::new(input) {
            match token {
                HtmlToken::Text(content) => {
                    push_normalized(&mut pending_text, content.as_ref());
                }
                HtmlToken::StartTag { name, attrs, self_closing } => {
                    let parent = *stack.last().unwrap_or(&0);
                    self.flush_text(&mut pending_text, parent);

                    let name_id = self.strings.intern(name.as_ref());
                    let attr_start = self.attributes.len() as u32;
                    for attr in &attrs {
                        let name_id = self.strings.intern(attr.name.as_ref());
                        let value_id = self.strings.intern(attr.value.as_ref());
                        self.attributes.push(Attr { name_id, value_id });
                    }

                    let mut node = Node::element(name_id, Some(parent));
                    node.attr_start = attr_start;
                    node.attr_count = attrs.len().min(u16::MAX as usize) as u16;

                    let elem_id = self.push_node(node, parent);
                    if self.root_element.is_none() {
                        self.root_element = Some(elem_id);
                    }
                    if !self_closing && !is_void_element(name.as_ref()) {
                        stack.push(elem_id);
                    }
                }
                HtmlToken::EndTag { name } => {
                    // Close the nearest matching open element. A stray end
                    // tag with no open counterpart is ignored entirely, so
                    // it does not split the surrounding text run.
                    let name_id = self.strings.intern(name.as_ref());
                    if let Some(depth) = stack
                        .iter()
                        .rposition(|&id| id != 0 && self.nodes[id as usize].name_id == name_id)
                    {
                        let parent = *stack.last().unwrap_or(&0);
                        self.flush_text(&mut pending_text, parent);
                        stack.truncate(depth);
                    }
                }
                HtmlToken::Comment(content) => {
                    let parent = *stack.last().unwrap_or(&0);
                    self.flush_text(&mut pending_text, parent);
                    let content_id = self.strings.intern(content);
                    self.push_node(Node::comment(content_id, Some(parent)), parent);
                }
            }
        }

        // Text after the last tag, if any, attaches to the innermost
        // still-open element (leniency for truncated documents).
        let parent = *stack.last().unwrap_or(&0);
        self.flush_text(&mut pending_text, parent);
    }

    fn flush_text(&mut self, pending: &mut String, parent: NodeId) {
        if pending.is_empty() {
            return;
        }
        let content_id = self.strings.intern(pending.as_bytes());
        self.push_node(Node::text(content_id, Some(parent)), parent);
        pending.clear();
    }

    /// Append a node to the arena and link it as the parent's last child
    fn push_node(&mut self, node: Node, parent: NodeId) -> NodeId {
        let id = self.nodes.len() as NodeId;
        self.nodes.push(node);
        self.link_child(parent, id);
        id
    }

    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let prev_last = self.nodes[parent_id as usize].last_child;
        match prev_last {
            Some(last) => {
                self.nodes[last as usize].next_sibling = Some(child_id);
                self.nodes[child_id as usize].prev_sibling = Some(last);
            }
            None => {
                self.nodes[parent_id as usize].first_child = Some(child_id);
            }
        }
        self.nodes[parent_id as usize].last_child = Some(child_id);
    }

    // --- accessors -------------------------------------------------------

    /// The document node's ID (always 0)
    #[inline]
    pub fn document_node(&self) -> NodeId {
        0
    }

    /// Root element ID
    #[inline]
    pub fn root_element(&self) -> Option<NodeId> {
        self.root_element
    }

    /// Get a node by ID
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    /// Get a node by ID, None if out of range
    #[inline]
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    #[inline]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).is_element()
    }

    #[inline]
    pub fn is_text(&self, id: NodeId) -> bool {
        self.node(id).is_text()
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    #[inline]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    #[inline]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Tag name for elements, empty for other kinds
    pub fn name(&self, id: NodeId) -> &str {
        let node = self.node(id);
        if node.is_element() {
            self.strings.get_str(node.name_id)
        } else {
            ""
        }
    }

    /// Content for text and comment nodes, empty for other kinds
    pub fn text(&self, id: NodeId) -> &str {
        let node = self.node(id);
        match node.kind {
            NodeKind::Text | NodeKind::Comment => self.strings.get_str(node.name_id),
            _ => "",
        }
    }

    /// True for a text node whose content is entirely whitespace
    pub fn is_whitespace_text(&self, id: NodeId) -> bool {
        self.is_text(id) && self.text(id).chars().all(char::is_whitespace)
    }

    /// Attribute value by (lowercase) name; one atomic presence+value query
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let node = self.node(id);
        let start = node.attr_start as usize;
        let end = start + node.attr_count as usize;
        for attr in &self.attributes[start..end] {
            if self.strings.get_str(attr.name_id) == name {
                return Some(self.strings.get_str(attr.value_id));
            }
        }
        None
    }

    /// All attributes of a node as (name, value) pairs
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        let node = self.node(id);
        let start = node.attr_start as usize;
        let end = start + node.attr_count as usize;
        self.attributes[start..end]
            .iter()
            .map(|attr| (self.strings.get_str(attr.name_id), self.strings.get_str(attr.value_id)))
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        ChildIter { doc: self, next: self.node(id).first_child }
    }

    /// Iterate over all descendants of a node in document order (excluding
    /// the node itself)
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut stack = Vec::new();
        let mut child_id = self.node(id).last_child;
        while let Some(cid) = child_id {
            stack.push(cid);
            child_id = self.node(cid).prev_sibling;
        }
        DescendantIter { doc: self, stack }
    }

    /// XPath string-value: own content for text/comment nodes, concatenated
    /// descendant text for elements and the document node
    pub fn string_value(&self, id: NodeId) -> String {
        match self.kind(id) {
            NodeKind::Text | NodeKind::Comment => self.text(id).to_string(),
            _ => {
                let mut out = String::new();
                for desc in self.descendants(id) {
                    if self.is_text(desc) {
                        out.push_str(self.text(desc));
                    }
                }
                out
            }
        }
    }

    /// Total number of nodes, document node included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

/// Accumulate decoded text, applying character-level normalization
fn push_normalized(out: &mut String, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    for c in text.chars() {
        // NBSP is template glue, not content; normalize to a plain space
        if c == '\u{00A0}' {
            out.push(' ');
        } else {
            out.push(c);
        }
    }
}

/// Iterator over child nodes
pub struct ChildIter<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}

/// Iterator over descendant nodes in document order
pub struct DescendantIter<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for DescendantIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        let mut child_id = self.doc.node(current).last_child;
        while let Some(id) = child_id {
            self.stack.push(id);
            child_id = self.doc.node(id).prev_sibling;
        }
        Some(current)
    }
}

/// A collection of parsed documents
///
/// `parse_all` is the single-threaded pre-normalization point: every
/// document is fully built and normalized here, before any parallel phase
/// touches the collection.
#[derive(Debug)]
pub struct DocumentSet {
    docs: Vec<Document>,
}

impl DocumentSet {
    /// Parse every input sequentially; the first failure aborts with its
    /// document index
    pub fn parse_all<S: AsRef<str>>(inputs: &[S]) -> Result<Self> {
        let mut docs = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.iter().enumerate() {
            let doc = Document::parse(input.as_ref())
                .map_err(|message| Error::Parse { index, message })?;
            docs.push(doc);
        }
        Ok(DocumentSet { docs })
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn get(&self, index: usize) -> &Document {
        &self.docs[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Document> {
        self.docs.iter()
    }
}

impl std::ops::Index<usize> for DocumentSet {
    type Output = Document;

    fn index(&self, index: usize) -> &Document {
        &self.docs[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(input: &str) -> Document {
        Document::parse(input).unwrap()
    }

    #[test]
    fn test_parse_simple() {
        let d = doc("<HTML><BODY><P>pivot</P>target</BODY></HTML>");
        let root = d.root_element().unwrap();
        assert_eq!(d.name(root), "HTML");

        let body = d.first_child(root).unwrap();
        assert_eq!(d.name(body), "BODY");

        let children: Vec<_> = d.children(body).collect();
        assert_eq!(children.len(), 2);
        assert_eq!(d.name(children[0]), "P");
        assert_eq!(d.text(children[1]), "target");
    }

    #[test]
    fn test_tag_names_uppercased() {
        let d = doc("<html><body>x</body></html>");
        assert_eq!(d.name(d.root_element().unwrap()), "HTML");
    }

    #[test]
    fn test_adjacent_text_merged() {
        let d = doc("<P>a &amp; b</P>");
        let p = d.root_element().unwrap();
        let children: Vec<_> = d.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(d.text(children[0]), "a & b");
    }

    #[test]
    fn test_comment_separates_text_runs() {
        let d = doc("<P>foo<!--sep-->bar</P>");
        let p = d.root_element().unwrap();
        let children: Vec<_> = d.children(p).collect();
        assert_eq!(children.len(), 3);
        assert_eq!(d.text(children[0]), "foo");
        assert_eq!(d.kind(children[1]), NodeKind::Comment);
        assert_eq!(d.text(children[2]), "bar");
    }

    #[test]
    fn test_nbsp_normalized() {
        let d = doc("<P>a&nbsp;b</P>");
        let p = d.root_element().unwrap();
        let t = d.first_child(p).unwrap();
        assert_eq!(d.text(t), "a b");
    }

    #[test]
    fn test_void_element_takes_no_children() {
        let d = doc("<P>pivot</P><BR>target");
        let ids: Vec<_> = d.descendants(d.document_node()).collect();
        let br = ids.iter().copied().find(|&id| d.name(id) == "BR").unwrap();
        assert!(d.node(br).first_child.is_none());
        // target is BR's sibling, not its child
        let after = d.next_sibling(br).unwrap();
        assert_eq!(d.text(after), "target");
    }

    #[test]
    fn test_self_closing() {
        let d = doc("<P>pivot</P><BR/>target");
        let ids: Vec<_> = d.descendants(d.document_node()).collect();
        let br = ids.iter().copied().find(|&id| d.name(id) == "BR").unwrap();
        assert_eq!(d.text(d.next_sibling(br).unwrap()), "target");
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let d = doc("<DIV>a</SPAN>b</DIV>");
        let div = d.root_element().unwrap();
        let children: Vec<_> = d.children(div).collect();
        // The bogus end tag creates no node, so the text run stays whole
        assert_eq!(children.len(), 1);
        assert_eq!(d.text(children[0]), "ab");
    }

    #[test]
    fn test_unclosed_elements_closed_at_eof() {
        let d = doc("<DIV><P>text");
        let div = d.root_element().unwrap();
        let p = d.first_child(div).unwrap();
        assert_eq!(d.name(p), "P");
        assert_eq!(d.text(d.first_child(p).unwrap()), "text");
    }

    #[test]
    fn test_attribute_query() {
        let d = doc("<DIV ID='p' class=\"x\">t</DIV>");
        let div = d.root_element().unwrap();
        assert_eq!(d.attribute(div, "id"), Some("p"));
        assert_eq!(d.attribute(div, "class"), Some("x"));
        assert_eq!(d.attribute(div, "missing"), None);
    }

    #[test]
    fn test_string_value() {
        let d = doc("<DIV><P>a</P><P>b</P></DIV>");
        assert_eq!(d.string_value(d.root_element().unwrap()), "ab");
    }

    #[test]
    fn test_whitespace_text_kept() {
        let d = doc("<DIV><P>a</P> <P>b</P></DIV>");
        let div = d.root_element().unwrap();
        let children: Vec<_> = d.children(div).collect();
        assert_eq!(children.len(), 3);
        assert!(d.is_whitespace_text(children[1]));
    }

    #[test]
    fn test_descendants_document_order() {
        let d = doc("<A><B>1</B><C><D>2</D></C></A>");
        let names: Vec<String> = d
            .descendants(d.document_node())
            .map(|id| {
                if d.is_element(id) {
                    d.name(id).to_string()
                } else {
                    d.text(id).to_string()
                }
            })
            .collect();
        assert_eq!(names, vec!["A", "B", "1", "C", "D", "2"]);
    }

    #[test]
    fn test_rejects_markup_free_input() {
        assert!(Document::parse("just plain text").is_err());
    }

    #[test]
    fn test_document_set_reports_failing_index() {
        let err = DocumentSet::parse_all(&["<P>ok</P>", "nope"]).unwrap_err();
        assert!(err.to_string().contains("document 1"));
    }
}
