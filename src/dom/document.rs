//! XML Document - Arena-based DOM representation
//!
//! Storage:
//! - Arena allocation for nodes and attributes
//! - NodeId indices for traversal
//! - String interning for names, values and character data
//!
//! The tree is built by the SAX walk over a cursor, so anything the
//! cursor accepts (including lenient recovery) becomes a document.

use super::builder::DomBuilder;
use super::namespace::{declared_prefix, predeclared};
use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::StringPool;
use crate::core::options::Options;
use crate::core::scanner::split_name;
use crate::core::tokenizer::Tokenizer;
use crate::error::CursorError;
use crate::reader::cursor::Cursor;
use crate::sax::SaxParser;

/// DOCTYPE root name and external identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentType {
    pub name: Vec<u8>,
    pub public_id: Option<Vec<u8>>,
    pub system_id: Option<Vec<u8>>,
}

/// An XML document stored in arena format
#[derive(Debug)]
pub struct XmlDocument {
    pub(super) nodes: Vec<XmlNode>,
    pub(super) attributes: Vec<XmlAttribute>,
    pub(super) strings: StringPool,
    pub(super) root_element: Option<NodeId>,
    pub(super) doctype: Option<DocumentType>,
}

impl Default for XmlDocument {
    fn default() -> Self {
        XmlDocument {
            nodes: vec![XmlNode::document()],
            attributes: Vec::new(),
            strings: StringPool::new(),
            root_element: None,
            doctype: None,
        }
    }
}

impl XmlDocument {
    /// Build a document from everything the cursor visits
    pub fn build<T: Tokenizer>(cursor: &mut Cursor<T>) -> Result<Self, CursorError> {
        let mut parser = SaxParser::new(DomBuilder::new());
        parser.process(cursor)?;
        Ok(parser.into_handler().finish())
    }

    /// Parse a document from a byte slice
    pub fn parse(input: &[u8], options: Options) -> Result<Self, CursorError> {
        Self::build(&mut Cursor::from_slice(input, options)?)
    }

    /// Parse a document from a string in strict mode
    pub fn parse_str(input: &str) -> Result<Self, CursorError> {
        Self::parse(input.as_bytes(), Options::default())
    }

    /// Get the document root node (index 0)
    pub fn document_node(&self) -> &XmlNode {
        &self.nodes[0]
    }

    /// Get the root element (first element child of document)
    pub fn root_element(&self) -> Option<&XmlNode> {
        self.root_element.and_then(|id| self.get_node(id))
    }

    /// Get root element ID
    pub fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    /// DOCTYPE declaration, if the document has one
    pub fn doctype(&self) -> Option<&DocumentType> {
        self.doctype.as_ref()
    }

    /// Get a node by ID
    pub fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    /// Get total number of nodes, the document node included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the string pool for direct access
    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    /// Element name, PI target or DOCTYPE name
    pub fn node_name(&self, id: NodeId) -> Option<&[u8]> {
        self.strings.get(self.get_node(id)?.name_id)
    }

    /// Get node name as string
    pub fn node_name_str(&self, id: NodeId) -> Option<&str> {
        std::str::from_utf8(self.node_name(id)?).ok()
    }

    /// Get node local name (without prefix)
    pub fn node_local_name(&self, id: NodeId) -> Option<&[u8]> {
        self.node_name(id).map(|name| split_name(name).1)
    }

    /// Get node namespace prefix, if any
    pub fn node_prefix(&self, id: NodeId) -> Option<&[u8]> {
        self.node_name(id).and_then(|name| split_name(name).0)
    }

    /// Own character data of a text, CDATA, comment or PI node
    pub fn node_value(&self, id: NodeId) -> Option<&[u8]> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::CData | NodeKind::Comment | NodeKind::ProcessingInstruction => {
                self.strings.get(node.value_id)
            }
            _ => None,
        }
    }

    /// Concatenated text and CDATA of a node and its descendants
    pub fn text_content(&self, id: NodeId) -> Vec<u8> {
        let mut text = Vec::new();
        let own = std::iter::once(id);
        for node_id in own.chain(self.descendants(id)) {
            if let Some(node) = self.get_node(node_id).filter(|n| n.is_text()) {
                text.extend_from_slice(self.strings.get(node.value_id).unwrap_or_default());
            }
        }
        text
    }

    /// Get attributes for an element (or the document node)
    pub fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        let Some(node) = self.get_node(id) else {
            return &[];
        };
        let start = node.attr_start as usize;
        let end = start + node.attr_count as usize;
        self.attributes.get(start..end).unwrap_or_default()
    }

    /// Get attribute value by name
    pub fn get_attribute(&self, node_id: NodeId, name: &[u8]) -> Option<&[u8]> {
        self.attributes(node_id)
            .iter()
            .find(|attr| self.strings.get(attr.name_id) == Some(name))
            .and_then(|attr| self.strings.get(attr.value_id))
    }

    /// Get all attribute names and values for a node
    pub fn attribute_pairs(&self, node_id: NodeId) -> Vec<(&[u8], &[u8])> {
        self.attributes(node_id)
            .iter()
            .filter_map(|attr| Some((self.strings.get(attr.name_id)?, self.strings.get(attr.value_id)?)))
            .collect()
    }

    /// Resolve a namespace prefix in scope at `node`
    ///
    /// An empty prefix asks for the default namespace. Declarations are
    /// searched from `node` up through its ancestors; an empty
    /// declaration value undeclares the prefix.
    pub fn lookup_namespace(&self, node: NodeId, prefix: &[u8]) -> Option<&[u8]> {
        if let Some(uri) = predeclared(prefix) {
            return Some(uri);
        }
        let mut current = Some(node);
        while let Some(id) = current {
            let found = self.attributes(id).iter().find(|attr| {
                self.strings
                    .get(attr.name_id)
                    .and_then(declared_prefix)
                    .is_some_and(|declared| declared == prefix)
            });
            if let Some(attr) = found {
                return self.strings.get(attr.value_id).filter(|uri| !uri.is_empty());
            }
            current = self.get_node(id).and_then(|n| n.parent);
        }
        None
    }

    /// Namespace URI of an element's own name
    pub fn namespace_uri(&self, id: NodeId) -> Option<&[u8]> {
        let prefix = self.node_prefix(id).unwrap_or_default();
        self.lookup_namespace(id, prefix)
    }

    /// Iterate over children of a node
    pub fn children(&self, id: NodeId) -> ChildIter<'_> {
        let first = self.get_node(id).and_then(|n| n.first_child);
        ChildIter { doc: self, next: first }
    }

    /// Iterate over all descendants of a node in document order
    pub fn descendants(&self, id: NodeId) -> DescendantIter<'_> {
        let mut iter = DescendantIter { doc: self, stack: Vec::new() };
        iter.push_children(id);
        iter
    }
}

/// Iterator over child nodes
pub struct ChildIter<'d> {
    doc: &'d XmlDocument,
    next: Option<NodeId>,
}

impl Iterator for ChildIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.get_node(current).and_then(|n| n.next_sibling);
        Some(current)
    }
}

/// Iterator over descendant nodes
pub struct DescendantIter<'d> {
    doc: &'d XmlDocument,
    stack: Vec<NodeId>,
}

impl DescendantIter<'_> {
    fn push_children(&mut self, id: NodeId) {
        let mut child = self.doc.get_node(id).and_then(|n| n.last_child);
        while let Some(cid) = child {
            self.stack.push(cid);
            child = self.doc.get_node(cid).and_then(|n| n.prev_sibling);
        }
    }
}

impl Iterator for DescendantIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.push_children(current);
        Some(current)
    }
}
