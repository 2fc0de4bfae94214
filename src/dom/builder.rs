//! DOM Builder
//!
//! A `SaxHandler` that appends each reported node to the current parent
//! of an `XmlDocument` arena.

use super::document::{DocumentType, XmlDocument};
use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use crate::core::attributes::AttributeMap;
use crate::core::dtd::parse_doctype;
use crate::sax::SaxHandler;
use tracing::warn;

/// Tree construction state
#[derive(Debug)]
pub struct DomBuilder {
    doc: XmlDocument,
    /// Open elements, the document node at the bottom
    stack: Vec<NodeId>,
}

impl Default for DomBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DomBuilder {
    pub fn new() -> Self {
        DomBuilder {
            doc: XmlDocument::default(),
            stack: vec![0],
        }
    }

    /// The finished document
    pub fn finish(self) -> XmlDocument {
        self.doc
    }

    fn parent(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(0)
    }

    /// Append a node under the current parent
    fn append(&mut self, kind: NodeKind, name: &[u8], value: &[u8]) -> NodeId {
        let parent_id = self.parent();
        let depth = u16::try_from(self.stack.len()).unwrap_or(u16::MAX);

        let mut node = XmlNode::new(kind, Some(parent_id), depth);
        node.name_id = self.doc.strings.intern(name);
        node.value_id = self.doc.strings.intern(value);

        let node_id = self.doc.nodes.len() as NodeId;
        self.doc.nodes.push(node);
        self.link_child(parent_id, node_id);
        node_id
    }

    /// Link a child node to its parent
    fn link_child(&mut self, parent_id: NodeId, child_id: NodeId) {
        let nodes = &mut self.doc.nodes;
        match nodes[parent_id as usize].last_child {
            Some(last_child_id) => {
                nodes[child_id as usize].prev_sibling = Some(last_child_id);
                nodes[last_child_id as usize].next_sibling = Some(child_id);
            }
            None => nodes[parent_id as usize].first_child = Some(child_id),
        }
        nodes[parent_id as usize].last_child = Some(child_id);
    }

    fn set_attributes(&mut self, node_id: NodeId, attributes: &AttributeMap) {
        let attr_start = self.doc.attributes.len() as u32;
        for (name, value) in attributes.iter() {
            let attr = XmlAttribute {
                name_id: self.doc.strings.intern(name),
                value_id: self.doc.strings.intern(value),
            };
            self.doc.attributes.push(attr);
        }
        let node = &mut self.doc.nodes[node_id as usize];
        node.attr_start = attr_start;
        node.attr_count = attributes.len() as u32;
    }

    fn element(&mut self, name: &[u8], attributes: &AttributeMap) -> NodeId {
        let node_id = self.append(NodeKind::Element, name, &[]);
        self.set_attributes(node_id, attributes);
        if self.doc.root_element.is_none() && self.stack.len() == 1 {
            self.doc.root_element = Some(node_id);
        }
        node_id
    }
}

impl SaxHandler for DomBuilder {
    fn document(&mut self, attributes: &AttributeMap) {
        self.set_attributes(0, attributes);
    }

    fn element_start(&mut self, name: &[u8], attributes: &AttributeMap) {
        let node_id = self.element(name, attributes);
        self.stack.push(node_id);
    }

    fn element_end(&mut self, _name: &[u8]) {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    fn element_empty(&mut self, name: &[u8], attributes: &AttributeMap) {
        self.element(name, attributes);
    }

    fn text(&mut self, content: &[u8]) {
        self.append(NodeKind::Text, &[], content);
    }

    fn cdata(&mut self, content: &[u8]) {
        self.append(NodeKind::CData, &[], content);
    }

    fn comment(&mut self, content: &[u8]) {
        self.append(NodeKind::Comment, &[], content);
    }

    fn processing_instruction(&mut self, target: &[u8], data: &[u8]) {
        self.append(NodeKind::ProcessingInstruction, target, data);
    }

    fn doctype(&mut self, name: &[u8], content: &[u8]) {
        self.append(NodeKind::DocumentType, name, &[]);

        let mut header = name.to_vec();
        header.push(b' ');
        header.extend_from_slice(content);
        let doctype = match parse_doctype(&header) {
            Ok(parsed) => DocumentType {
                name: parsed.name.to_vec(),
                public_id: parsed.external.as_ref().and_then(|id| id.public_id).map(<[u8]>::to_vec),
                system_id: parsed.external.as_ref().map(|id| id.system_id.to_vec()),
            },
            Err(message) => {
                warn!(content = %String::from_utf8_lossy(&header), message, "keeping DOCTYPE name only");
                DocumentType { name: name.to_vec(), ..DocumentType::default() }
            }
        };
        if self.doc.doctype.is_none() {
            self.doc.doctype = Some(doctype);
        }
    }
}
