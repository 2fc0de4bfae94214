//! SAX Event Types
//!
//! Owned records of the callbacks a `SaxHandler` receives.

use crate::core::attributes::AttributeMap;

/// Attribute name/value pairs in document order
pub type AttributeList = Vec<(Vec<u8>, Vec<u8>)>;

/// A SAX parsing event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaxEvent {
    /// The document node with its declaration pseudo-attributes
    Document { attributes: AttributeList },

    /// Start of an element
    StartElement { name: Vec<u8>, attributes: AttributeList },

    /// End of an element
    EndElement { name: Vec<u8> },

    /// Self-closing element
    EmptyElement { name: Vec<u8>, attributes: AttributeList },

    /// Text content, entities expanded
    Text(Vec<u8>),

    /// CDATA section content (excluding markers)
    CData(Vec<u8>),

    /// Comment content (excluding markers)
    Comment(Vec<u8>),

    ProcessingInstruction { target: Vec<u8>, data: Vec<u8> },

    DocType { name: Vec<u8>, content: Vec<u8> },
}

impl SaxEvent {
    pub(crate) fn attribute_list(attributes: &AttributeMap) -> AttributeList {
        attributes.clone().into_vec()
    }

    /// Check if this is a start element event
    #[inline]
    pub fn is_start_element(&self) -> bool {
        matches!(self, SaxEvent::StartElement { .. })
    }

    /// Check if this is an end element event
    #[inline]
    pub fn is_end_element(&self) -> bool {
        matches!(self, SaxEvent::EndElement { .. })
    }

    /// Check if this is a text event
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self, SaxEvent::Text(_))
    }

    /// Get the element name if this is an element event
    pub fn element_name(&self) -> Option<&[u8]> {
        match self {
            SaxEvent::StartElement { name, .. }
            | SaxEvent::EmptyElement { name, .. }
            | SaxEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_predicates() {
        let start = SaxEvent::StartElement { name: b"a".to_vec(), attributes: Vec::new() };
        assert!(start.is_start_element());
        assert_eq!(start.element_name(), Some(b"a" as &[u8]));

        let text = SaxEvent::Text(b"x".to_vec());
        assert!(text.is_text());
        assert_eq!(text.element_name(), None);
    }
}
