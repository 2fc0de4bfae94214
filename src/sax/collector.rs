//! SAX Collector
//!
//! Implements SaxHandler to record every callback as an owned event.

use super::events::SaxEvent;
use super::handler::SaxHandler;
use crate::core::attributes::AttributeMap;

/// Collector that gathers SAX events during a walk
#[derive(Debug, Default)]
pub struct SaxCollector {
    events: Vec<SaxEvent>,
}

impl SaxCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with estimated capacity
    pub fn with_capacity(events: usize) -> Self {
        SaxCollector {
            events: Vec::with_capacity(events),
        }
    }

    /// Take the collected events
    pub fn take_events(&mut self) -> Vec<SaxEvent> {
        std::mem::take(&mut self.events)
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[SaxEvent] {
        &self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl SaxHandler for SaxCollector {
    fn document(&mut self, attributes: &AttributeMap) {
        self.events.push(SaxEvent::Document {
            attributes: SaxEvent::attribute_list(attributes),
        });
    }

    fn element_start(&mut self, name: &[u8], attributes: &AttributeMap) {
        self.events.push(SaxEvent::StartElement {
            name: name.to_vec(),
            attributes: SaxEvent::attribute_list(attributes),
        });
    }

    fn element_end(&mut self, name: &[u8]) {
        self.events.push(SaxEvent::EndElement { name: name.to_vec() });
    }

    fn element_empty(&mut self, name: &[u8], attributes: &AttributeMap) {
        self.events.push(SaxEvent::EmptyElement {
            name: name.to_vec(),
            attributes: SaxEvent::attribute_list(attributes),
        });
    }

    fn text(&mut self, content: &[u8]) {
        self.events.push(SaxEvent::Text(content.to_vec()));
    }

    fn cdata(&mut self, content: &[u8]) {
        self.events.push(SaxEvent::CData(content.to_vec()));
    }

    fn comment(&mut self, content: &[u8]) {
        self.events.push(SaxEvent::Comment(content.to_vec()));
    }

    fn processing_instruction(&mut self, target: &[u8], data: &[u8]) {
        self.events.push(SaxEvent::ProcessingInstruction {
            target: target.to_vec(),
            data: data.to_vec(),
        });
    }

    fn doctype(&mut self, name: &[u8], content: &[u8]) {
        self.events.push(SaxEvent::DocType {
            name: name.to_vec(),
            content: content.to_vec(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::Options;
    use crate::error::CursorError;
    use crate::reader::cursor::Cursor;
    use crate::sax::SaxParser;
    use pretty_assertions::assert_eq;

    fn collect(input: &str, options: Options) -> Result<Vec<SaxEvent>, CursorError> {
        let mut cursor = Cursor::from_slice(input.as_bytes(), options)?;
        let mut parser = SaxParser::new(SaxCollector::new());
        parser.process(&mut cursor)?;
        Ok(parser.into_handler().take_events())
    }

    fn attr(name: &str, value: &str) -> (Vec<u8>, Vec<u8>) {
        (name.as_bytes().to_vec(), value.as_bytes().to_vec())
    }

    #[test]
    fn test_document_events() {
        let input = "<?xml version=\"1.0\"?><!--c--><r id=\"1\">hi<b/><![CDATA[x]]><?pi d?></r>";
        let events = collect(input, Options::default()).unwrap();
        assert_eq!(
            events,
            vec![
                SaxEvent::Document { attributes: vec![attr("version", "1.0")] },
                SaxEvent::Comment(b"c".to_vec()),
                SaxEvent::StartElement { name: b"r".to_vec(), attributes: vec![attr("id", "1")] },
                SaxEvent::Text(b"hi".to_vec()),
                SaxEvent::EmptyElement { name: b"b".to_vec(), attributes: vec![] },
                SaxEvent::CData(b"x".to_vec()),
                SaxEvent::ProcessingInstruction { target: b"pi".to_vec(), data: b"d".to_vec() },
                SaxEvent::EndElement { name: b"r".to_vec() },
            ]
        );
    }

    #[test]
    fn test_entity_declarations_not_dispatched() {
        let input = "<!DOCTYPE r [<!ENTITY e \"v\">]><r k=\"&e;\">&e;</r>";
        let events = collect(input, Options::default()).unwrap();
        assert_eq!(
            events,
            vec![
                SaxEvent::Document { attributes: vec![attr("version", "1.0"), attr("encoding", "UTF-8")] },
                SaxEvent::DocType { name: b"r".to_vec(), content: Vec::new() },
                SaxEvent::StartElement { name: b"r".to_vec(), attributes: vec![attr("k", "v")] },
                SaxEvent::Text(b"v".to_vec()),
                SaxEvent::EndElement { name: b"r".to_vec() },
            ]
        );
    }

    #[test]
    fn test_nested_and_empty_containers() {
        let events = collect("<a><b></b><c><d/></c></a>", Options::default()).unwrap();
        let names: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                SaxEvent::StartElement { name, .. } => Some(format!("+{}", String::from_utf8_lossy(name))),
                SaxEvent::EndElement { name } => Some(format!("-{}", String::from_utf8_lossy(name))),
                SaxEvent::EmptyElement { name, .. } => Some(format!("={}", String::from_utf8_lossy(name))),
                _ => None,
            })
            .collect();
        assert_eq!(names, vec!["+a", "+b", "-b", "+c", "=d", "-c", "-a"]);
    }

    #[test]
    fn test_duplicate_attributes_last_wins() {
        let events = collect("<a x=\"1\" y=\"2\" x=\"3\"/>", Options::default()).unwrap();
        assert_eq!(
            events[1],
            SaxEvent::EmptyElement { name: b"a".to_vec(), attributes: vec![attr("x", "3"), attr("y", "2")] }
        );
    }

    #[test]
    fn test_errors_propagate() {
        assert!(matches!(
            collect("<a><b></c></a>", Options::default()),
            Err(CursorError::TagMismatch { .. })
        ));
        assert!(matches!(
            collect("<a x=1/>", Options::default()),
            Err(CursorError::MalformedAttribute { .. })
        ));
        assert!(collect("<a><b></c></a>", Options::lenient()).is_ok());
    }
}
