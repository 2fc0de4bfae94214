//! SAX Dispatcher
//!
//! Walks a cursor depth first and reports each node to a `SaxHandler`.

use crate::core::attributes::AttributeMap;
use crate::core::tokenizer::{Tokenizer, XmlKind};
use crate::error::CursorError;
use crate::reader::cursor::Cursor;

/// Callbacks for SAX-style parsing
///
/// Every slot defaults to doing nothing, so handlers implement only what
/// they need. Names and content are borrowed for the duration of the call.
pub trait SaxHandler {
    /// The document node, with the XML declaration's pseudo-attributes
    fn document(&mut self, _attributes: &AttributeMap) {}

    fn element_start(&mut self, _name: &[u8], _attributes: &AttributeMap) {}

    fn element_end(&mut self, _name: &[u8]) {}

    /// Self-closing element; no `element_end` follows
    fn element_empty(&mut self, _name: &[u8], _attributes: &AttributeMap) {}

    fn text(&mut self, _content: &[u8]) {}

    fn cdata(&mut self, _content: &[u8]) {}

    fn comment(&mut self, _content: &[u8]) {}

    fn processing_instruction(&mut self, _target: &[u8], _data: &[u8]) {}

    /// DOCTYPE with its root name and the external id text after it
    fn doctype(&mut self, _name: &[u8], _content: &[u8]) {}
}

/// Drives a `SaxHandler` from a cursor
pub struct SaxParser<H: SaxHandler> {
    handler: H,
}

impl<H: SaxHandler> SaxParser<H> {
    pub fn new(handler: H) -> Self {
        SaxParser { handler }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    /// Report every node the cursor visits, in document order
    ///
    /// From the document start this covers the whole input; from any other
    /// position it covers the current node and its following siblings.
    pub fn process<T: Tokenizer>(&mut self, cursor: &mut Cursor<T>) -> Result<(), CursorError> {
        if cursor.is_at_start() {
            let attributes = cursor.attributes().into_map()?;
            self.handler.document(&attributes);
            if !cursor.enter()? {
                return Ok(());
            }
        }
        self.walk(cursor)
    }

    fn walk<T: Tokenizer>(&mut self, cursor: &mut Cursor<T>) -> Result<(), CursorError> {
        loop {
            self.dispatch(cursor)?;
            if !cursor.next()? {
                return Ok(());
            }
        }
    }

    fn dispatch<T: Tokenizer>(&mut self, cursor: &mut Cursor<T>) -> Result<(), CursorError> {
        let Some(kind) = cursor.kind() else {
            return Ok(());
        };
        match kind {
            XmlKind::ElementStart => {
                let name = cursor.name().to_vec();
                let attributes = cursor.attributes().into_map()?;
                self.handler.element_start(&name, &attributes);
                if cursor.enter()? {
                    self.walk(cursor)?;
                    cursor.exit()?;
                }
                self.handler.element_end(&name);
            }
            XmlKind::ElementEmpty => {
                let attributes = cursor.attributes().into_map()?;
                self.handler.element_empty(cursor.name(), &attributes);
            }
            XmlKind::Text => self.handler.text(cursor.content()),
            XmlKind::CData => self.handler.cdata(cursor.content()),
            XmlKind::Comment => self.handler.comment(cursor.content()),
            XmlKind::ProcessingInstruction => {
                self.handler.processing_instruction(cursor.name(), cursor.content())
            }
            // The internal subset is skipped by the following `next`, which
            // registers its entity declarations on the way
            XmlKind::DtdStart | XmlKind::DtdEmpty => self.handler.doctype(cursor.name(), cursor.content()),
            _ => {}
        }
        Ok(())
    }
}
