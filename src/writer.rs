//! XML Writer
//!
//! Serializes markup to any `io::Write`, either node by node or by
//! replaying everything a cursor visits. Text and attribute values are
//! escaped on the way out; names and declaration bodies are written as
//! given.

use crate::core::entities::escape;
use crate::core::scanner::trim;
use crate::core::tokenizer::{Tokenizer, XmlKind};
use crate::error::WriterError;
use crate::reader::cursor::Cursor;
use std::io::{self, Write};
use tracing::trace;

/// Output formatting
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PrettyPrint {
    /// No whitespace beyond what the caller writes
    #[default]
    Minimal,
    /// Each markup node on its own line, one indent unit per level
    Indent(String),
}

/// An element whose end tag has not been written yet
#[derive(Debug)]
struct OpenElement {
    name: Vec<u8>,
    /// Some child markup was put on its own line
    indented: bool,
    /// Character data was written directly inside
    has_text: bool,
}

/// Streaming XML writer
#[derive(Debug)]
pub struct XmlWriter<W: Write> {
    writer: W,
    pretty: PrettyPrint,
    open: Vec<OpenElement>,
    /// A start tag is waiting for attributes or its `>`
    tag_pending: bool,
    in_doctype: bool,
    written: bool,
}

fn misuse(message: &'static str) -> WriterError {
    WriterError::Io(io::Error::new(io::ErrorKind::InvalidInput, message))
}

impl<W: Write> XmlWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_pretty_print(writer, PrettyPrint::Minimal)
    }

    pub fn with_pretty_print(writer: W, pretty: PrettyPrint) -> Self {
        XmlWriter {
            writer,
            pretty,
            open: Vec::new(),
            tag_pending: false,
            in_doctype: false,
            written: false,
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Number of elements started and not yet ended
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<(), WriterError> {
        self.writer.write_all(bytes)?;
        self.written = true;
        Ok(())
    }

    /// Finish a pending start tag with `>`
    fn close_tag(&mut self) -> Result<(), WriterError> {
        if self.tag_pending {
            self.tag_pending = false;
            self.raw(b">")?;
        }
        Ok(())
    }

    fn newline(&mut self, level: usize) -> Result<(), WriterError> {
        let PrettyPrint::Indent(unit) = &self.pretty else {
            return Ok(());
        };
        if !self.written {
            return Ok(());
        }
        let mut line = Vec::with_capacity(1 + unit.len() * level);
        line.push(b'\n');
        for _ in 0..level {
            line.extend_from_slice(unit.as_bytes());
        }
        self.raw(&line)
    }

    /// Open a markup child: close the parent's tag and indent
    fn begin_markup(&mut self) -> Result<(), WriterError> {
        self.close_tag()?;
        let level = self.open.len() + usize::from(self.in_doctype);
        let parent_has_text = self.open.last().is_some_and(|e| e.has_text);
        if !parent_has_text {
            self.newline(level)?;
            if let Some(parent) = self.open.last_mut() {
                parent.indented = true;
            }
        }
        Ok(())
    }

    /// `<?xml version="..." encoding="..." standalone="..."?>`
    pub fn write_xml_declaration(
        &mut self,
        version: &str,
        encoding: Option<&str>,
        standalone: Option<bool>,
    ) -> Result<(), WriterError> {
        let mut decl = format!("<?xml version=\"{version}\"");
        if let Some(encoding) = encoding {
            decl.push_str(&format!(" encoding=\"{encoding}\""));
        }
        if let Some(standalone) = standalone {
            let value = if standalone { "yes" } else { "no" };
            decl.push_str(&format!(" standalone=\"{value}\""));
        }
        decl.push_str("?>");
        self.raw(decl.as_bytes())
    }

    /// Write `<name`; attributes may follow until the next node
    pub fn start_element(&mut self, name: &[u8]) -> Result<(), WriterError> {
        self.begin_markup()?;
        self.raw(b"<")?;
        self.raw(name)?;
        self.open.push(OpenElement {
            name: name.to_vec(),
            indented: false,
            has_text: false,
        });
        self.tag_pending = true;
        Ok(())
    }

    /// Add ` name="value"` to the start tag just written
    pub fn write_attribute(&mut self, name: &[u8], value: &[u8]) -> Result<(), WriterError> {
        if !self.tag_pending {
            return Err(misuse("attribute written outside a start tag"));
        }
        self.raw(b" ")?;
        self.raw(name)?;
        self.raw(b"=\"")?;
        self.raw(&escape(value))?;
        self.raw(b"\"")
    }

    /// Close the innermost element; `<name/>` when it has no children
    pub fn end_element(&mut self) -> Result<(), WriterError> {
        let Some(element) = self.open.pop() else {
            return Err(misuse("end_element without an open element"));
        };
        if self.tag_pending {
            self.tag_pending = false;
            return self.raw(b"/>");
        }
        if element.indented && !element.has_text {
            self.newline(self.open.len())?;
        }
        self.raw(b"</")?;
        self.raw(&element.name)?;
        self.raw(b">")
    }

    /// Escaped character data
    pub fn write_text(&mut self, content: &[u8]) -> Result<(), WriterError> {
        self.close_tag()?;
        if let Some(parent) = self.open.last_mut() {
            parent.has_text = true;
        }
        self.raw(&escape(content))
    }

    /// CDATA section; a `]]>` in the content is split across two sections
    ///
    /// Counts as character data, so it is never put on its own line.
    pub fn write_cdata(&mut self, content: &[u8]) -> Result<(), WriterError> {
        self.close_tag()?;
        if let Some(parent) = self.open.last_mut() {
            parent.has_text = true;
        }
        self.raw(b"<![CDATA[")?;
        let mut rest = content;
        while let Some(pos) = memchr::memmem::find(rest, b"]]>") {
            self.raw(&rest[..pos + 2])?;
            self.raw(b"]]><![CDATA[")?;
            rest = &rest[pos + 2..];
        }
        self.raw(rest)?;
        self.raw(b"]]>")
    }

    pub fn write_comment(&mut self, content: &[u8]) -> Result<(), WriterError> {
        self.begin_markup()?;
        self.raw(b"<!--")?;
        self.raw(content)?;
        self.raw(b"-->")
    }

    pub fn write_processing_instruction(&mut self, target: &[u8], data: &[u8]) -> Result<(), WriterError> {
        self.begin_markup()?;
        self.raw(b"<?")?;
        self.raw(target)?;
        if !data.is_empty() {
            self.raw(b" ")?;
            self.raw(data)?;
        }
        self.raw(b"?>")
    }

    fn doctype_header(&mut self, name: &[u8], external: &[u8]) -> Result<(), WriterError> {
        self.begin_markup()?;
        self.raw(b"<!DOCTYPE ")?;
        self.raw(name)?;
        if !external.is_empty() {
            self.raw(b" ")?;
            self.raw(external)?;
        }
        Ok(())
    }

    /// `<!DOCTYPE name external [`; declarations follow until `end_doctype`
    pub fn start_doctype(&mut self, name: &[u8], external: &[u8]) -> Result<(), WriterError> {
        self.doctype_header(name, external)?;
        self.in_doctype = true;
        self.raw(b" [")
    }

    /// Whitespace or parameter references between declarations
    ///
    /// Copied as is in minimal mode. Indented output drops the whitespace
    /// and puts anything else on its own line.
    pub fn write_subset_text(&mut self, content: &[u8]) -> Result<(), WriterError> {
        if !self.in_doctype {
            return Err(misuse("subset text written outside a DOCTYPE"));
        }
        if self.pretty == PrettyPrint::Minimal {
            return self.raw(content);
        }
        let content = trim(content);
        if content.is_empty() {
            return Ok(());
        }
        self.begin_markup()?;
        self.raw(content)
    }

    pub fn end_doctype(&mut self) -> Result<(), WriterError> {
        if !self.in_doctype {
            return Err(misuse("end_doctype without start_doctype"));
        }
        self.in_doctype = false;
        self.newline(self.open.len())?;
        self.raw(b"]>")
    }

    /// `<!DOCTYPE name external>` without an internal subset
    pub fn write_doctype(&mut self, name: &[u8], external: &[u8]) -> Result<(), WriterError> {
        self.doctype_header(name, external)?;
        self.raw(b">")
    }

    /// `<!KEYWORD content>`, e.g. an ENTITY or ELEMENT declaration
    pub fn write_declaration(&mut self, keyword: &[u8], content: &[u8]) -> Result<(), WriterError> {
        self.begin_markup()?;
        self.raw(b"<!")?;
        self.raw(keyword)?;
        if !content.is_empty() {
            self.raw(b" ")?;
            self.raw(content)?;
        }
        self.raw(b">")
    }

    pub fn flush(&mut self) -> Result<(), WriterError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Serialize everything the cursor visits from its position on
    ///
    /// From the document start this writes the declaration (when the
    /// input had one) and the whole document.
    pub fn write_cursor<T: Tokenizer>(&mut self, cursor: &mut Cursor<T>) -> Result<(), WriterError> {
        if cursor.is_at_start() {
            if cursor.xml_declaration_found() {
                self.raw(b"<?xml ")?;
                self.raw(cursor.content())?;
                self.raw(b"?>")?;
            }
            if !cursor.enter()? {
                return Ok(());
            }
        }
        self.write_siblings(cursor)
    }

    fn write_siblings<T: Tokenizer>(&mut self, cursor: &mut Cursor<T>) -> Result<(), WriterError> {
        loop {
            self.write_node(cursor)?;
            if !cursor.next()? {
                return Ok(());
            }
        }
    }

    fn write_node<T: Tokenizer>(&mut self, cursor: &mut Cursor<T>) -> Result<(), WriterError> {
        let Some(kind) = cursor.kind() else {
            return Ok(());
        };
        trace!(?kind, depth = cursor.depth(), "writing node");
        match kind {
            XmlKind::ElementStart | XmlKind::ElementEmpty => {
                self.start_element(cursor.name())?;
                for attr in cursor.attributes() {
                    let attr = attr?;
                    self.write_attribute(attr.name, &attr.value)?;
                }
                if kind == XmlKind::ElementStart && cursor.enter()? {
                    self.write_siblings(cursor)?;
                    cursor.exit()?;
                }
                self.end_element()?;
            }
            XmlKind::Text if self.in_doctype => self.write_subset_text(cursor.content())?,
            XmlKind::Text => self.write_text(cursor.content())?,
            XmlKind::CData => self.write_cdata(cursor.content())?,
            XmlKind::Comment => self.write_comment(cursor.content())?,
            XmlKind::ProcessingInstruction => self.write_processing_instruction(cursor.name(), cursor.content())?,
            XmlKind::DtdEmpty => self.write_doctype(cursor.name(), cursor.content())?,
            XmlKind::DtdStart => {
                self.start_doctype(cursor.name(), cursor.content())?;
                if cursor.enter()? {
                    self.write_siblings(cursor)?;
                    cursor.exit()?;
                }
                self.end_doctype()?;
            }
            XmlKind::EntityDecl => self.write_declaration(b"ENTITY", cursor.whole_content())?,
            XmlKind::ElementDecl => self.write_declaration(b"ELEMENT", cursor.whole_content())?,
            XmlKind::AttlistDecl => self.write_declaration(b"ATTLIST", cursor.whole_content())?,
            XmlKind::NotationDecl => self.write_declaration(b"NOTATION", cursor.whole_content())?,
            XmlKind::Declaration => self.write_declaration(cursor.whole_content(), &[])?,
            XmlKind::Conditional => {
                self.begin_markup()?;
                self.raw(b"<![")?;
                self.raw(cursor.content())?;
                self.raw(b"]]>")?;
            }
            XmlKind::Document | XmlKind::ElementEnd | XmlKind::DtdEnd => {}
        }
        Ok(())
    }
}
