//! Tree Cursor over a token stream
//!
//! Presents the flat token sequence as a document tree navigated with
//! `enter` / `next` / `exit`. The cursor starts on a synthetic document
//! node whether or not the input has an XML declaration.
//!
//! Entity declarations are registered in the tokenizer's entity table as
//! soon as they become the current token, so later text and attribute
//! values can use them.

use crate::core::attributes::Attributes;
use crate::core::dtd::{parse_entity_decl, EntityDef, ExternalId};
use crate::core::entities::decode_char_refs;
use crate::core::options::Options;
use crate::core::scanner::{is_whitespace, split_leading_name, split_name};
use crate::core::tokenizer::{Parser, Token, Tokenizer, XmlKind};
use crate::error::{lossy, CursorError};
use crate::lexer::{ChunkLexer, ReplayLexer, Restartable, SliceLexer, StreamLexer};
use std::rc::Rc;
use tracing::{debug, warn};

/// Attributes reported for the document node when there is no declaration
const DEFAULT_DECLARATION: &[u8] = b"version=\"1.0\" encoding=\"UTF-8\"";

/// Resolves an external entity to its replacement text
pub type EntityLoader = Rc<dyn Fn(&[u8], &ExternalId<'_>) -> Option<Vec<u8>>>;

/// Tree navigation over any tokenizer
#[derive(Clone)]
pub struct Cursor<T: Tokenizer> {
    tokenizer: T,
    at_start: bool,
    at_end: bool,
    next_failed: bool,
    /// Names of elements entered and not yet closed
    open: Vec<Vec<u8>>,
    declaration_found: bool,
    loader: Option<EntityLoader>,
}

impl<T: Tokenizer> Cursor<T> {
    /// Wrap a tokenizer and position on the document node
    pub fn new(mut tokenizer: T) -> Result<Self, CursorError> {
        tokenizer.fetch()?;
        let first = tokenizer.current().map(|t| t.kind);
        Ok(Cursor {
            tokenizer,
            at_start: true,
            at_end: first.is_none(),
            next_failed: false,
            open: Vec::new(),
            declaration_found: first == Some(XmlKind::Document),
            loader: None,
        })
    }

    /// Resolve external entities through `loader`
    pub fn with_entity_loader<F>(mut self, loader: F) -> Self
    where
        F: Fn(&[u8], &ExternalId<'_>) -> Option<Vec<u8>> + 'static,
    {
        self.loader = Some(Rc::new(loader));
        self
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn options(&self) -> &Options {
        self.tokenizer.options()
    }

    fn strict(&self) -> bool {
        self.tokenizer.options().is_strict()
    }

    /// True while on the synthetic document node
    pub fn is_at_start(&self) -> bool {
        self.at_start
    }

    /// True once every token has been consumed
    pub fn is_at_end(&self) -> bool {
        !self.at_start && self.at_end
    }

    /// Whether the input starts with an XML declaration
    pub fn xml_declaration_found(&self) -> bool {
        self.declaration_found
    }

    /// Number of entered elements not yet closed
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn token(&self) -> Option<Token<'_>> {
        self.tokenizer.current()
    }

    fn token_kind(&self) -> Option<XmlKind> {
        self.token().map(|t| t.kind)
    }

    /// Kind of the current node; `Document` while at the start
    pub fn kind(&self) -> Option<XmlKind> {
        if self.at_start {
            return Some(XmlKind::Document);
        }
        match self.token_kind()? {
            XmlKind::CData if self.options().conflate_cdata => Some(XmlKind::Text),
            kind => Some(kind),
        }
    }

    /// Name of the current node (empty for text-like kinds)
    pub fn name(&self) -> &[u8] {
        if self.at_start {
            return &[];
        }
        match self.token() {
            Some(token) => split_token(token).0,
            None => &[],
        }
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name()).ok()
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&[u8]> {
        split_name(self.name()).0
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &[u8] {
        split_name(self.name()).1
    }

    /// Content after the name for named kinds, the whole content otherwise
    pub fn content(&self) -> &[u8] {
        if self.at_start {
            return self.declaration_body();
        }
        match self.token() {
            Some(token) => split_token(token).1,
            None => &[],
        }
    }

    /// Get the content as a string
    pub fn content_str(&self) -> Option<&str> {
        std::str::from_utf8(self.content()).ok()
    }

    /// Token content including the name
    pub fn whole_content(&self) -> &[u8] {
        if self.at_start && !self.declaration_found {
            return &[];
        }
        match self.token() {
            Some(token) => token.content,
            None => &[],
        }
    }

    /// Lazy attributes of an element, PI or the document node
    pub fn attributes(&self) -> Attributes<'_> {
        let input = if self.at_start {
            if self.declaration_found {
                self.declaration_body()
            } else {
                DEFAULT_DECLARATION
            }
        } else {
            match self.token_kind() {
                Some(XmlKind::ElementStart | XmlKind::ElementEmpty | XmlKind::ProcessingInstruction) => {
                    self.content()
                }
                _ => &[],
            }
        };
        Attributes::new(input, self.tokenizer.entities(), self.strict())
    }

    fn declaration_body(&self) -> &[u8] {
        match self.token() {
            Some(token) if self.declaration_found => split_leading_name(token.content).1,
            _ => &[],
        }
    }

    /// Move into the children of the current node
    ///
    /// Returns false for leaves, and for empty containers; in that case
    /// the cursor is left on the closing token.
    pub fn enter(&mut self) -> Result<bool, CursorError> {
        if self.at_start {
            self.at_start = false;
            if self.declaration_found {
                self.step()?;
            }
            return Ok(self.token().is_some());
        }

        match self.token_kind() {
            Some(XmlKind::ElementStart) => {
                self.open.push(self.name().to_vec());
                self.step()?;
                match self.token_kind() {
                    Some(XmlKind::ElementEnd) => Ok(false),
                    Some(_) => Ok(true),
                    None => {
                        let name = self.open.last().map(|n| lossy(n)).unwrap_or_default();
                        self.unclosed(name)?;
                        Ok(false)
                    }
                }
            }
            Some(XmlKind::DtdStart) => {
                self.step()?;
                match self.token_kind() {
                    Some(XmlKind::DtdEnd) => Ok(false),
                    Some(_) => Ok(true),
                    None => {
                        self.unclosed("DOCTYPE".to_string())?;
                        Ok(false)
                    }
                }
            }
            _ => Ok(false),
        }
    }

    /// Move to the next sibling, skipping the subtree of a container
    ///
    /// Returns false when the next token closes the parent or the input
    /// is exhausted. The result is latched until `exit`.
    pub fn next(&mut self) -> Result<bool, CursorError> {
        if self.at_start || self.next_failed {
            return Ok(false);
        }
        let Some(kind) = self.token_kind() else {
            return Ok(false);
        };

        match kind {
            XmlKind::ElementStart => self.skip_element()?,
            XmlKind::DtdStart => self.skip_dtd()?,
            XmlKind::ElementEnd => {
                self.close_open()?;
                self.step()?;
            }
            _ => self.step()?,
        }

        match self.token_kind() {
            None | Some(XmlKind::ElementEnd | XmlKind::DtdEnd) => {
                self.next_failed = true;
                Ok(false)
            }
            Some(_) => Ok(true),
        }
    }

    /// Skip the remaining siblings; the cursor ends on the parent's close
    pub fn exit(&mut self) -> Result<(), CursorError> {
        if !self.next_failed {
            while self.next()? {}
        }
        self.next_failed = false;
        Ok(())
    }

    /// Advance one token, registering entity declarations
    fn step(&mut self) -> Result<(), CursorError> {
        self.tokenizer.advance()?;
        self.tokenizer.fetch()?;
        match self.token_kind() {
            None => self.at_end = true,
            Some(XmlKind::EntityDecl) => self.register_entity()?,
            Some(_) => {}
        }
        Ok(())
    }

    /// Skip an element and its subtree, checking tag balance
    fn skip_element(&mut self) -> Result<(), CursorError> {
        let mut stack = vec![self.name().to_vec()];
        loop {
            self.step()?;
            match self.token_kind() {
                None => {
                    let name = stack.last().map(|n| lossy(n)).unwrap_or_default();
                    return self.unclosed(name);
                }
                Some(XmlKind::ElementStart) => stack.push(self.name().to_vec()),
                Some(XmlKind::ElementEnd) => {
                    if let Some(expected) = stack.pop() {
                        self.check_match(&expected, self.name())?;
                    }
                    if stack.is_empty() {
                        return self.step();
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Skip a DOCTYPE internal subset, registering its entities
    fn skip_dtd(&mut self) -> Result<(), CursorError> {
        loop {
            self.step()?;
            match self.token_kind() {
                None => return self.unclosed("DOCTYPE".to_string()),
                Some(XmlKind::DtdEnd) => return self.step(),
                Some(_) => {}
            }
        }
    }

    /// Pop the open element closed by the current end tag
    fn close_open(&mut self) -> Result<(), CursorError> {
        let found = self.name().to_vec();
        match self.open.pop() {
            Some(expected) => self.check_match(&expected, &found),
            None if self.strict() => Err(CursorError::UnexpectedEndTag { name: lossy(&found) }),
            None => {
                warn!(name = %String::from_utf8_lossy(&found), "ignoring end tag without start tag");
                Ok(())
            }
        }
    }

    fn check_match(&self, expected: &[u8], found: &[u8]) -> Result<(), CursorError> {
        if expected == found {
            return Ok(());
        }
        if self.strict() {
            return Err(CursorError::TagMismatch {
                expected: lossy(expected),
                found: lossy(found),
            });
        }
        warn!(
            expected = %String::from_utf8_lossy(expected),
            found = %String::from_utf8_lossy(found),
            "end tag does not match start tag"
        );
        Ok(())
    }

    fn unclosed(&self, name: String) -> Result<(), CursorError> {
        if self.strict() {
            return Err(CursorError::UnclosedElement { name });
        }
        warn!(name = %name, "input ended inside an open element");
        Ok(())
    }

    /// Add the current entity declaration to the entity table
    fn register_entity(&mut self) -> Result<(), CursorError> {
        let Some(content) = self.token().map(|t| t.content.to_vec()) else {
            return Ok(());
        };
        let strict = self.strict();

        let decl = match parse_entity_decl(&content) {
            Ok(decl) => decl,
            Err(message) if strict => {
                return Err(CursorError::MalformedDeclaration { message, content: lossy(&content) });
            }
            Err(message) => {
                warn!(content = %String::from_utf8_lossy(&content), message, "skipping malformed entity declaration");
                return Ok(());
            }
        };
        let name = String::from_utf8_lossy(decl.name);

        if decl.parameter {
            debug!(%name, "parameter entity seen, not expanded");
            return Ok(());
        }

        let value = match decl.definition {
            EntityDef::Internal(value) => {
                decode_char_refs(value, strict, self.tokenizer.entities().version())?.into_owned()
            }
            EntityDef::External { ndata: Some(notation), .. } => {
                debug!(%name, notation = %String::from_utf8_lossy(notation), "unparsed entity seen");
                return Ok(());
            }
            EntityDef::External { id, ndata: None } => {
                match self.loader.as_ref().and_then(|load| load(decl.name, &id)) {
                    Some(value) => value,
                    None if strict => return Err(CursorError::UnresolvedEntity { name: name.into_owned() }),
                    None => {
                        debug!(%name, "external entity left unresolved");
                        return Ok(());
                    }
                }
            }
        };

        if self.tokenizer.entities_mut().declare(decl.name, value) {
            debug!(%name, "entity declared");
        } else {
            debug!(%name, "entity already declared, keeping the first definition");
        }
        Ok(())
    }
}

/// Split a token into its name and the content after it
fn split_token(token: Token<'_>) -> (&[u8], &[u8]) {
    let content = token.content;
    match token.kind {
        XmlKind::ElementEnd => (content, content),
        kind if kind.is_markup_decl() => {
            // "% name" declares a parameter entity
            let body = match content {
                [b'%', next, ..] if is_whitespace(*next) => &content[1..],
                _ => content,
            };
            split_leading_name(body)
        }
        kind if kind.is_named() => split_leading_name(content),
        _ => (&[], content),
    }
}

impl<L: Restartable> Cursor<Parser<L>> {
    /// Independent copy at the same position
    pub fn save(&self) -> Self {
        self.clone()
    }
}

impl<'a> Cursor<Parser<SliceLexer<'a>>> {
    /// Strict cursor over a string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Result<Self, CursorError> {
        Self::from_slice(input.as_bytes(), Options::default())
    }

    pub fn from_slice(input: &'a [u8], options: Options) -> Result<Self, CursorError> {
        Cursor::new(Parser::with_options(SliceLexer::new(input), options))
    }
}

impl<I: Iterator<Item = u8>> Cursor<Parser<StreamLexer<I>>> {
    pub fn from_bytes(source: I, options: Options) -> Result<Self, CursorError> {
        Cursor::new(Parser::with_options(StreamLexer::new(source), options))
    }
}

impl<I: Iterator<Item = u8> + Clone> Cursor<Parser<ReplayLexer<I>>> {
    pub fn from_replay(source: I, options: Options) -> Result<Self, CursorError> {
        Cursor::new(Parser::with_options(ReplayLexer::new(source), options))
    }
}

impl<I: Iterator<Item = C>, C: AsRef<[u8]>> Cursor<Parser<ChunkLexer<I, C>>> {
    pub fn from_chunks(chunks: I, options: Options) -> Result<Self, CursorError> {
        Cursor::new(Parser::with_options(ChunkLexer::new(chunks), options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XmlError;
    use pretty_assertions::assert_eq;

    fn attrs<T: Tokenizer>(cursor: &Cursor<T>) -> Vec<(String, String)> {
        cursor
            .attributes()
            .map(|a| {
                let a = a.unwrap();
                (a.name_str().unwrap().to_string(), a.value_str().unwrap().to_string())
            })
            .collect()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_document_scenario() {
        let mut cursor = Cursor::from_str("<?xml encoding=\"utf-8\"?><r><c a=\"1\">t</c></r>").unwrap();
        assert_eq!(cursor.kind(), Some(XmlKind::Document));
        assert!(cursor.xml_declaration_found());
        assert_eq!(attrs(&cursor), vec![pair("encoding", "utf-8")]);

        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::ElementStart));
        assert_eq!(cursor.name(), b"r");

        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.name(), b"c");
        assert_eq!(attrs(&cursor), vec![pair("a", "1")]);

        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::Text));
        assert_eq!(cursor.content(), b"t");

        assert!(!cursor.next().unwrap());
        cursor.exit().unwrap();
        cursor.exit().unwrap();
        assert!(!cursor.next().unwrap());
        assert!(cursor.is_at_end());
        assert_eq!(cursor.kind(), None);
        assert_eq!(cursor.depth(), 0);
    }

    #[test]
    fn test_synthetic_declaration() {
        let cursor = Cursor::from_str("<r/>").unwrap();
        assert!(!cursor.xml_declaration_found());
        assert_eq!(cursor.kind(), Some(XmlKind::Document));
        assert!(cursor.name().is_empty());
        assert_eq!(attrs(&cursor), vec![pair("version", "1.0"), pair("encoding", "UTF-8")]);
    }

    #[test]
    fn test_empty_document() {
        let mut cursor = Cursor::from_str("  ").unwrap();
        assert!(!cursor.enter().unwrap());
        assert!(cursor.is_at_end());

        let mut cursor = Cursor::from_str("<?xml version=\"1.0\"?>").unwrap();
        assert!(!cursor.enter().unwrap());
    }

    #[test]
    fn test_siblings_and_subtree_skip() {
        let mut cursor = Cursor::from_str("<r><a><x/><y>deep</y></a><b/>tail</r>").unwrap();
        cursor.enter().unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.name(), b"a");

        assert!(cursor.next().unwrap());
        assert_eq!(cursor.name(), b"b");
        assert_eq!(cursor.kind(), Some(XmlKind::ElementEmpty));

        assert!(cursor.next().unwrap());
        assert_eq!(cursor.content(), b"tail");

        assert!(!cursor.next().unwrap());
        assert!(!cursor.next().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::ElementEnd));
    }

    #[test]
    fn test_exit_then_next_reaches_sibling() {
        let mut cursor = Cursor::from_str("<r><a><x/><y/></a><b/></r>").unwrap();
        cursor.enter().unwrap();
        cursor.enter().unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.name(), b"x");
        assert!(!cursor.enter().unwrap());
        assert_eq!(cursor.depth(), 2);

        cursor.exit().unwrap();
        assert_eq!(cursor.kind(), Some(XmlKind::ElementEnd));
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.name(), b"b");
        assert_eq!(cursor.depth(), 1);
    }

    #[test]
    fn test_empty_container() {
        let mut cursor = Cursor::from_str("<r><a></a><b/></r>").unwrap();
        cursor.enter().unwrap();
        cursor.enter().unwrap();
        assert!(!cursor.enter().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::ElementEnd));
        assert_eq!(cursor.name(), b"a");

        assert!(cursor.next().unwrap());
        assert_eq!(cursor.name(), b"b");
    }

    #[test]
    fn test_tag_mismatch() {
        let mut cursor = Cursor::from_str("<a><b></c></a>").unwrap();
        cursor.enter().unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(
            cursor.next().unwrap_err(),
            CursorError::TagMismatch { expected: "b".into(), found: "c".into() }
        );

        let mut lenient = Cursor::from_slice(b"<a><b></c></a>", Options::lenient()).unwrap();
        lenient.enter().unwrap();
        lenient.enter().unwrap();
        assert!(!lenient.next().unwrap());
    }

    #[test]
    fn test_unexpected_end_tag() {
        let mut cursor = Cursor::from_str("</a><b/>").unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.next().unwrap_err(), CursorError::UnexpectedEndTag { name: "a".into() });

        let mut lenient = Cursor::from_slice(b"</a><b/>", Options::lenient()).unwrap();
        lenient.enter().unwrap();
        assert!(lenient.next().unwrap());
        assert_eq!(lenient.name(), b"b");
    }

    #[test]
    fn test_unclosed_element() {
        let mut cursor = Cursor::from_str("<a>").unwrap();
        cursor.enter().unwrap();
        assert_eq!(cursor.enter().unwrap_err(), CursorError::UnclosedElement { name: "a".into() });

        let mut cursor = Cursor::from_str("<r><a><b/>").unwrap();
        cursor.enter().unwrap();
        cursor.enter().unwrap();
        assert!(matches!(cursor.next(), Err(CursorError::UnclosedElement { .. })));
    }

    #[test]
    fn test_names_and_prefixes() {
        let mut cursor = Cursor::from_str("<svg:rect width=\"2\"/>").unwrap();
        cursor.enter().unwrap();
        assert_eq!(cursor.name(), b"svg:rect");
        assert_eq!(cursor.prefix(), Some(b"svg" as &[u8]));
        assert_eq!(cursor.local_name(), b"rect");
        assert_eq!(cursor.content(), b"width=\"2\"");
        assert_eq!(cursor.whole_content(), b"svg:rect width=\"2\"");
    }

    #[test]
    fn test_internal_entity_registered() {
        let input = "<!DOCTYPE r [<!ENTITY who \"W&#111;rld\"><!ENTITY who \"ignored\">]><r a=\"&who;\">Hello &who;</r>";
        let mut cursor = Cursor::from_str(input).unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::DtdStart));
        assert_eq!(cursor.name(), b"r");

        assert!(cursor.next().unwrap());
        assert_eq!(attrs(&cursor), vec![pair("a", "World")]);
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.content(), b"Hello World");
    }

    #[test]
    fn test_predefined_entities_in_text_and_attributes() {
        let mut cursor = Cursor::from_str("<r t=\"a &amp; b\">Tom &amp; Jerry &amp;lt;</r>").unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(attrs(&cursor), vec![pair("t", "a & b")]);
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.content(), b"Tom & Jerry &lt;");
    }

    #[test]
    fn test_subset_whitespace_is_text() {
        let mut cursor = Cursor::from_str("<!DOCTYPE r [\n <!ENTITY e \"v\">\n]><r>&e;</r>").unwrap();
        cursor.enter().unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::Text));
        assert_eq!(cursor.content(), b"\n ");
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::EntityDecl));
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::Text));
        assert!(!cursor.next().unwrap());
        cursor.exit().unwrap();
        assert!(cursor.next().unwrap());
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.content(), b"v");
    }

    #[test]
    fn test_entering_dtd() {
        let mut cursor = Cursor::from_str("<!DOCTYPE r [<!ENTITY % pe \"x\"><!ELEMENT r ANY>]><r/>").unwrap();
        cursor.enter().unwrap();
        assert!(cursor.enter().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::EntityDecl));
        assert_eq!(cursor.name(), b"pe");
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.kind(), Some(XmlKind::ElementDecl));
        assert_eq!(cursor.content(), b"ANY");
        assert!(!cursor.next().unwrap());
        cursor.exit().unwrap();
        assert_eq!(cursor.kind(), Some(XmlKind::DtdEnd));
        assert!(cursor.next().unwrap());
        assert_eq!(cursor.name(), b"r");
    }

    #[test]
    fn test_external_entities() {
        let input = "<!DOCTYPE r [<!ENTITY chap SYSTEM \"chap.xml\">]><r>&chap;</r>";

        let mut strict = Cursor::from_str(input).unwrap();
        strict.enter().unwrap();
        assert_eq!(strict.next().unwrap_err(), CursorError::UnresolvedEntity { name: "chap".into() });

        let mut loaded = Cursor::from_str(input)
            .unwrap()
            .with_entity_loader(|name, id| {
                assert_eq!(name, b"chap");
                assert_eq!(id.system_id, b"chap.xml");
                Some(b"Chapter One".to_vec())
            });
        loaded.enter().unwrap();
        loaded.next().unwrap();
        loaded.enter().unwrap();
        assert_eq!(loaded.content(), b"Chapter One");

        let mut lenient = Cursor::from_slice(input.as_bytes(), Options::lenient()).unwrap();
        lenient.enter().unwrap();
        lenient.next().unwrap();
        lenient.enter().unwrap();
        assert_eq!(lenient.content(), b"&chap;");
    }

    #[test]
    fn test_malformed_entity_declaration() {
        let input = "<!DOCTYPE r [<!ENTITY bad>]><r/>";
        let mut strict = Cursor::from_str(input).unwrap();
        strict.enter().unwrap();
        assert!(matches!(strict.next(), Err(CursorError::MalformedDeclaration { .. })));

        let mut lenient = Cursor::from_slice(input.as_bytes(), Options::lenient()).unwrap();
        lenient.enter().unwrap();
        assert!(lenient.next().unwrap());
    }

    #[test]
    fn test_char_ref_error_in_entity_value() {
        let mut cursor = Cursor::from_str("<!DOCTYPE r [<!ENTITY e \"&#xFFFFFF;\">]><r/>").unwrap();
        cursor.enter().unwrap();
        assert!(matches!(cursor.next(), Err(CursorError::Xml(XmlError::InvalidCharRef { .. }))));
    }

    #[test]
    fn test_conflate_cdata() {
        let input = b"<a><![CDATA[x<y]]></a>";
        let mut plain = Cursor::from_slice(input, Options::default()).unwrap();
        plain.enter().unwrap();
        plain.enter().unwrap();
        assert_eq!(plain.kind(), Some(XmlKind::CData));

        let mut conflated = Cursor::from_slice(input, Options::default().conflate_cdata(true)).unwrap();
        conflated.enter().unwrap();
        conflated.enter().unwrap();
        assert_eq!(conflated.kind(), Some(XmlKind::Text));
        assert_eq!(conflated.content(), b"x<y");
    }

    #[test]
    fn test_processing_instruction_accessors() {
        let mut cursor = Cursor::from_str("<?target key=\"v\"?><r/>").unwrap();
        assert!(!cursor.xml_declaration_found());
        cursor.enter().unwrap();
        assert_eq!(cursor.kind(), Some(XmlKind::ProcessingInstruction));
        assert_eq!(cursor.name(), b"target");
        assert_eq!(attrs(&cursor), vec![pair("key", "v")]);
    }

    #[test]
    fn test_save_point() {
        let mut cursor = Cursor::from_str("<r><a/><b/></r>").unwrap();
        cursor.enter().unwrap();
        cursor.enter().unwrap();
        let mut saved = cursor.save();

        cursor.next().unwrap();
        assert_eq!(cursor.name(), b"b");
        assert_eq!(saved.name(), b"a");
        saved.exit().unwrap();
        assert_eq!(saved.kind(), Some(XmlKind::ElementEnd));
        assert_eq!(cursor.name(), b"b");
    }

    #[test]
    fn test_lenient_attributes_flag() {
        let mut cursor = Cursor::from_slice(b"<a x=1/>", Options::lenient()).unwrap();
        cursor.enter().unwrap();
        let mut attributes = cursor.attributes();
        assert!(attributes.next().is_none());
        assert!(attributes.has_error());
    }

    #[test]
    fn test_stream_and_chunk_cursors() {
        let input = "<r><c a=\"1\">t</c></r>";
        let mut stream = Cursor::from_bytes(input.bytes(), Options::default()).unwrap();
        let mut chunks = Cursor::from_chunks(input.as_bytes().chunks(3), Options::default()).unwrap();
        let mut replay = Cursor::from_replay(input.bytes(), Options::default()).unwrap();
        for _ in 0..3 {
            assert!(stream.enter().unwrap());
            assert!(chunks.enter().unwrap());
            assert!(replay.enter().unwrap());
        }
        assert_eq!(stream.content(), b"t");
        assert_eq!(chunks.content(), b"t");
        assert_eq!(replay.content(), b"t");
    }
}
