//! XML Tokenizer - classifies lexer spans into tokens
//!
//! Implements a pull-parser over any `Lexer`. Each `fetch` skips leading
//! whitespace, marks the lexer and scans exactly one token:
//! - Element start/end/empty tags
//! - Text content (entity references expanded)
//! - CDATA sections and conditional sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE and the markup declarations of its internal subset
//!
//! The token content borrows the lexer span and excludes the delimiters
//! that identify its kind.

use super::entities::{validate_chars, EntityTable};
use super::options::Options;
use super::scanner::{is_name_start_char, is_valid_name, split_leading_name, trim, trim_end, trim_start, WHITESPACE};
use crate::error::{LexingError, ParsingError};
use crate::lexer::{Lexer, Restartable};
use memchr::memmem;
use std::borrow::Cow;
use tracing::{trace, warn};

/// Quote-respecting terminator sets: the quotes come first
const QUOTED_TAG_END: &[u8] = b"\"'>";
const QUOTED_DOCTYPE_END: &[u8] = b"\"'[>";

/// Bytes that end a `<!KEYWORD`
const KEYWORD_END: &[u8] = b" \t\r\n>[";

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XmlKind {
    /// XML declaration: <?xml ...?>
    Document,
    /// Element start tag: <element>
    ElementStart,
    /// Element end tag: </element>
    ElementEnd,
    /// Empty element: <element/>
    ElementEmpty,
    /// Character data between markup
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// <!DOCTYPE name [
    DtdStart,
    /// <!DOCTYPE name> without internal subset
    DtdEmpty,
    /// ]> closing the internal subset
    DtdEnd,
    /// Any other <!...> markup
    Declaration,
    AttlistDecl,
    ElementDecl,
    EntityDecl,
    NotationDecl,
    /// <![INCLUDE[...]]> or <![IGNORE[...]]>
    Conditional,
}

impl XmlKind {
    /// Kinds whose content starts with a name
    pub fn is_named(self) -> bool {
        matches!(
            self,
            XmlKind::ElementStart
                | XmlKind::ElementEmpty
                | XmlKind::ProcessingInstruction
                | XmlKind::DtdStart
                | XmlKind::DtdEmpty
                | XmlKind::AttlistDecl
                | XmlKind::ElementDecl
                | XmlKind::EntityDecl
                | XmlKind::NotationDecl
                | XmlKind::Declaration
        )
    }

    /// Markup declarations of the DTD internal subset
    pub fn is_markup_decl(self) -> bool {
        matches!(
            self,
            XmlKind::AttlistDecl | XmlKind::ElementDecl | XmlKind::EntityDecl | XmlKind::NotationDecl
        )
    }
}

/// A token borrowed from the tokenizer until the next advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub content: &'a [u8],
    pub kind: XmlKind,
}

impl<'a> Token<'a> {
    /// Get the content as a string
    pub fn content_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.content).ok()
    }

    /// Copy into a token that outlives the tokenizer position
    #[allow(clippy::should_implement_trait)]
    pub fn to_owned(&self) -> OwnedToken {
        OwnedToken {
            content: self.content.to_vec(),
            kind: self.kind,
        }
    }
}

/// Owned copy of a `Token`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub content: Vec<u8>,
    pub kind: XmlKind,
}

impl OwnedToken {
    pub fn as_token(&self) -> Token<'_> {
        Token {
            content: &self.content,
            kind: self.kind,
        }
    }
}

/// Pull interface between the tokenizer and the cursor
pub trait Tokenizer {
    /// Scan the current token unless it is already scanned
    fn fetch(&mut self) -> Result<(), ParsingError>;

    /// The current token, if fetched and present
    fn current(&self) -> Option<Token<'_>>;

    /// Drop the current token; the next `fetch` scans the following one
    fn advance(&mut self) -> Result<(), ParsingError>;

    fn entities(&self) -> &EntityTable;

    fn entities_mut(&mut self) -> &mut EntityTable;

    fn options(&self) -> &Options;

    /// Offset where the current token starts
    fn position(&self) -> usize;

    /// `fetch` then `current`
    fn peek_token(&mut self) -> Result<Option<Token<'_>>, ParsingError> {
        self.fetch()?;
        Ok(self.current())
    }

    /// True iff there are no more tokens
    fn is_empty(&mut self) -> Result<bool, ParsingError> {
        self.fetch()?;
        Ok(self.current().is_none())
    }
}

/// Where the current token lives inside the lexer span
#[derive(Debug, Clone)]
struct Scanned {
    kind: XmlKind,
    head: usize,
    tail: usize,
    /// Text with entity references expanded
    decoded: Option<Vec<u8>>,
}

/// XML tokenizer over any lexer
#[derive(Debug, Clone)]
pub struct Parser<L: Lexer> {
    lexer: L,
    options: Options,
    entities: EntityTable,
    current: Option<Scanned>,
    ready: bool,
    in_dtd: bool,
    first: bool,
    start: usize,
}

impl<L: Lexer> Parser<L> {
    /// Create a strict tokenizer
    pub fn new(lexer: L) -> Self {
        Self::with_options(lexer, Options::default())
    }

    pub fn with_options(lexer: L, options: Options) -> Self {
        Parser {
            lexer,
            options,
            entities: EntityTable::with_version(options.xml_version),
            current: None,
            ready: false,
            in_dtd: false,
            first: true,
            start: 0,
        }
    }

    /// Restart on a new input; declared entities are forgotten
    pub fn set_source(&mut self, source: L::Source) {
        self.lexer.set_source(source);
        self.entities = EntityTable::with_version(self.options.xml_version);
        self.current = None;
        self.ready = false;
        self.in_dtd = false;
        self.first = true;
        self.start = 0;
    }

    /// True between DtdStart and DtdEnd
    pub fn in_dtd(&self) -> bool {
        self.in_dtd
    }

    fn scan(&mut self) -> Result<Option<Scanned>, ParsingError> {
        // Inside the internal subset whitespace is reported as text
        if !self.in_dtd && !self.options.preserve_whitespace {
            self.lexer.drop_while(WHITESPACE);
        }
        if self.lexer.is_empty() {
            return Ok(None);
        }
        self.lexer.mark_start();
        self.start = self.lexer.position();

        let token = if self.in_dtd && self.lexer.test_and_advance(b']')? {
            self.parse_dtd_end()?
        } else if self.lexer.test_and_advance(b'<')? {
            self.parse_markup()?
        } else {
            self.parse_text()?
        };

        self.first = false;
        trace!(kind = ?token.kind, position = self.start, "token");
        Ok(Some(token))
    }

    fn eof(&self) -> ParsingError {
        LexingError::UnexpectedEof { position: self.lexer.position() }.into()
    }

    fn malformed(&self, message: &'static str) -> ParsingError {
        ParsingError::Malformed { message, position: self.start }
    }

    /// Consume `c` if it is next; false at end of input
    fn eat(&mut self, c: u8) -> Result<bool, ParsingError> {
        Ok(!self.lexer.is_empty() && self.lexer.test_and_advance(c)?)
    }

    /// Consume through the next `c`
    fn scan_to(&mut self, c: u8) -> Result<(), ParsingError> {
        if self.lexer.advance_until(c, true)? {
            Ok(())
        } else {
            Err(self.eof())
        }
    }

    /// Consume through the next terminator outside quotes
    ///
    /// `set` starts with the two quote characters; the returned index is
    /// relative to the terminators after them.
    fn scan_quoted(&mut self, set: &[u8]) -> Result<usize, ParsingError> {
        loop {
            match self.lexer.advance_until_any(set, true)? {
                None => return Err(self.eof()),
                Some(i) if i < 2 => {
                    let position = self.lexer.position() - 1;
                    if self.lexer.is_empty() || !self.lexer.advance_until(set[i], true)? {
                        return Err(LexingError::UnterminatedQuote { position }.into());
                    }
                }
                Some(i) => return Ok(i - 2),
            }
        }
    }

    /// Token over span[head..len - tail]
    fn scanned(&self, kind: XmlKind, head: usize, tail: usize) -> Scanned {
        Scanned { kind, head, tail, decoded: None }
    }

    /// Like `scanned`, with whitespace around the content stripped
    fn trimmed(&self, kind: XmlKind, head: usize, tail: usize) -> Scanned {
        let span = self.lexer.get_span();
        let inner = span.get(head..span.len().saturating_sub(tail)).unwrap_or_default();
        let lead = inner.len() - trim_start(inner).len();
        let trail = inner.len() - trim_end(inner).len();
        if lead == inner.len() {
            return self.scanned(kind, head + inner.len(), tail);
        }
        self.scanned(kind, head + lead, tail + trail)
    }

    /// Character data up to the next '<' (or ']' inside the DTD)
    fn parse_text(&mut self) -> Result<Scanned, ParsingError> {
        let terminators: &[u8] = if self.in_dtd { b"<]" } else { b"<" };
        self.lexer.advance_until_any(terminators, false)?;

        let span = self.lexer.get_span();
        let strict = self.options.is_strict();
        if strict && memmem::find(span, b"]]>").is_some() {
            return Err(self.malformed("']]>' is not allowed in text"));
        }
        if self.options.check_chars {
            validate_chars(span, self.options.xml_version, self.start)?;
        }
        let decoded = match self.entities.unescape(span, strict)? {
            Cow::Borrowed(_) => None,
            Cow::Owned(expanded) => Some(expanded),
        };
        Ok(Scanned { kind: XmlKind::Text, head: 0, tail: 0, decoded })
    }

    /// Markup after '<'
    fn parse_markup(&mut self) -> Result<Scanned, ParsingError> {
        if self.lexer.test_and_advance(b'/')? {
            self.parse_end_tag()
        } else if self.lexer.test_and_advance(b'?')? {
            self.parse_pi()
        } else if self.lexer.test_and_advance(b'!')? {
            self.parse_bang_markup()
        } else {
            self.parse_start_tag()
        }
    }

    fn parse_start_tag(&mut self) -> Result<Scanned, ParsingError> {
        self.scan_quoted(QUOTED_TAG_END)?;
        let span = self.lexer.get_span();
        if self.options.is_strict() && !span.get(1).is_some_and(|&b| is_name_start_char(b)) {
            return Err(self.malformed("element name must start with a letter, '_' or ':'"));
        }
        let empty = span.len() >= 3 && span[span.len() - 2] == b'/';
        Ok(if empty {
            self.scanned(XmlKind::ElementEmpty, 1, 2)
        } else {
            self.scanned(XmlKind::ElementStart, 1, 1)
        })
    }

    fn parse_end_tag(&mut self) -> Result<Scanned, ParsingError> {
        self.scan_to(b'>')?;
        let token = self.trimmed(XmlKind::ElementEnd, 2, 1);
        if self.options.is_strict() {
            let span = self.lexer.get_span();
            if !is_valid_name(&span[token.head..span.len() - token.tail]) {
                return Err(self.malformed("end tag must contain only a valid name"));
            }
        }
        Ok(token)
    }

    /// Processing instruction; `<?xml` as the first token is the declaration
    fn parse_pi(&mut self) -> Result<Scanned, ParsingError> {
        loop {
            self.scan_to(b'?')?;
            while self.eat(b'?')? {}
            if self.eat(b'>')? {
                break;
            }
        }

        let span = self.lexer.get_span();
        let (target, _) = split_leading_name(&span[2..span.len() - 2]);
        if target != b"xml" {
            return Ok(self.scanned(XmlKind::ProcessingInstruction, 2, 2));
        }
        if self.first {
            return Ok(self.scanned(XmlKind::Document, 2, 2));
        }
        if self.options.is_strict() {
            return Err(self.malformed("XML declaration is only allowed at the start of the document"));
        }
        warn!(position = self.start, "misplaced XML declaration read as a processing instruction");
        Ok(self.scanned(XmlKind::ProcessingInstruction, 2, 2))
    }

    /// Markup after "<!"
    fn parse_bang_markup(&mut self) -> Result<Scanned, ParsingError> {
        if self.eat(b'-')? {
            if self.eat(b'-')? {
                return self.parse_comment();
            }
            self.scan_quoted(QUOTED_TAG_END)?;
            return Ok(self.trimmed(XmlKind::Declaration, 2, 1));
        }
        if self.eat(b'[')? {
            return self.parse_cdata_or_conditional();
        }

        if self.lexer.advance_until_any(KEYWORD_END, false)?.is_none() {
            return Err(self.eof());
        }
        let keyword_end = self.lexer.get_span().len();
        let kind = match &self.lexer.get_span()[2..] {
            b"DOCTYPE" => None,
            b"ELEMENT" if self.in_dtd => Some(XmlKind::ElementDecl),
            b"ATTLIST" if self.in_dtd => Some(XmlKind::AttlistDecl),
            b"ENTITY" if self.in_dtd => Some(XmlKind::EntityDecl),
            b"NOTATION" if self.in_dtd => Some(XmlKind::NotationDecl),
            _ => Some(XmlKind::Declaration),
        };

        match kind {
            None => {
                if self.scan_quoted(QUOTED_DOCTYPE_END)? == 0 {
                    self.in_dtd = true;
                    Ok(self.trimmed(XmlKind::DtdStart, keyword_end, 1))
                } else {
                    Ok(self.trimmed(XmlKind::DtdEmpty, keyword_end, 1))
                }
            }
            Some(XmlKind::Declaration) => {
                self.scan_quoted(QUOTED_TAG_END)?;
                Ok(self.trimmed(XmlKind::Declaration, 2, 1))
            }
            Some(decl) => {
                self.scan_quoted(QUOTED_TAG_END)?;
                Ok(self.trimmed(decl, keyword_end, 1))
            }
        }
    }

    fn parse_comment(&mut self) -> Result<Scanned, ParsingError> {
        let strict = self.options.is_strict();
        loop {
            self.scan_to(b'-')?;
            let mut dashes = 1;
            while self.eat(b'-')? {
                dashes += 1;
            }
            if dashes < 2 {
                continue;
            }
            if self.eat(b'>')? {
                if strict && dashes > 2 {
                    return Err(self.malformed("comment must not end with '-'"));
                }
                break;
            }
            if strict {
                return Err(self.malformed("'--' is not allowed inside a comment"));
            }
        }
        Ok(self.scanned(XmlKind::Comment, 4, 3))
    }

    /// Markup after "<!["
    fn parse_cdata_or_conditional(&mut self) -> Result<Scanned, ParsingError> {
        for &b in b"CDATA[" {
            if !self.eat(b)? {
                return self.parse_conditional();
            }
        }
        loop {
            self.scan_to(b']')?;
            let mut brackets = 1;
            while self.eat(b']')? {
                brackets += 1;
            }
            if brackets >= 2 && self.eat(b'>')? {
                break;
            }
        }
        Ok(self.scanned(XmlKind::CData, 9, 3))
    }

    /// Conditional section, balancing nested `<![` and `]]>`
    fn parse_conditional(&mut self) -> Result<Scanned, ParsingError> {
        let mut depth = 1usize;
        loop {
            match self.lexer.advance_until_any(b"<]", true)? {
                None => return Err(self.eof()),
                Some(0) => {
                    if self.eat(b'!')? && self.eat(b'[')? {
                        depth += 1;
                    }
                }
                Some(_) => {
                    if !self.eat(b']')? {
                        continue;
                    }
                    while self.eat(b']')? {}
                    if self.eat(b'>')? {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                }
            }
        }
        Ok(self.scanned(XmlKind::Conditional, 3, 3))
    }

    /// "]" ... ">" closing the internal subset
    fn parse_dtd_end(&mut self) -> Result<Scanned, ParsingError> {
        self.scan_to(b'>')?;
        let span = self.lexer.get_span();
        if self.options.is_strict() && !trim(&span[1..span.len() - 1]).is_empty() {
            return Err(self.malformed("only whitespace may follow ']' in a DOCTYPE"));
        }
        self.in_dtd = false;
        Ok(self.scanned(XmlKind::DtdEnd, span.len(), 0))
    }
}

impl<L: Restartable> Parser<L> {
    /// Independent copy at the same position
    pub fn save(&self) -> Self {
        self.clone()
    }
}

impl<L: Lexer> Tokenizer for Parser<L> {
    fn fetch(&mut self) -> Result<(), ParsingError> {
        if self.ready {
            return Ok(());
        }
        self.ready = true;
        self.current = None;
        self.current = self.scan()?;
        Ok(())
    }

    fn current(&self) -> Option<Token<'_>> {
        let scanned = self.current.as_ref()?;
        let content = match &scanned.decoded {
            Some(decoded) => decoded.as_slice(),
            None => {
                let span = self.lexer.get_span();
                span.get(scanned.head..span.len().saturating_sub(scanned.tail))
                    .unwrap_or_default()
            }
        };
        Some(Token {
            content,
            kind: scanned.kind,
        })
    }

    fn advance(&mut self) -> Result<(), ParsingError> {
        self.fetch()?;
        self.ready = false;
        self.current = None;
        Ok(())
    }

    fn entities(&self) -> &EntityTable {
        &self.entities
    }

    fn entities_mut(&mut self) -> &mut EntityTable {
        &mut self.entities
    }

    fn options(&self) -> &Options {
        &self.options
    }

    fn position(&self) -> usize {
        self.start
    }
}

impl<L: Lexer> Iterator for Parser<L> {
    type Item = Result<OwnedToken, ParsingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(err) = self.fetch() {
            return Some(Err(err));
        }
        let token = self.current()?.to_owned();
        self.ready = false;
        self.current = None;
        Some(Ok(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::options::XmlVersion;
    use crate::error::XmlError;
    use crate::lexer::{ChunkLexer, SliceLexer, StreamLexer};
    use pretty_assertions::assert_eq;

    fn tokens_with(input: &str, options: Options) -> Result<Vec<(XmlKind, String)>, ParsingError> {
        Parser::with_options(SliceLexer::new(input.as_bytes()), options)
            .map(|token| token.map(|t| (t.kind, String::from_utf8_lossy(&t.content).into_owned())))
            .collect()
    }

    fn tokens(input: &str) -> Vec<(XmlKind, String)> {
        tokens_with(input, Options::default()).unwrap()
    }

    fn kinds(input: &str) -> Vec<XmlKind> {
        tokens(input).into_iter().map(|(kind, _)| kind).collect()
    }

    fn tok(kind: XmlKind, content: &str) -> (XmlKind, String) {
        (kind, content.to_string())
    }

    #[test]
    fn test_simple_element() {
        assert_eq!(
            tokens("<root>hello</root>"),
            vec![
                tok(XmlKind::ElementStart, "root"),
                tok(XmlKind::Text, "hello"),
                tok(XmlKind::ElementEnd, "root"),
            ]
        );
    }

    #[test]
    fn test_mixed_markup() {
        let input = r#"<?xml version="1.0"?><!-- c --><r a="x>y"><![CDATA[<raw>]]><?pi data?><e/></r >"#;
        assert_eq!(
            tokens(input),
            vec![
                tok(XmlKind::Document, r#"xml version="1.0""#),
                tok(XmlKind::Comment, " c "),
                tok(XmlKind::ElementStart, r#"r a="x>y""#),
                tok(XmlKind::CData, "<raw>"),
                tok(XmlKind::ProcessingInstruction, "pi data"),
                tok(XmlKind::ElementEmpty, "e"),
                tok(XmlKind::ElementEnd, "r"),
            ]
        );
    }

    #[test]
    fn test_doctype_internal_subset() {
        let input = "<!DOCTYPE note [\n  <!ENTITY who \"World\">\n  <!ELEMENT note (#PCDATA)>\n  <!ATTLIST note id ID #IMPLIED>\n  <!NOTATION gif SYSTEM \"viewer\">\n]>\n<note>Hi</note>";
        assert_eq!(
            tokens(input),
            vec![
                tok(XmlKind::DtdStart, "note"),
                tok(XmlKind::Text, "\n  "),
                tok(XmlKind::EntityDecl, "who \"World\""),
                tok(XmlKind::Text, "\n  "),
                tok(XmlKind::ElementDecl, "note (#PCDATA)"),
                tok(XmlKind::Text, "\n  "),
                tok(XmlKind::AttlistDecl, "note id ID #IMPLIED"),
                tok(XmlKind::Text, "\n  "),
                tok(XmlKind::NotationDecl, "gif SYSTEM \"viewer\""),
                tok(XmlKind::Text, "\n"),
                tok(XmlKind::DtdEnd, ""),
                tok(XmlKind::ElementStart, "note"),
                tok(XmlKind::Text, "Hi"),
                tok(XmlKind::ElementEnd, "note"),
            ]
        );
    }

    #[test]
    fn test_subset_whitespace_kept_in_every_mode() {
        let input = "<!DOCTYPE r [\n  <!ELEMENT r ANY>\n]> <r/>";
        let expected = vec![
            XmlKind::DtdStart,
            XmlKind::Text,
            XmlKind::ElementDecl,
            XmlKind::Text,
            XmlKind::DtdEnd,
            XmlKind::ElementEmpty,
        ];
        assert_eq!(kinds(input), expected);

        let preserved = tokens_with(input, Options::default().preserve_whitespace(true)).unwrap();
        let mut with_gap = expected.clone();
        with_gap.insert(5, XmlKind::Text);
        assert_eq!(preserved.iter().map(|(kind, _)| *kind).collect::<Vec<_>>(), with_gap);
        assert_eq!(preserved[5], tok(XmlKind::Text, " "));
    }

    #[test]
    fn test_doctype_without_subset() {
        assert_eq!(
            tokens("<!DOCTYPE html SYSTEM \"about:legacy[compat]\"><html/>"),
            vec![
                tok(XmlKind::DtdEmpty, "html SYSTEM \"about:legacy[compat]\""),
                tok(XmlKind::ElementEmpty, "html"),
            ]
        );
    }

    #[test]
    fn test_decl_keywords_outside_dtd_are_generic() {
        assert_eq!(kinds("<!ENTITY x \"y\"><a/>"), vec![XmlKind::Declaration, XmlKind::ElementEmpty]);
    }

    #[test]
    fn test_conditional_nesting() {
        let input = "<!DOCTYPE d [<![INCLUDE[<![IGNORE[<!ELEMENT x ANY>]]>]]>]><d/>";
        assert_eq!(
            tokens(input),
            vec![
                tok(XmlKind::DtdStart, "d"),
                tok(XmlKind::Conditional, "INCLUDE[<![IGNORE[<!ELEMENT x ANY>]]>"),
                tok(XmlKind::DtdEnd, ""),
                tok(XmlKind::ElementEmpty, "d"),
            ]
        );
    }

    #[test]
    fn test_text_entities_expanded() {
        assert_eq!(
            tokens("<a>1 &lt; 2 &amp;&#x41;</a>")[1],
            tok(XmlKind::Text, "1 < 2 &A")
        );
    }

    #[test]
    fn test_whitespace_handling() {
        assert_eq!(
            tokens("<a>\n  x  <b/>\n</a>"),
            vec![
                tok(XmlKind::ElementStart, "a"),
                tok(XmlKind::Text, "x  "),
                tok(XmlKind::ElementEmpty, "b"),
                tok(XmlKind::ElementEnd, "a"),
            ]
        );

        let kept = tokens_with("<a> x </a>", Options::default().preserve_whitespace(true)).unwrap();
        assert_eq!(kept[1], tok(XmlKind::Text, " x "));
    }

    #[test]
    fn test_comment_rules() {
        assert!(matches!(
            tokens_with("<!-- a -- b -->", Options::strict()),
            Err(ParsingError::Malformed { .. })
        ));
        assert!(matches!(
            tokens_with("<!-- a --->", Options::strict()),
            Err(ParsingError::Malformed { .. })
        ));
        assert_eq!(
            tokens_with("<!-- a -- b -->", Options::lenient()).unwrap(),
            vec![tok(XmlKind::Comment, " a -- b ")]
        );
        assert_eq!(tokens("<!---->"), vec![tok(XmlKind::Comment, "")]);
    }

    #[test]
    fn test_late_xml_declaration() {
        assert!(matches!(
            tokens_with("<a/><?xml version=\"1.0\"?>", Options::strict()),
            Err(ParsingError::Malformed { .. })
        ));
        assert_eq!(
            tokens_with("<a/><?xml version=\"1.0\"?>", Options::lenient()).unwrap()[1].0,
            XmlKind::ProcessingInstruction
        );
        assert_eq!(kinds("<?xml-stylesheet href=\"a\"?>"), vec![XmlKind::ProcessingInstruction]);
    }

    #[test]
    fn test_missing_terminators() {
        for input in ["<a", "<!-- open", "<![CDATA[x]]", "<?pi", "<!DOCTYPE", "</a", "<"] {
            let err = tokens_with(input, Options::lenient()).unwrap_err();
            assert!(
                matches!(err, ParsingError::Lexing(LexingError::UnexpectedEof { .. })),
                "{input}: {err:?}"
            );
        }
    }

    #[test]
    fn test_unterminated_quote() {
        let err = tokens_with("<a b=\"x>", Options::lenient()).unwrap_err();
        assert_eq!(err, ParsingError::Lexing(LexingError::UnterminatedQuote { position: 5 }));
    }

    #[test]
    fn test_strict_element_name() {
        assert!(matches!(
            tokens_with("<1a/>", Options::strict()),
            Err(ParsingError::Malformed { position: 0, .. })
        ));
        assert_eq!(kinds("<_a/>"), vec![XmlKind::ElementEmpty]);
    }

    #[test]
    fn test_check_chars() {
        let options = Options::default().check_chars(true);
        let err = tokens_with("<a>bell\u{7}</a>", options).unwrap_err();
        assert_eq!(err, ParsingError::Xml(XmlError::IllegalChar { codepoint: 7, position: 7 }));

        let v11 = options.xml_version(XmlVersion::V1_1);
        assert!(tokens_with("<a>bell\u{7}</a>", v11).is_ok());
    }

    #[test]
    fn test_char_refs_checked_against_version() {
        let options = Options::default().check_chars(true);
        assert!(matches!(
            tokens_with("<a>&#1;</a>", options),
            Err(ParsingError::Xml(XmlError::InvalidCharRef { .. }))
        ));
        let v11 = tokens_with("<a>&#1;</a>", options.xml_version(XmlVersion::V1_1)).unwrap();
        assert_eq!(v11[1], tok(XmlKind::Text, "\u{1}"));
    }

    #[test]
    fn test_unknown_entity_strict_and_lenient() {
        assert!(matches!(
            tokens_with("<a>&nope;</a>", Options::strict()),
            Err(ParsingError::Xml(XmlError::UnknownEntity { .. }))
        ));
        assert_eq!(
            tokens_with("<a>&nope;</a>", Options::lenient()).unwrap()[1],
            tok(XmlKind::Text, "&nope;")
        );
    }

    #[test]
    fn test_peek_is_idempotent_until_advance() {
        let mut parser = Parser::new(SliceLexer::new(b"<a/>text"));
        let first = parser.peek_token().unwrap().map(|t| t.to_owned());
        let again = parser.peek_token().unwrap().map(|t| t.to_owned());
        assert_eq!(first, again);
        assert_eq!(parser.position(), 0);

        parser.advance().unwrap();
        assert_eq!(parser.peek_token().unwrap().map(|t| t.kind), Some(XmlKind::Text));
        assert_eq!(parser.position(), 4);
        parser.advance().unwrap();
        assert!(parser.is_empty().unwrap());
    }

    #[test]
    fn test_declared_entity_used_in_text() {
        let mut parser = Parser::new(StreamLexer::new("<a>&who;</a>".bytes()));
        parser.entities_mut().declare(b"who", b"World".to_vec());
        let texts: Vec<_> = parser
            .filter_map(Result::ok)
            .filter(|t| t.kind == XmlKind::Text)
            .map(|t| t.content)
            .collect();
        assert_eq!(texts, vec![b"World".to_vec()]);
    }

    #[test]
    fn test_chunked_input_matches_slice() {
        let input = "<r><!-- x --><c a='1'>t&amp;u</c><![CDATA[d]]></r>";
        let expected: Vec<_> = Parser::new(SliceLexer::new(input.as_bytes())).collect();
        for size in [1, 2, 5] {
            let chunked: Vec<_> = Parser::new(ChunkLexer::new(input.as_bytes().chunks(size))).collect();
            assert_eq!(chunked, expected, "chunk size {size}");
        }
    }

    #[test]
    fn test_save_resumes_independently() {
        let mut parser = Parser::new(SliceLexer::new(b"<a><b/></a>"));
        parser.advance().unwrap();
        let mut saved = parser.save();
        let rest: Vec<_> = parser.by_ref().map(|t| t.unwrap().kind).collect();
        assert_eq!(rest, vec![XmlKind::ElementEmpty, XmlKind::ElementEnd]);
        assert_eq!(saved.peek_token().unwrap().map(|t| t.kind), Some(XmlKind::ElementEmpty));
    }
}
