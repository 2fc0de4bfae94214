//! Error types for every layer of the pipeline
//!
//! Each layer has its own enum and wraps the layer below it:
//! `LexingError` -> `ParsingError` -> `CursorError`. `XmlError` covers
//! character and entity validity and can surface from the tokenizer (text)
//! or the cursor (attribute values).

use std::fmt;
use thiserror::Error;

/// The character source ran out in the middle of a scan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexingError {
    #[error("unexpected end of input at offset {position}")]
    UnexpectedEof { position: usize },
    #[error("unterminated quoted value at offset {position}")]
    UnterminatedQuote { position: usize },
}

/// Why a numeric character reference could not be decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharRefFault {
    /// `&#;` or `&#x;`
    Empty,
    /// A digit outside the radix of the reference
    InvalidDigit,
    /// Above U+10FFFF, a surrogate, or not an XML `Char`
    OutOfRange,
    /// More digits than any valid code point needs
    TooLong,
}

impl fmt::Display for CharRefFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            CharRefFault::Empty => "no digits",
            CharRefFault::InvalidDigit => "invalid digit",
            CharRefFault::OutOfRange => "code point out of range",
            CharRefFault::TooLong => "reference too long",
        };
        f.write_str(text)
    }
}

/// Text or entity validity errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    #[error("illegal XML character U+{codepoint:04X} at offset {position}")]
    IllegalChar { codepoint: u32, position: usize },
    #[error("invalid UTF-8 at offset {position}")]
    InvalidUtf8 { position: usize },
    #[error("entity reference `{reference}` is missing its ';'")]
    MissingSemicolon { reference: String },
    #[error("unknown entity `&{name};`")]
    UnknownEntity { name: String },
    #[error("invalid character reference `{reference}`: {fault}")]
    InvalidCharRef { reference: String, fault: CharRefFault },
    #[error("entity `{name}` references itself")]
    RecursiveEntity { name: String },
}

/// Token-level errors raised by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParsingError {
    #[error(transparent)]
    Lexing(#[from] LexingError),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("malformed document at offset {position}: {message}")]
    Malformed { message: &'static str, position: usize },
}

/// Structural errors raised while navigating with the cursor
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error("end tag `</{found}>` does not match start tag `<{expected}>`")]
    TagMismatch { expected: String, found: String },
    #[error("end tag `</{name}>` has no matching start tag")]
    UnexpectedEndTag { name: String },
    #[error("input ended inside element `<{name}>`")]
    UnclosedElement { name: String },
    #[error("malformed attribute in `{content}`: {message}")]
    MalformedAttribute { message: &'static str, content: String },
    #[error("invalid attribute name `{name}`")]
    InvalidAttributeName { name: String },
    #[error("malformed declaration `{content}`: {message}")]
    MalformedDeclaration { message: &'static str, content: String },
    #[error("external entity `{name}` could not be resolved")]
    UnresolvedEntity { name: String },
}

impl From<LexingError> for CursorError {
    fn from(err: LexingError) -> Self {
        CursorError::Parsing(err.into())
    }
}

/// Errors from driving the writer
#[derive(Debug, Error)]
pub enum WriterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

/// Lossy rendering of raw bytes for error messages
pub(crate) fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}
