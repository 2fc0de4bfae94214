//! xmlcursor - layered XML processing
//!
//! Layers, leaf first:
//! - `lexer`: character sources (slice, single-pass stream, restartable
//!   stream, chunk iterator) behind one `Lexer` trait
//! - `core::tokenizer`: the `Parser`, one classified token per step
//! - `reader::cursor`: enter / next / exit navigation over the tokens
//! - consumers: `sax` dispatcher, `dom` arena builder, `writer`
//!
//! ```
//! use xmlcursor::{Cursor, XmlKind};
//!
//! let mut cursor = Cursor::from_str("<r><c a=\"1\">t</c></r>").unwrap();
//! assert!(cursor.enter().unwrap());
//! assert_eq!(cursor.name(), b"r");
//! assert!(cursor.enter().unwrap());
//! assert_eq!(cursor.attributes().find(b"a").unwrap().as_deref(), Some(b"1" as &[u8]));
//! assert!(cursor.enter().unwrap());
//! assert_eq!(cursor.kind(), Some(XmlKind::Text));
//! ```

pub mod core;
pub mod dom;
pub mod error;
pub mod lexer;
pub mod reader;
pub mod sax;
pub mod writer;

pub use crate::core::attributes::{Attribute, AttributeMap, Attributes};
pub use crate::core::entities::{escape, unescape, EntityTable};
pub use crate::core::options::{Options, XmlVersion};
pub use crate::core::tokenizer::{OwnedToken, Parser, Token, Tokenizer, XmlKind};
pub use crate::dom::XmlDocument;
pub use crate::error::{CursorError, LexingError, ParsingError, WriterError, XmlError};
pub use crate::lexer::{ChunkLexer, Lexer, ReplayLexer, Restartable, SliceLexer, StreamLexer};
pub use crate::reader::cursor::{Cursor, EntityLoader};
pub use crate::sax::{SaxCollector, SaxEvent, SaxHandler, SaxParser};
pub use crate::writer::{PrettyPrint, XmlWriter};

/// Zero-copy cursor over a byte slice
pub type SliceCursor<'a> = Cursor<Parser<SliceLexer<'a>>>;

/// Cursor over a single-pass byte iterator
pub type StreamCursor<I> = Cursor<Parser<StreamLexer<I>>>;

/// Cursor over a cloneable byte iterator, supports save points
pub type ReplayCursor<I> = Cursor<Parser<ReplayLexer<I>>>;

/// Cursor over an iterator of byte chunks
pub type ChunkCursor<I, C> = Cursor<Parser<ChunkLexer<I, C>>>;
