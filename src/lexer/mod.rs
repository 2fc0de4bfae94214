//! Character sources for the tokenizer
//!
//! A lexer tracks a scan start (the mark) and a current position, and
//! exposes everything consumed between the two as a span. Four variants
//! cover the usual input shapes:
//! - `SliceLexer`: borrowed slice, zero-copy spans
//! - `StreamLexer`: single-pass byte iterator, spans buffered
//! - `ReplayLexer`: clonable byte iterator, spans rebuilt on demand
//! - `ChunkLexer`: iterator of chunks, spans borrowed until they cross a
//!   chunk boundary

mod chunked;
mod replay;
mod slice;
mod stream;

pub use chunked::ChunkLexer;
pub use replay::ReplayLexer;
pub use slice::SliceLexer;
pub use stream::StreamLexer;

use crate::error::LexingError;

/// Scanning protocol consumed by the tokenizer
///
/// Only `peek` and `bump` move through the input; the scanning operations
/// are built on them and variants with direct access to their bytes
/// override them with memchr searches.
pub trait Lexer {
    /// What `set_source` accepts
    type Source;

    /// Replace the input and reset all state
    fn set_source(&mut self, source: Self::Source);

    /// True iff no more bytes are available
    fn is_empty(&mut self) -> bool;

    /// Start a new span at the current position
    fn mark_start(&mut self);

    /// Bytes consumed since the last mark
    fn get_span(&self) -> &[u8];

    /// Absolute offset consumed so far
    fn position(&self) -> usize;

    /// Next byte without consuming it
    fn peek(&mut self) -> Option<u8>;

    /// Consume the byte `peek` returned
    fn bump(&mut self);

    /// Skip bytes in `set`; the pending span restarts after them
    fn drop_while(&mut self, set: &[u8]) {
        while let Some(b) = self.peek() {
            if !set.contains(&b) {
                break;
            }
            self.bump();
        }
        self.mark_start();
    }

    /// Consume `c` if it is the next byte
    fn test_and_advance(&mut self, c: u8) -> Result<bool, LexingError> {
        match self.peek() {
            None => Err(LexingError::UnexpectedEof { position: self.position() }),
            Some(b) if b == c => {
                self.bump();
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// Consume up to the next `c` (and `c` itself if `include`)
    ///
    /// Returns false if the input ran out first; everything is consumed then.
    fn advance_until(&mut self, c: u8, include: bool) -> Result<bool, LexingError> {
        self.advance_until_any(&[c], include).map(|found| found.is_some())
    }

    /// Consume up to the next byte in `set`, returning its index in `set`
    fn advance_until_any(&mut self, set: &[u8], include: bool) -> Result<Option<usize>, LexingError> {
        if self.peek().is_none() {
            return Err(LexingError::UnexpectedEof { position: self.position() });
        }
        while let Some(b) = self.peek() {
            if let Some(index) = set.iter().position(|&t| t == b) {
                if include {
                    self.bump();
                }
                return Ok(Some(index));
            }
            self.bump();
        }
        Ok(None)
    }
}

/// Lexers that can be copied at their current position
///
/// The copy and the original share nothing observable: advancing one
/// never moves the other.
pub trait Restartable: Lexer + Clone {
    fn save(&self) -> Self {
        self.clone()
    }
}
