//! Lexer over a sequence of chunks
//!
//! Spans borrow the current chunk. When a scan runs off the end of a chunk
//! the scanned tail is copied into an edge buffer and the lexer goes
//! "on edge": from then on every consumed byte is appended there until the
//! next mark.

use super::Lexer;
use crate::core::scanner::{find_any, find_byte};
use crate::error::LexingError;
use std::iter::Fuse;

/// Lexer over any `Iterator<Item = C>` where `C: AsRef<[u8]>`
pub struct ChunkLexer<I: Iterator<Item = C>, C: AsRef<[u8]>> {
    chunks: Fuse<I>,
    chunk: Option<C>,
    start: usize,
    pos: usize,
    edge: Vec<u8>,
    on_edge: bool,
    /// Absolute offset of the current chunk
    offset: usize,
}

impl<I: Iterator<Item = C>, C: AsRef<[u8]>> ChunkLexer<I, C> {
    pub fn new(chunks: I) -> Self {
        ChunkLexer {
            chunks: chunks.fuse(),
            chunk: None,
            start: 0,
            pos: 0,
            edge: Vec::new(),
            on_edge: false,
            offset: 0,
        }
    }

    /// True while the pending span lives in the edge buffer
    pub fn is_on_edge(&self) -> bool {
        self.on_edge
    }

    /// Make sure the current chunk has a byte at `pos`
    ///
    /// Pulls exactly one chunk each time the current one is used up,
    /// skipping empty ones. Returns false once the chunks run out.
    fn fill(&mut self) -> bool {
        loop {
            if let Some(chunk) = &self.chunk {
                let bytes = chunk.as_ref();
                if self.pos < bytes.len() {
                    return true;
                }
                if !self.on_edge && self.start < self.pos {
                    self.edge.clear();
                    self.edge.extend_from_slice(&bytes[self.start..self.pos]);
                    self.on_edge = true;
                }
                self.offset += bytes.len();
                self.chunk = None;
            }
            match self.chunks.next() {
                Some(next) => {
                    self.chunk = Some(next);
                    self.start = 0;
                    self.pos = 0;
                }
                None => return false,
            }
        }
    }

    /// Bytes left in the current chunk
    fn rest(&self) -> &[u8] {
        match &self.chunk {
            Some(chunk) => &chunk.as_ref()[self.pos..],
            None => &[],
        }
    }

    /// Consume `n` bytes of the current chunk
    fn consume(&mut self, n: usize) {
        if self.on_edge {
            if let Some(chunk) = &self.chunk {
                self.edge.extend_from_slice(&chunk.as_ref()[self.pos..self.pos + n]);
            }
        }
        self.pos += n;
    }

    fn eof(&self) -> LexingError {
        LexingError::UnexpectedEof { position: self.position() }
    }
}

impl<I: Iterator<Item = C>, C: AsRef<[u8]>> Lexer for ChunkLexer<I, C> {
    type Source = I;

    fn set_source(&mut self, source: I) {
        *self = ChunkLexer::new(source);
    }

    fn is_empty(&mut self) -> bool {
        !self.fill()
    }

    fn mark_start(&mut self) {
        self.edge.clear();
        self.on_edge = false;
        self.start = self.pos;
    }

    fn get_span(&self) -> &[u8] {
        if self.on_edge {
            return &self.edge;
        }
        match &self.chunk {
            Some(chunk) => &chunk.as_ref()[self.start..self.pos],
            None => &[],
        }
    }

    fn position(&self) -> usize {
        self.offset + self.pos
    }

    fn peek(&mut self) -> Option<u8> {
        if self.fill() {
            self.rest().first().copied()
        } else {
            None
        }
    }

    fn bump(&mut self) {
        if self.fill() {
            self.consume(1);
        }
    }

    fn advance_until(&mut self, c: u8, include: bool) -> Result<bool, LexingError> {
        if !self.fill() {
            return Err(self.eof());
        }
        loop {
            match find_byte(self.rest(), c) {
                Some(offset) => {
                    self.consume(offset + usize::from(include));
                    return Ok(true);
                }
                None => {
                    self.consume(self.rest().len());
                    if !self.fill() {
                        return Ok(false);
                    }
                }
            }
        }
    }

    fn advance_until_any(&mut self, set: &[u8], include: bool) -> Result<Option<usize>, LexingError> {
        if !self.fill() {
            return Err(self.eof());
        }
        loop {
            match find_any(self.rest(), set) {
                Some((offset, index)) => {
                    self.consume(offset + usize::from(include));
                    return Ok(Some(index));
                }
                None => {
                    self.consume(self.rest().len());
                    if !self.fill() {
                        return Ok(None);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_borrowed_inside_chunk() {
        let mut lexer = ChunkLexer::new(vec![b"<a>text".to_vec(), b"</a>".to_vec()].into_iter());
        assert!(lexer.advance_until(b'>', true).unwrap());
        assert_eq!(lexer.get_span(), b"<a>");
        assert!(!lexer.is_on_edge());
    }

    #[test]
    fn test_span_crosses_boundary() {
        let mut lexer = ChunkLexer::new(vec!["<elem", "ent a='1'", "/>"].into_iter().map(str::as_bytes));
        assert!(lexer.advance_until(b'>', true).unwrap());
        assert!(lexer.is_on_edge());
        assert_eq!(lexer.get_span(), b"<element a='1'/>");
        assert_eq!(lexer.position(), 16);

        lexer.mark_start();
        assert!(!lexer.is_on_edge());
        assert!(lexer.get_span().is_empty());
        assert!(lexer.is_empty());
    }

    #[test]
    fn test_empty_chunks_skipped() {
        let mut lexer = ChunkLexer::new(vec!["", "<a", "", "", ">"].into_iter().map(str::as_bytes));
        assert!(lexer.test_and_advance(b'<').unwrap());
        assert!(lexer.advance_until(b'>', true).unwrap());
        assert_eq!(lexer.get_span(), b"<a>");
    }

    #[test]
    fn test_mark_at_chunk_end_stays_borrowed() {
        let mut lexer = ChunkLexer::new(vec!["<a>", "<b>"].into_iter().map(str::as_bytes));
        lexer.advance_until(b'>', true).unwrap();
        lexer.mark_start();
        lexer.advance_until(b'>', true).unwrap();
        assert!(!lexer.is_on_edge());
        assert_eq!(lexer.get_span(), b"<b>");
    }

    #[test]
    fn test_runs_out_on_edge() {
        let mut lexer = ChunkLexer::new(vec!["<!-- a", " b"].into_iter().map(str::as_bytes));
        assert_eq!(lexer.advance_until(b'>', true), Ok(false));
        assert_eq!(lexer.get_span(), b"<!-- a b");
        assert!(lexer.test_and_advance(b'>').is_err());
    }
}
