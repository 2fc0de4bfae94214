//! Single-pass lexer over a byte iterator

use super::Lexer;
use std::iter::Peekable;

/// Lexer over any `Iterator<Item = u8>`
///
/// Consumed bytes are copied into an owned buffer that holds the pending
/// span; marking clears it. Nothing before the mark is retained.
pub struct StreamLexer<I: Iterator<Item = u8>> {
    source: Peekable<I>,
    buffer: Vec<u8>,
    pos: usize,
}

impl<I: Iterator<Item = u8>> StreamLexer<I> {
    pub fn new(source: I) -> Self {
        StreamLexer {
            source: source.peekable(),
            buffer: Vec::new(),
            pos: 0,
        }
    }
}

impl<I: Iterator<Item = u8>> Lexer for StreamLexer<I> {
    type Source = I;

    fn set_source(&mut self, source: I) {
        self.source = source.peekable();
        self.buffer.clear();
        self.pos = 0;
    }

    fn is_empty(&mut self) -> bool {
        self.source.peek().is_none()
    }

    fn mark_start(&mut self) {
        self.buffer.clear();
    }

    fn get_span(&self) -> &[u8] {
        &self.buffer
    }

    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn peek(&mut self) -> Option<u8> {
        self.source.peek().copied()
    }

    #[inline]
    fn bump(&mut self) {
        if let Some(b) = self.source.next() {
            self.buffer.push(b);
            self.pos += 1;
        }
    }
}
