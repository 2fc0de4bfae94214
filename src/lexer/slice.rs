//! Zero-copy lexer over a borrowed slice

use super::{Lexer, Restartable};
use crate::core::scanner::{find_any, find_byte};
use crate::error::LexingError;

/// Lexer over `&[u8]`; spans borrow the input directly
#[derive(Debug, Clone)]
pub struct SliceLexer<'a> {
    input: &'a [u8],
    start: usize,
    pos: usize,
}

impl<'a> SliceLexer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        SliceLexer { input, start: 0, pos: 0 }
    }

    /// Current span with the input's lifetime
    #[inline]
    pub fn span(&self) -> &'a [u8] {
        &self.input[self.start..self.pos]
    }

    /// Unconsumed input
    #[inline]
    pub fn remaining(&self) -> &'a [u8] {
        &self.input[self.pos..]
    }

    #[inline]
    fn eof(&self) -> LexingError {
        LexingError::UnexpectedEof { position: self.pos }
    }
}

impl<'a> Lexer for SliceLexer<'a> {
    type Source = &'a [u8];

    fn set_source(&mut self, source: &'a [u8]) {
        *self = SliceLexer::new(source);
    }

    #[inline]
    fn is_empty(&mut self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    fn mark_start(&mut self) {
        self.start = self.pos;
    }

    #[inline]
    fn get_span(&self) -> &[u8] {
        self.span()
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    fn peek(&mut self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    fn drop_while(&mut self, set: &[u8]) {
        let skip = self.remaining().iter().position(|b| !set.contains(b));
        self.pos = skip.map_or(self.input.len(), |n| self.pos + n);
        self.start = self.pos;
    }

    fn advance_until(&mut self, c: u8, include: bool) -> Result<bool, LexingError> {
        if self.pos >= self.input.len() {
            return Err(self.eof());
        }
        match find_byte(self.remaining(), c) {
            Some(offset) => {
                self.pos += offset + usize::from(include);
                Ok(true)
            }
            None => {
                self.pos = self.input.len();
                Ok(false)
            }
        }
    }

    fn advance_until_any(&mut self, set: &[u8], include: bool) -> Result<Option<usize>, LexingError> {
        if self.pos >= self.input.len() {
            return Err(self.eof());
        }
        match find_any(self.remaining(), set) {
            Some((offset, index)) => {
                self.pos += offset + usize::from(include);
                Ok(Some(index))
            }
            None => {
                self.pos = self.input.len();
                Ok(None)
            }
        }
    }
}

impl Restartable for SliceLexer<'_> {}
