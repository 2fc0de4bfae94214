//! Restartable lexer over a clonable byte iterator

use super::{Lexer, Restartable};
use std::cell::OnceCell;
use std::iter::Peekable;

/// Lexer over an `Iterator<Item = u8> + Clone`
///
/// Instead of buffering, it keeps a clone of the source taken at the mark
/// and replays it to rebuild the span the first time it is asked for.
#[derive(Clone)]
pub struct ReplayLexer<I: Iterator<Item = u8> + Clone> {
    source: Peekable<I>,
    marked: Peekable<I>,
    len: usize,
    pos: usize,
    span: OnceCell<Vec<u8>>,
}

impl<I: Iterator<Item = u8> + Clone> ReplayLexer<I> {
    pub fn new(source: I) -> Self {
        let source = source.peekable();
        ReplayLexer {
            marked: source.clone(),
            source,
            len: 0,
            pos: 0,
            span: OnceCell::new(),
        }
    }
}

impl<I: Iterator<Item = u8> + Clone> Lexer for ReplayLexer<I> {
    type Source = I;

    fn set_source(&mut self, source: I) {
        *self = ReplayLexer::new(source);
    }

    fn is_empty(&mut self) -> bool {
        self.source.peek().is_none()
    }

    fn mark_start(&mut self) {
        self.marked = self.source.clone();
        self.len = 0;
        self.span.take();
    }

    fn get_span(&self) -> &[u8] {
        self.span.get_or_init(|| self.marked.clone().take(self.len).collect())
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
        if self.source.next().is_some() {
            self.len += 1;
            self.pos += 1;
            self.span.take();
        }
    }
}

impl<I: Iterator<Item = u8> + Clone> Restartable for ReplayLexer<I> {}
