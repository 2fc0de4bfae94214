//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: memchr-accelerated byte search and name helpers
//! - Tokenizer: `Parser` classifying lexer spans into tokens
//! - Entities: entity table, escaping and unescaping with Cow
//! - Attributes: lazy attribute parsing from tag content
//! - DTD: entity and DOCTYPE declaration parsing
//! - Options: strict/lenient configuration

pub mod attributes;
pub mod dtd;
pub mod entities;
pub mod options;
pub mod scanner;
pub mod tokenizer;
