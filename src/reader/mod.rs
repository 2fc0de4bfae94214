//! XML Reader Module
//!
//! Provides tree navigation over the token stream:
//! - Cursor: enter/next/exit traversal with entity registration

pub mod cursor;
