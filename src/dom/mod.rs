//! DOM Module - Arena-based XML Document
//!
//! Implements a compact DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names, values and text
//! - Namespace lookup through ancestor `xmlns` declarations

pub mod builder;
pub mod document;
pub mod namespace;
pub mod node;
pub mod strings;

pub use builder::DomBuilder;
pub use document::{DocumentType, XmlDocument};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use strings::StringPool;
