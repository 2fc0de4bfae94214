//! SAX (Simple API for XML) Module
//!
//! Event-based consumption of the cursor.
//!
//! ## Architecture
//!
//! ```text
//! Cursor ---> SaxParser ---> SaxHandler (callbacks)
//!                               |
//!                               v
//!                         SaxCollector ---> SaxEvent[]
//! ```
//!
//! Entity declarations never reach the handler; the cursor merges them
//! into its entity table while the walk skips the DOCTYPE.

pub mod collector;
pub mod events;
pub mod handler;

pub use collector::SaxCollector;
pub use events::SaxEvent;
pub use handler::{SaxHandler, SaxParser};
