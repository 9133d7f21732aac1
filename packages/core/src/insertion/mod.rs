//! Insertion Engine
//!
//! Snapshot/restore of the caret around modal UI, block-aware splicing and
//! the fallback chain used to put generated quotes into the document.

mod engine;
mod error;


pub use engine::{InsertStrategy, InsertionEngine, InsertionReport};
pub use error::InsertionError;
