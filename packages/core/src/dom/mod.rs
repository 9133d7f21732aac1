//! Document Model
//!
//! A small arena DOM standing in for the host editor's document:
//!
//! - [`Document`] / [`NodeId`] - element and text nodes with ordered
//!   attributes and inline styles
//! - [`Range`] / [`BoundaryPoint`] - DOM-style selections and
//!   `delete_contents`
//! - HTML serialization (`outer_html`) and a tolerant fragment parser
//! - [`CursorContext`] - injectable caret/selection access, and
//!   [`EditingCommands`] for the legacy "insert HTML" command

mod cursor;
mod document;
mod error;
mod html;
mod range;

pub use cursor::{CursorContext, DocumentCommands, EditingCommands, Selection, SelectionSnapshot};
pub use document::{Document, ElementData, NodeId, NodeKind};
pub use error::DomError;
pub use html::{decode_entities, escape_attribute, escape_text, parse_style_attribute};
pub use range::{BoundaryPoint, Range};
