//! Data Models
//!
//! This module contains the data structures of the blockquote subsystem:
//!
//! - `StyleDefinition` / `StyleRecord` - visual styles and their storage metadata
//! - Built-in presets (classic, modern, elegant, minimal, highlight)
//! - `ContentData` - the user-entered content of one quotation
//! - `ImportExportEnvelope` - the JSON export file format

mod content;
mod envelope;
pub mod presets;
mod style;

#[cfg(test)]
mod style_test;

pub use content::ContentData;
pub use envelope::{
    parse_import_payload, split_import_value, EnvelopeError, ImportExportEnvelope, ImportReport,
};
pub use presets::{default_preset, is_preset_id, preset, presets};
pub use style::{
    FooterStyle, QuoteStyle, StyleDefinition, StyleRecord, StyleUpdate, ValidationError,
};
