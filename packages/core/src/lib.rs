//! Aurora Core - Blockquote Editor Extension
//!
//! This crate provides the style persistence, quote rendering and content
//! insertion layer behind the Aurora rich-text editor's blockquote tool.
//!
//! # Architecture
//!
//! - **Local-first styles**: user styles live in an embedded libsql table with
//!   soft deletion; a sync seam exists but is a no-op today
//! - **Reactive style list**: presets followed by live custom styles, published
//!   through a `tokio::sync::watch` channel that replays to new subscribers
//! - **Arena DOM**: the editable surface is modelled as an in-memory document
//!   so insertion and selection handling are testable without a browser
//! - **Injected collaborators**: dialogs, cursor access, legacy editing
//!   commands and the sync transport are traits owned by the host
//!
//! # Modules
//!
//! - [`models`] - Style definitions, presets, quote content, export envelope
//! - [`db`] - Style store trait, libsql and in-memory stores, row migrations
//! - [`services`] - `StyleService` (CRUD, quota, trash, import/export, sync)
//! - [`dom`] - Document arena, ranges, HTML serialization, cursor context
//! - [`content`] - Quote markup generation/extraction and the CSS subset
//! - [`insertion`] - Selection-preserving insertion with fallbacks
//! - [`plugin`] - Toolbar-facing façade, dialog contract, capability registry

pub mod config;
pub mod constants;
pub mod content;
pub mod db;
pub mod dom;
pub mod insertion;
pub mod logging;
pub mod models;
pub mod plugin;
pub mod services;

// Re-export commonly used types
pub use config::AuroraConfig;
pub use models::*;
pub use plugin::{QuotePlugin, QuotePluginOptions};
pub use services::{StyleService, StyleServiceError};
