//! Quote dialog contract
//!
//! The dialog itself is host UI. The plugin only asks the host to open one
//! with a request, and later receives the user's decision as a
//! [`DialogOutcome`] through [`crate::plugin::QuotePlugin::complete`].

use crate::models::{ContentData, StyleDefinition};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogMode {
    /// New quote at the caret
    Insert,
    /// Editing an existing quote (confirm replaces it)
    Edit,
}

/// What the host needs to render the dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogRequest {
    pub mode: DialogMode,

    /// Pre-filled fields (selected text on insert, extracted content on edit)
    pub initial: ContentData,

    /// Style picker entries: presets first, then live custom styles
    pub styles: Vec<StyleDefinition>,
}

/// Host-assigned identifier of an open dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogHandle(pub u64);

/// Host UI that shows the quote dialog
pub trait DialogHost {
    fn open(&mut self, request: DialogRequest) -> DialogHandle;

    /// Dismiss a dialog (no-op for an unknown or already closed handle)
    fn close(&mut self, handle: DialogHandle);
}

/// The user's decision in the dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogOutcome {
    /// Dialog rendered the markup itself
    Insert { html: String },

    /// Dialog returned the fields; the plugin renders them
    Confirm(ContentData),

    Cancel,
}
