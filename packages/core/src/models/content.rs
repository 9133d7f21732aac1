//! Quote Content
//!
//! [`ContentData`] is what the user types into the quote dialog. It is
//! transient: once rendered and inserted, the document owns the markup and
//! `ContentData` is only recovered again via [`crate::content::extract`].

use crate::constants::DEFAULT_STYLE_ID;
use crate::models::ValidationError;
use serde::{Deserialize, Serialize};

/// User-entered content of one quotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentData {
    /// Quoted text (required, non-empty after trim)
    pub text: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Preset or custom style id; unresolved ids fall back to the default preset
    #[serde(default = "default_style_id")]
    pub style_id: String,
}

fn default_style_id() -> String {
    DEFAULT_STYLE_ID.to_string()
}

impl ContentData {
    /// Content with the default style and no attribution
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
            source: None,
            style_id: default_style_id(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = style_id.into();
        self
    }

    /// Author, if present and not blank
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }

    /// Source, if present and not blank
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn has_attribution(&self) -> bool {
        self.author().is_some() || self.source().is_some()
    }

    /// The content as it reads back from rendered markup
    ///
    /// Text is trimmed and CRLF line endings become `\n`; author and source
    /// are trimmed and dropped when blank.
    pub fn normalized(&self) -> Self {
        let text = self
            .text
            .trim()
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            text,
            author: self.author().map(str::to_string),
            source: self.source().map(str::to_string),
            style_id: self.style_id.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.text.trim().is_empty() {
            return Err(ValidationError::missing("text"));
        }
        Ok(())
    }
}

impl Default for ContentData {
    fn default() -> Self {
        Self::new("")
    }
}
