//! Style Data Structures
//!
//! A [`StyleDefinition`] describes how a quotation looks: the container
//! (`quoteStyle`, including the decorative "before" glyph) and the attribution
//! line (`footerStyle`, including the cited-source span). Built-in presets are
//! immutable; custom styles are persisted as [`StyleRecord`]s.
//!
//! Every visual field is optional. Renderers only emit what is configured, so
//! an absent field falls back to whatever the editor stylesheet provides.
//!
//! # Examples
//!
//! ```rust
//! use aurora_core::models::{FooterStyle, QuoteStyle, StyleDefinition};
//!
//! let style = StyleDefinition::draft(
//!     "Demo",
//!     QuoteStyle {
//!         background: Some("#fafafa".into()),
//!         color: Some("#333".into()),
//!         font_size: Some("1.1rem".into()),
//!         ..Default::default()
//!     },
//!     FooterStyle {
//!         color: Some("#777".into()),
//!         font_size: Some("0.9rem".into()),
//!         ..Default::default()
//!     },
//! );
//! assert!(style.validate().is_ok());
//! assert!(style.id.is_empty());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for style and content payloads
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },
}

impl ValidationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Container appearance, including the decorative glyph
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_left: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub padding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub box_shadow: Option<String>,

    /// Glyph text as stored by the style editor, e.g. `"“"` (quotes and
    /// escapes are resolved at render time)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_font_family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_opacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_left: Option<String>,
}

/// Attribution line appearance, including the cited-source span
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FooterStyle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_align: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_top: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cite_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cite_font_style: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cite_font_weight: Option<String>,
}

fn require(value: &Option<String>, field: &str) -> Result<(), ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(()),
        _ => Err(ValidationError::missing(field)),
    }
}

impl QuoteStyle {
    /// Required: `background`, `color`, `fontSize`
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.background, "quoteStyle.background")?;
        require(&self.color, "quoteStyle.color")?;
        require(&self.font_size, "quoteStyle.fontSize")?;
        Ok(())
    }
}

impl FooterStyle {
    /// Required: `color`, `fontSize`
    pub fn validate(&self) -> Result<(), ValidationError> {
        require(&self.color, "footerStyle.color")?;
        require(&self.font_size, "footerStyle.fontSize")?;
        Ok(())
    }
}

/// Visual description of a quotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDefinition {
    /// Preset id (e.g. "classic") or generated UUID for custom styles
    #[serde(default)]
    pub id: String,

    /// Display name shown in the style picker
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// `false` for built-in presets
    #[serde(default)]
    pub is_custom: bool,

    pub quote_style: QuoteStyle,

    pub footer_style: FooterStyle,
}

impl StyleDefinition {
    /// Build an unsaved custom style (empty id, assigned on create)
    pub fn draft(name: impl Into<String>, quote_style: QuoteStyle, footer_style: FooterStyle) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            description: None,
            is_custom: true,
            quote_style,
            footer_style,
        }
    }

    /// Validate the fields required to persist a custom style
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::MissingField` for an empty `name` or a
    /// missing required quote/footer sub-field.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::missing("name"));
        }
        self.quote_style.validate()?;
        self.footer_style.validate()?;
        Ok(())
    }
}

/// A custom style plus storage metadata
///
/// Records with `deleted = true` are tombstones: they stay in the store so a
/// future sync pass can propagate the deletion, but read APIs never return
/// them outside explicit trash queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord {
    #[serde(flatten)]
    pub definition: StyleDefinition,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,

    /// Last successful server sync (None = never synced)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synced_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub deleted: bool,
}

impl StyleRecord {
    /// Wrap a definition as a fresh, never-synced record
    pub fn new(definition: StyleDefinition, now: DateTime<Utc>) -> Self {
        Self {
            definition,
            created_at: now,
            updated_at: now,
            synced_at: None,
            deleted: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// True when local changes have not reached the server yet
    pub fn needs_sync(&self) -> bool {
        match self.synced_at {
            None => true,
            Some(synced) => synced < self.updated_at,
        }
    }

    /// Live custom styles are the only records read APIs surface
    pub fn is_live(&self) -> bool {
        !self.deleted
    }
}

/// Partial update for a custom style
///
/// `id` and `is_custom` are accepted so UI payloads deserialize, but the
/// service always ignores them: ids are immutable and only custom styles are
/// updatable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_custom: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote_style: Option<QuoteStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer_style: Option<FooterStyle>,
}

impl StyleUpdate {
    /// Whether the patch touches fields that require re-validation
    pub fn touches_styles(&self) -> bool {
        self.quote_style.is_some() || self.footer_style.is_some()
    }
}
