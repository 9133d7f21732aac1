//! Service Layer Error Types
//!
//! This module defines error types for style service operations. Not-found
//! is deliberately absent: lookups return `Ok(None)` / `Ok(false)`.

use crate::db::DatabaseError;
use crate::models::{EnvelopeError, ValidationError};
use thiserror::Error;

/// Style service operation errors
#[derive(Error, Debug)]
pub enum StyleServiceError {
    /// A style failed validation
    #[error("Style validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// Creating (or restoring) would exceed the live custom style quota
    #[error("Custom style limit reached ({limit} styles)")]
    QuotaExceeded { limit: usize },

    /// Import payload could not be read at all
    #[error("Malformed import: {0}")]
    MalformedImport(String),

    /// Import envelope carries an unknown format version
    #[error("Unsupported export version: {0}")]
    UnsupportedVersion(String),

    /// Built-in presets cannot be modified or deleted
    #[error("Preset '{id}' cannot be modified")]
    PresetImmutable { id: String },

    /// The underlying store failed
    #[error("Style store operation failed: {context}")]
    StoreFailed { context: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Database setup failed
    #[error("Database operation failed: {0}")]
    DatabaseError(#[from] DatabaseError),

    /// Service initialization failed
    #[error("Initialization error: {0}")]
    InitializationError(String),
}

impl StyleServiceError {
    /// Create a quota exceeded error
    pub fn quota_exceeded(limit: usize) -> Self {
        Self::QuotaExceeded { limit }
    }

    /// Create a preset immutable error
    pub fn preset_immutable(id: impl Into<String>) -> Self {
        Self::PresetImmutable { id: id.into() }
    }

    /// Create a store failure from any store error
    pub fn store_failed(err: impl std::fmt::Display) -> Self {
        Self::StoreFailed {
            context: err.to_string(),
        }
    }

    /// Create a serialization error
    pub fn serialization_error(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Create an initialization error
    pub fn initialization_error(msg: impl Into<String>) -> Self {
        Self::InitializationError(msg.into())
    }
}

impl From<EnvelopeError> for StyleServiceError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Malformed(msg) => Self::MalformedImport(msg),
            EnvelopeError::UnsupportedVersion(version) => Self::UnsupportedVersion(version),
        }
    }
}

impl From<anyhow::Error> for StyleServiceError {
    fn from(err: anyhow::Error) -> Self {
        Self::StoreFailed {
            context: format!("{:#}", err),
        }
    }
}
