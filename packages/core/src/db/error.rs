//! Style store errors

use std::path::PathBuf;
use thiserror::Error;

/// Failure while opening, upgrading or querying the style store
///
/// A store that cannot be opened is fatal for the style subsystem only.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Cannot open style database at {path}: {source}")]
    ConnectionFailed {
        path: PathBuf,
        source: libsql::Error,
    },

    /// Schema creation or an additive upgrade failed
    #[error("Style schema setup failed: {0}")]
    InitializationFailed(String),

    #[error("Style database path is not writable: {path}")]
    PermissionDenied { path: PathBuf },

    /// Creating the database's parent directory failed
    #[error("Cannot create style database directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("libsql error: {0}")]
    LibsqlError(#[from] libsql::Error),

    /// A statement failed; `context` names the statement
    #[error("Style query failed: {context}")]
    SqlExecutionError { context: String },

    /// Stored row could not be decoded
    #[error("Corrupt style row '{id}': {reason}")]
    CorruptRow { id: String, reason: String },
}

impl DatabaseError {
    pub fn connection_failed(path: PathBuf, source: libsql::Error) -> Self {
        Self::ConnectionFailed { path, source }
    }

    pub fn initialization_failed(msg: impl Into<String>) -> Self {
        Self::InitializationFailed(msg.into())
    }

    pub fn permission_denied(path: PathBuf) -> Self {
        Self::PermissionDenied { path }
    }

    pub fn sql_execution(context: impl Into<String>) -> Self {
        Self::SqlExecutionError {
            context: context.into(),
        }
    }

    pub fn corrupt_row(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CorruptRow {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
