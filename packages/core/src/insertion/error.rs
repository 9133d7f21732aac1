//! Insertion error types

use crate::dom::{DomError, NodeId};
use thiserror::Error;

/// Failures that escape the insertion fallback chain
///
/// Individual strategy failures are logged and absorbed; only these reach
/// the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertionError {
    /// Surface is missing, detached or not `contenteditable`
    #[error("No editable surface: {0} is not an editing host")]
    SurfaceNotEditable(NodeId),

    /// Splice, legacy command and append all failed
    #[error("All insertion strategies failed: {last}")]
    AllStrategiesFailed { last: DomError },
}

impl InsertionError {
    pub fn all_failed(last: DomError) -> Self {
        Self::AllStrategiesFailed { last }
    }
}
