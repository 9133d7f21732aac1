//! DOM error types

use crate::dom::NodeId;
use thiserror::Error;

/// Errors from document mutation, range handling and HTML parsing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// NodeId does not belong to this document
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    /// Operation requires an element
    #[error("Node {0} is not an element")]
    NotAnElement(NodeId),

    /// Operation requires a text node
    #[error("Node {0} is not a text node")]
    NotAText(NodeId),

    /// Boundary offset past the end of the node
    #[error("Offset {offset} out of bounds for node {node} (length {len})")]
    InvalidOffset {
        node: NodeId,
        offset: usize,
        len: usize,
    },

    /// Insertion would create a cycle or target a non-container
    #[error("Hierarchy request error: {0}")]
    HierarchyRequest(String),

    /// Node has no parent where one is required
    #[error("Node {0} is detached")]
    Detached(NodeId),

    /// Target lies inside a non-editable island
    #[error("Node {0} is not editable")]
    NotEditable(NodeId),

    /// HTML fragment could not be parsed
    #[error("HTML parse error: {0}")]
    Parse(String),
}

impl DomError {
    pub fn invalid_offset(node: NodeId, offset: usize, len: usize) -> Self {
        Self::InvalidOffset { node, offset, len }
    }

    pub fn hierarchy(msg: impl Into<String>) -> Self {
        Self::HierarchyRequest(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
