//! Domain Events for the Style Service
//!
//! Events are emitted on a `tokio::sync::broadcast` channel after a store
//! write succeeds, so observers (toolbar badges, sync schedulers, dev tools)
//! can react without coupling to the service internals.
//!
//! The style *list* itself is published separately through a `watch`
//! channel; events describe what changed, the watch value is the result.

use crate::models::StyleDefinition;
use serde::{Deserialize, Serialize};

/// Domain events emitted by `StyleService`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum StyleEvent {
    /// A custom style was created (directly, via duplicate or via CSS)
    #[serde(rename = "style:created")]
    Created { style: StyleDefinition },

    /// A custom style was updated
    #[serde(rename = "style:updated")]
    Updated { style: StyleDefinition },

    /// A custom style was moved to the trash (tombstoned)
    #[serde(rename = "style:deleted")]
    Deleted { id: String },

    /// A tombstoned style was restored from the trash
    #[serde(rename = "style:restored")]
    Restored { id: String },

    /// A batch import finished
    #[serde(rename = "style:imported")]
    Imported { count: usize },

    /// Tombstones were hard-deleted by maintenance
    #[serde(rename = "style:purged")]
    Purged { count: usize },

    /// A sync pass completed
    #[serde(rename = "style:synced")]
    Synced { pushed: usize, pulled: usize },
}

impl StyleEvent {
    /// Get a string representation of the event type
    pub fn event_type(&self) -> &str {
        match self {
            StyleEvent::Created { .. } => "style:created",
            StyleEvent::Updated { .. } => "style:updated",
            StyleEvent::Deleted { .. } => "style:deleted",
            StyleEvent::Restored { .. } => "style:restored",
            StyleEvent::Imported { .. } => "style:imported",
            StyleEvent::Purged { .. } => "style:purged",
            StyleEvent::Synced { .. } => "style:synced",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The JSON shape is consumed by the host UI; keep it internally tagged.
    #[test]
    fn test_style_event_serialization_contract() {
        let event = StyleEvent::Deleted {
            id: "style-123".to_string(),
        };
        let parsed = serde_json::to_value(&event).unwrap();

        assert_eq!(parsed["type"], "style:deleted");
        assert_eq!(parsed["id"], "style-123");
        assert_eq!(event.event_type(), "style:deleted");

        let back: StyleEvent = serde_json::from_value(parsed).unwrap();
        assert_eq!(back, event);
    }
}
