//! StyleStore Trait - Storage Abstraction Layer
//!
//! This module defines the `StyleStore` trait that abstracts persistence of
//! custom [`StyleRecord`]s. The store is deliberately dumb: it knows nothing
//! about quotas, validation or presets. Those rules live in `StyleService`.
//!
//! # Design Decisions
//!
//! 1. **Async-First**: All methods are async so an embedded database and a
//!    future remote backend share one interface
//! 2. **Ownership Semantics**: `put` takes the record by value
//! 3. **Error Handling**: Uses `anyhow::Result`; the service maps failures
//!    into `StyleServiceError::StoreFailed`
//! 4. **Iteration Order**: `query` returns records in insertion order, and a
//!    replacing `put` keeps the record's original position
//!
//! # Examples
//!
//! ```rust,no_run
//! use aurora_core::db::{MemoryStyleStore, StyleFilter, StyleStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = MemoryStyleStore::new();
//! let live = store.count(&StyleFilter::live_custom()).await?;
//! assert_eq!(live, 0);
//! # Ok(())
//! # }
//! ```

use crate::models::StyleRecord;
use anyhow::Result;
use async_trait::async_trait;

/// Predicate for `query`/`count`; every `None` field matches anything
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleFilter {
    pub is_custom: Option<bool>,
    pub deleted: Option<bool>,
    /// `Some(true)`: `syncedAt` absent or older than `updatedAt`
    pub needs_sync: Option<bool>,
    pub name: Option<String>,
}

impl StyleFilter {
    /// Every record, tombstones included
    pub fn all() -> Self {
        Self::default()
    }

    /// Custom styles that are not deleted (the quota population)
    pub fn live_custom() -> Self {
        Self {
            is_custom: Some(true),
            deleted: Some(false),
            ..Default::default()
        }
    }

    /// Tombstoned records only
    pub fn trash() -> Self {
        Self {
            deleted: Some(true),
            ..Default::default()
        }
    }

    /// Records with local changes the server has not seen
    pub fn pending_sync() -> Self {
        Self {
            needs_sync: Some(true),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Evaluate the filter against a record (used by in-memory stores)
    pub fn matches(&self, record: &StyleRecord) -> bool {
        if let Some(is_custom) = self.is_custom {
            if record.definition.is_custom != is_custom {
                return false;
            }
        }
        if let Some(deleted) = self.deleted {
            if record.deleted != deleted {
                return false;
            }
        }
        if let Some(needs_sync) = self.needs_sync {
            if record.needs_sync() != needs_sync {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if &record.definition.name != name {
                return false;
            }
        }
        true
    }
}

/// Durable keyed storage for custom style records
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the service can be shared behind
/// an `Arc` across tasks.
#[async_trait]
pub trait StyleStore: Send + Sync {
    /// Get a record by id (tombstones included)
    ///
    /// - `Ok(Some(record))` if the row exists
    /// - `Ok(None)` if it does not (not an error)
    async fn get(&self, id: &str) -> Result<Option<StyleRecord>>;

    /// Insert or replace a record by id
    async fn put(&self, record: StyleRecord) -> Result<()>;

    /// Records matching `filter`, in insertion order
    async fn query(&self, filter: &StyleFilter) -> Result<Vec<StyleRecord>>;

    /// Hard delete. Maintenance only; normal deletion is a tombstone `put`.
    ///
    /// Returns whether a row was removed.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// Number of records matching `filter`
    async fn count(&self, filter: &StyleFilter) -> Result<usize>;

    /// Remove every record (full reset)
    async fn clear(&self) -> Result<()>;

    /// Schema version this store is running at
    fn schema_version(&self) -> u32;
}
