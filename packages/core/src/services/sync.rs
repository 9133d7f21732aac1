//! Server Sync Seam
//!
//! There is no sync protocol yet. This module fixes the contract the service
//! relies on so a real transport can be dropped in later:
//!
//! - the transport is a [`SyncBackend`] injected into `StyleService`
//! - a pass only runs when the backend reports connectivity
//! - overlapping passes collapse: a call arriving while one runs returns
//!   [`SyncOutcome::AlreadyRunning`] without touching the store
//! - remote records merge by last write on `updatedAt`; nothing more
//!
//! [`NoopSyncBackend`] is the default: it is always "online" and neither
//! acknowledges nor returns anything, so local state is never modified.

use crate::models::StyleRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// What the server returned for one exchange
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncExchange {
    /// Ids of pushed records the server accepted
    pub acknowledged: Vec<String>,
    /// Records changed on the server since the last pass
    pub remote: Vec<StyleRecord>,
}

/// Transport to the style server
#[async_trait]
pub trait SyncBackend: Send + Sync {
    /// Whether the server is reachable right now
    async fn is_online(&self) -> bool;

    /// Push locally pending records and pull remote changes
    async fn exchange(&self, pending: Vec<StyleRecord>) -> Result<SyncExchange>;
}

/// Default backend: online, but a no-op
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSyncBackend;

#[async_trait]
impl SyncBackend for NoopSyncBackend {
    async fn is_online(&self) -> bool {
        true
    }

    async fn exchange(&self, pending: Vec<StyleRecord>) -> Result<SyncExchange> {
        tracing::debug!(
            "Sync backend not configured; {} pending style(s) left untouched",
            pending.len()
        );
        Ok(SyncExchange::default())
    }
}

/// Result of `StyleService::sync_with_server`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SyncOutcome {
    /// Another pass was in progress; this call did nothing
    AlreadyRunning,
    /// Sync is switched off in configuration
    Disabled,
    /// The backend reported no connectivity
    Offline,
    /// A pass ran to completion
    Completed { pushed: usize, pulled: usize },
}

/// In-progress flag shared by clones of the service
#[derive(Debug, Clone, Default)]
pub(crate) struct SyncGuard {
    running: Arc<AtomicBool>,
}

impl SyncGuard {
    /// Claim the flag, or `None` if a pass already holds it
    pub(crate) fn try_begin(&self) -> Option<SyncPass> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPass {
                running: self.running.clone(),
            })
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the flag when dropped, including on early return
pub(crate) struct SyncPass {
    running: Arc<AtomicBool>,
}

impl Drop for SyncPass {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Last-write-wins merge of a remote record into local state
///
/// Returns the record to store, or `None` when the local copy is at least as
/// new. Ties go to the local copy.
pub fn merge_remote(
    local: Option<&StyleRecord>,
    remote: StyleRecord,
    now: DateTime<Utc>,
) -> Option<StyleRecord> {
    if let Some(local) = local {
        if local.updated_at >= remote.updated_at {
            return None;
        }
    }
    let mut merged = remote;
    merged.definition.is_custom = true;
    merged.synced_at = Some(now.max(merged.updated_at));
    Some(merged)
}
