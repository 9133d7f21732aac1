//! Style Service - Custom Style Management
//!
//! This module provides the business logic for blockquote styles:
//!
//! - CRUD over custom styles with validation and the live-style quota
//! - Soft deletion (tombstones), trash listing, restore, and maintenance purge
//! - Import/export through the versioned JSON envelope
//! - A reactive "all styles" list: presets in declaration order followed by
//!   live custom styles in store order, replayed to every new subscriber
//! - Domain events for observers
//! - The server sync seam (see [`crate::services::sync`])
//!
//! Presets are compiled in and immutable; only custom styles reach the store.

use crate::config::AuroraConfig;
use crate::content::parse_stylesheet;
use crate::db::{MemoryStyleStore, SqliteStyleStore, StyleEvent, StyleFilter, StyleStore};
use crate::models::{
    default_preset, is_preset_id, parse_import_payload, preset, presets, split_import_value,
    ImportExportEnvelope, ImportReport, StyleDefinition, StyleRecord, StyleUpdate,
};
use crate::services::sync::{
    merge_remote, NoopSyncBackend, SyncBackend, SyncGuard, SyncOutcome,
};
use crate::services::StyleServiceError;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Capacity of the domain event channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Current time at the precision the store persists
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Style management service
///
/// Cheap to clone; clones share the store, the style list, the event channel
/// and the sync guard.
///
/// # Examples
///
/// ```no_run
/// # use aurora_core::{AuroraConfig, StyleService};
/// # use aurora_core::models::StyleDefinition;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let service = StyleService::open(AuroraConfig::default()).await?;
///
/// let mut styles = service.subscribe_styles();
/// assert_eq!(styles.borrow_and_update().len(), 5);
///
/// let copy = service.duplicate("classic", "My classic").await?;
/// assert!(copy.is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct StyleService {
    store: Arc<dyn StyleStore>,
    config: AuroraConfig,
    styles_tx: Arc<watch::Sender<Vec<StyleDefinition>>>,
    event_tx: broadcast::Sender<StyleEvent>,
    sync_backend: Arc<dyn SyncBackend>,
    sync_guard: SyncGuard,
}

impl StyleService {
    /// Create a service over an existing store and publish the initial list
    ///
    /// # Errors
    ///
    /// Returns `StoreFailed` if the initial read fails.
    pub async fn new(
        store: Arc<dyn StyleStore>,
        config: AuroraConfig,
    ) -> Result<Self, StyleServiceError> {
        let (styles_tx, _) = watch::channel(presets().to_vec());
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let service = Self {
            store,
            config,
            styles_tx: Arc::new(styles_tx),
            event_tx,
            sync_backend: Arc::new(NoopSyncBackend),
            sync_guard: SyncGuard::default(),
        };
        service.refresh().await?;
        Ok(service)
    }

    /// Open the store named by `config.database_path` (in-memory when unset)
    ///
    /// # Errors
    ///
    /// Returns `InitializationError` if the store cannot be opened. That
    /// failure is fatal for the style subsystem only.
    pub async fn open(config: AuroraConfig) -> Result<Self, StyleServiceError> {
        let store: Arc<dyn StyleStore> = match &config.database_path {
            Some(path) => {
                let store = SqliteStyleStore::open(path).await.map_err(|e| {
                    StyleServiceError::initialization_error(format!(
                        "Failed to open style store at {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Arc::new(store)
            }
            None => {
                tracing::info!("No style database configured, using in-memory store");
                Arc::new(MemoryStyleStore::new())
            }
        };
        Self::new(store, config).await
    }

    /// Replace the sync transport
    pub fn with_sync_backend(mut self, backend: Arc<dyn SyncBackend>) -> Self {
        self.sync_backend = backend;
        self
    }

    pub fn config(&self) -> &AuroraConfig {
        &self.config
    }

    /// Current style list (presets ++ live custom styles)
    pub fn all_styles(&self) -> Vec<StyleDefinition> {
        self.styles_tx.borrow().clone()
    }

    /// Subscribe to the style list
    ///
    /// The receiver holds the current list immediately and is notified after
    /// every create, update, delete, restore, import, reset and sync.
    pub fn subscribe_styles(&self) -> watch::Receiver<Vec<StyleDefinition>> {
        self.styles_tx.subscribe()
    }

    /// Subscribe to domain events
    pub fn subscribe_to_events(&self) -> broadcast::Receiver<StyleEvent> {
        self.event_tx.subscribe()
    }

    /// Ignores send errors: having no subscribers is normal
    fn emit_event(&self, event: StyleEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Re-read live custom styles and publish the combined list
    async fn refresh(&self) -> Result<(), StyleServiceError> {
        let custom = self.store.query(&StyleFilter::live_custom()).await?;
        let mut styles = presets().to_vec();
        styles.extend(custom.into_iter().map(|r| r.definition));
        self.styles_tx.send_replace(styles);
        Ok(())
    }

    /// Look up a style: presets first, then live custom styles
    ///
    /// Tombstoned styles are not found.
    pub async fn get_by_id(&self, id: &str) -> Result<Option<StyleDefinition>, StyleServiceError> {
        if let Some(preset) = preset(id) {
            return Ok(Some(preset.clone()));
        }
        Ok(self
            .store
            .get(id)
            .await?
            .filter(StyleRecord::is_live)
            .map(|r| r.definition))
    }

    /// Resolve a quote's style id, falling back to the configured default
    /// style and finally to the first preset
    pub async fn resolve_style(&self, id: &str) -> Result<StyleDefinition, StyleServiceError> {
        if let Some(style) = self.get_by_id(id).await? {
            return Ok(style);
        }
        tracing::debug!("Style '{}' not found, using default", id);
        Ok(preset(&self.config.default_style_id)
            .unwrap_or_else(default_preset)
            .clone())
    }

    /// Live custom styles in store order
    pub async fn custom_styles(&self) -> Result<Vec<StyleDefinition>, StyleServiceError> {
        Ok(self
            .store
            .query(&StyleFilter::live_custom())
            .await?
            .into_iter()
            .map(|r| r.definition)
            .collect())
    }

    /// Number of live custom styles (the quota population)
    pub async fn count_custom(&self) -> Result<usize, StyleServiceError> {
        Ok(self.store.count(&StyleFilter::live_custom()).await?)
    }

    async fn ensure_quota(&self) -> Result<(), StyleServiceError> {
        let limit = self.config.max_custom_styles;
        if self.count_custom().await? >= limit {
            return Err(StyleServiceError::quota_exceeded(limit));
        }
        Ok(())
    }

    /// Quota check, validation, fresh id, persist. No publish.
    async fn persist_new(
        &self,
        mut definition: StyleDefinition,
    ) -> Result<StyleDefinition, StyleServiceError> {
        self.ensure_quota().await?;
        definition.validate()?;

        definition.id = uuid::Uuid::new_v4().to_string();
        definition.is_custom = true;

        let record = StyleRecord::new(definition.clone(), now());
        self.store.put(record).await?;
        Ok(definition)
    }

    /// Create a custom style
    ///
    /// The quota is checked before anything is written; the returned
    /// definition carries the newly assigned id.
    ///
    /// # Errors
    ///
    /// - `QuotaExceeded` when `max_custom_styles` live styles already exist
    /// - `ValidationFailed` for a missing name or required style field
    pub async fn create(
        &self,
        definition: StyleDefinition,
    ) -> Result<StyleDefinition, StyleServiceError> {
        let created = self.persist_new(definition).await?;
        self.refresh().await?;
        tracing::info!("Created custom style '{}' ({})", created.name, created.id);
        self.emit_event(StyleEvent::Created {
            style: created.clone(),
        });
        Ok(created)
    }

    /// Create a custom style from a CSS snippet (best-effort subset)
    pub async fn create_from_css(
        &self,
        name: &str,
        css: &str,
    ) -> Result<StyleDefinition, StyleServiceError> {
        let (quote_style, footer_style) = parse_stylesheet(css);
        self.create(StyleDefinition::draft(name, quote_style, footer_style))
            .await
    }

    /// Apply a partial update to a custom style
    ///
    /// `id` and `is_custom` in the patch are ignored. Returns `Ok(None)` when
    /// no live style has this id.
    ///
    /// # Errors
    ///
    /// - `PresetImmutable` for a preset id
    /// - `ValidationFailed` if the patched style is invalid
    pub async fn update(
        &self,
        id: &str,
        patch: StyleUpdate,
    ) -> Result<Option<StyleDefinition>, StyleServiceError> {
        if is_preset_id(id) {
            return Err(StyleServiceError::preset_immutable(id));
        }
        let Some(mut record) = self.store.get(id).await?.filter(StyleRecord::is_live) else {
            return Ok(None);
        };

        let revalidate = patch.touches_styles() || patch.name.is_some();
        let def = &mut record.definition;
        if let Some(name) = patch.name {
            def.name = name;
        }
        if let Some(description) = patch.description {
            def.description = Some(description);
        }
        if let Some(quote_style) = patch.quote_style {
            def.quote_style = quote_style;
        }
        if let Some(footer_style) = patch.footer_style {
            def.footer_style = footer_style;
        }
        def.id = id.to_string();
        def.is_custom = true;
        if revalidate {
            def.validate()?;
        }

        record.updated_at = now();
        let updated = record.definition.clone();
        self.store.put(record).await?;
        self.refresh().await?;
        self.emit_event(StyleEvent::Updated {
            style: updated.clone(),
        });
        Ok(Some(updated))
    }

    /// Move a custom style to the trash
    ///
    /// The row is kept with `deleted = true` so a sync pass can propagate the
    /// deletion. Returns `Ok(false)` if there is no live style with this id.
    pub async fn soft_delete(&self, id: &str) -> Result<bool, StyleServiceError> {
        if is_preset_id(id) {
            return Err(StyleServiceError::preset_immutable(id));
        }
        let Some(mut record) = self.store.get(id).await?.filter(StyleRecord::is_live) else {
            return Ok(false);
        };

        record.deleted = true;
        record.updated_at = now();
        self.store.put(record).await?;
        self.refresh().await?;
        tracing::info!("Moved style {} to trash", id);
        self.emit_event(StyleEvent::Deleted { id: id.to_string() });
        Ok(true)
    }

    /// Copy any style (preset or custom) into a new custom style
    pub async fn duplicate(
        &self,
        id: &str,
        new_name: &str,
    ) -> Result<Option<StyleDefinition>, StyleServiceError> {
        let Some(mut definition) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        definition.id = String::new();
        definition.name = new_name.to_string();
        definition.is_custom = true;
        self.create(definition).await.map(Some)
    }

    /// Tombstoned styles, in store order
    pub async fn list_deleted(&self) -> Result<Vec<StyleRecord>, StyleServiceError> {
        Ok(self.store.query(&StyleFilter::trash()).await?)
    }

    /// Bring a style back from the trash
    ///
    /// Returns `Ok(false)` if no tombstone has this id.
    ///
    /// # Errors
    ///
    /// `QuotaExceeded` if restoring would exceed the live style quota.
    pub async fn restore(&self, id: &str) -> Result<bool, StyleServiceError> {
        let Some(mut record) = self.store.get(id).await?.filter(|r| r.deleted) else {
            return Ok(false);
        };
        self.ensure_quota().await?;

        record.deleted = false;
        record.updated_at = now();
        self.store.put(record).await?;
        self.refresh().await?;
        self.emit_event(StyleEvent::Restored { id: id.to_string() });
        Ok(true)
    }

    /// Hard-delete tombstones
    ///
    /// With sync enabled only tombstones the server has seen are removed, so
    /// pending deletions still propagate. Returns the number of rows removed.
    pub async fn purge_deleted(&self) -> Result<usize, StyleServiceError> {
        let tombstones = self.store.query(&StyleFilter::trash()).await?;
        let mut purged = 0;
        for record in tombstones {
            if self.config.sync_enabled && record.needs_sync() {
                continue;
            }
            if self.store.remove(record.id()).await? {
                purged += 1;
            }
        }
        if purged > 0 {
            tracing::info!("Purged {} deleted style(s)", purged);
            self.emit_event(StyleEvent::Purged { count: purged });
        }
        Ok(purged)
    }

    /// Remove every custom style, live or deleted
    pub async fn reset(&self) -> Result<(), StyleServiceError> {
        self.store.clear().await?;
        self.refresh().await?;
        tracing::warn!("Style store reset");
        Ok(())
    }

    /// Envelope over all live custom styles
    pub async fn export_all(&self) -> Result<ImportExportEnvelope, StyleServiceError> {
        let styles = self.custom_styles().await?;
        Ok(ImportExportEnvelope::new(styles, now()))
    }

    /// `export_all` as pretty-printed JSON
    pub async fn export_json(&self) -> Result<String, StyleServiceError> {
        let envelope = self.export_all().await?;
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| StyleServiceError::serialization_error(e.to_string()))
    }

    /// Import styles from an envelope
    ///
    /// Every imported style gets a fresh id. Invalid entries (and entries
    /// rejected by the quota) are reported in `errors`; the rest still land.
    ///
    /// # Errors
    ///
    /// `UnsupportedVersion` if the envelope version is not `"1.0"`; nothing
    /// is written in that case.
    pub async fn import_all(
        &self,
        envelope: ImportExportEnvelope,
    ) -> Result<ImportReport, StyleServiceError> {
        let raw = serde_json::to_value(&envelope)
            .map_err(|e| StyleServiceError::serialization_error(e.to_string()))?;
        let items = split_import_value(raw)?;
        self.import_items(items).await
    }

    /// Import from JSON text: an envelope, or a bare array of styles
    ///
    /// # Errors
    ///
    /// `MalformedImport` / `UnsupportedVersion` fail fast with zero writes.
    pub async fn import_json(&self, raw: &str) -> Result<ImportReport, StyleServiceError> {
        let items = parse_import_payload(raw)?;
        self.import_items(items).await
    }

    async fn import_items(&self, items: Vec<Value>) -> Result<ImportReport, StyleServiceError> {
        let mut report = ImportReport::default();

        for (index, item) in items.into_iter().enumerate() {
            let label = item
                .get("name")
                .and_then(Value::as_str)
                .map(|name| format!("Style {} ('{}')", index + 1, name))
                .unwrap_or_else(|| format!("Style {}", index + 1));

            let outcome = match serde_json::from_value::<StyleDefinition>(item) {
                Ok(definition) => self.persist_new(definition).await,
                Err(e) => Err(StyleServiceError::serialization_error(e.to_string())),
            };

            match outcome {
                Ok(_) => report.imported_count += 1,
                Err(StyleServiceError::StoreFailed { context }) => {
                    // Store failures are not per-item problems
                    return Err(StyleServiceError::StoreFailed { context });
                }
                Err(e) => {
                    tracing::warn!("{} skipped during import: {}", label, e);
                    report.errors.push(format!("{}: {}", label, e));
                }
            }
        }

        if report.imported_count > 0 {
            self.refresh().await?;
        }
        tracing::info!(
            "Imported {} style(s), {} error(s)",
            report.imported_count,
            report.errors.len()
        );
        self.emit_event(StyleEvent::Imported {
            count: report.imported_count,
        });
        Ok(report)
    }

    /// Whether a sync pass is currently running
    pub fn is_syncing(&self) -> bool {
        self.sync_guard.is_running()
    }

    /// Run one sync pass against the configured backend
    ///
    /// Idempotent and non-queuing: a call made while a pass is running
    /// returns `AlreadyRunning` immediately.
    pub async fn sync_with_server(&self) -> Result<SyncOutcome, StyleServiceError> {
        if !self.config.sync_enabled {
            tracing::debug!("Style sync disabled");
            return Ok(SyncOutcome::Disabled);
        }
        let Some(_pass) = self.sync_guard.try_begin() else {
            tracing::debug!("Style sync already in progress, skipping");
            return Ok(SyncOutcome::AlreadyRunning);
        };
        if !self.sync_backend.is_online().await {
            tracing::info!("Style sync skipped: offline");
            return Ok(SyncOutcome::Offline);
        }

        let pending = self.store.query(&StyleFilter::pending_sync()).await?;
        // Version each record was pushed at; local edits landing during the
        // exchange stay newer than the stamp and remain pending
        let pushed_versions: HashMap<String, DateTime<Utc>> = pending
            .iter()
            .map(|record| (record.id().to_string(), record.updated_at))
            .collect();
        let exchange = self.sync_backend.exchange(pending).await?;
        let synced_at = now();

        let mut pushed = 0;
        for id in &exchange.acknowledged {
            let Some(&pushed_at) = pushed_versions.get(id) else {
                tracing::debug!("Ignoring acknowledgement for unsent style '{}'", id);
                continue;
            };
            if let Some(mut record) = self.store.get(id).await? {
                if record.updated_at > pushed_at {
                    tracing::debug!("Style '{}' changed during sync, keeping it pending", id);
                }
                record.synced_at = Some(pushed_at);
                self.store.put(record).await?;
                pushed += 1;
            }
        }

        let mut pulled = 0;
        for remote in exchange.remote {
            if is_preset_id(remote.id()) {
                continue;
            }
            let local = self.store.get(remote.id()).await?;
            if let Some(merged) = merge_remote(local.as_ref(), remote, synced_at) {
                self.store.put(merged).await?;
                pulled += 1;
            }
        }

        if pulled > 0 {
            self.refresh().await?;
        }
        tracing::info!("Style sync completed: {} pushed, {} pulled", pushed, pulled);
        self.emit_event(StyleEvent::Synced { pushed, pulled });
        Ok(SyncOutcome::Completed { pushed, pulled })
    }
}
