//! Style Row Migrations
//!
//! Schema upgrades are additive. When a new version adds a field the rest of
//! the code relies on, a row transform back-fills it for rows written by older
//! builds.
//!
//! ## Architecture
//!
//! - **Version Tracking**: each row carries `row_version`; the store tracks the
//!   table schema version separately in `store_meta`
//! - **Transform Functions**: pure functions over the stored definition JSON
//!   (v1→v2, v2→v3, ...)
//! - **Migration Chaining**: transforms are chained automatically
//! - **Per-Row Failure**: a row whose transform fails keeps its old version
//!   and is excluded from reads; other rows are unaffected
//!
//! ## Example
//!
//! ```
//! use aurora_core::db::RowMigrationRegistry;
//! use serde_json::json;
//!
//! let registry = RowMigrationRegistry::with_defaults();
//! let v1 = json!({"id": "a", "name": "Old", "quoteStyle": {"color": "#000"}});
//! let v2 = registry.apply(&v1, 1, 2).unwrap();
//! assert!(v2["footerStyle"]["color"].is_string());
//! ```

use crate::models::default_preset;
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Table schema version written by this build
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

/// Row format version written by this build
pub const CURRENT_ROW_VERSION: u32 = 2;

/// Pure transform from row version N to N+1
pub type RowTransform = fn(&Value) -> Result<Value, String>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    #[error("No migration registered from row version {from} to {to}")]
    MissingStep { from: u32, to: u32 },

    #[error("Migration v{from}->v{to} failed: {reason}")]
    TransformFailed { from: u32, to: u32, reason: String },
}

/// Outcome of running row migrations at store open
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MigrationReport {
    pub migrated: usize,
    /// `(row id, reason)` for rows left at their old version
    pub failed: Vec<(String, String)>,
}

impl MigrationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Registry of row transforms keyed by `(from_version, to_version)`
pub struct RowMigrationRegistry {
    migrations: HashMap<(u32, u32), RowTransform>,
}

impl RowMigrationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            migrations: HashMap::new(),
        }
    }

    /// Registry with every transform this build knows about
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(1, 2, backfill_footer_v1_to_v2);
        registry
    }

    pub fn register(&mut self, from: u32, to: u32, transform: RowTransform) {
        self.migrations.insert((from, to), transform);
    }

    /// Upgrade a stored definition from `from` to `to`, one step at a time
    ///
    /// # Errors
    ///
    /// `MissingStep` if the chain has a gap, `TransformFailed` if a step
    /// rejects the row.
    pub fn apply(&self, definition: &Value, from: u32, to: u32) -> Result<Value, MigrationError> {
        let mut current = definition.clone();
        let mut version = from;

        while version < to {
            let next = version + 1;
            let transform = self
                .migrations
                .get(&(version, next))
                .ok_or(MigrationError::MissingStep {
                    from: version,
                    to: next,
                })?;

            current = transform(&current).map_err(|reason| MigrationError::TransformFailed {
                from: version,
                to: next,
                reason,
            })?;
            version = next;
        }

        Ok(current)
    }
}

impl Default for RowMigrationRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// v1 rows predate the attribution footer: back-fill `footerStyle` (with
/// the required fields taken from the default preset) and `isCustom`.
fn backfill_footer_v1_to_v2(definition: &Value) -> Result<Value, String> {
    let mut definition = definition.clone();
    let obj = definition
        .as_object_mut()
        .ok_or_else(|| "definition is not a JSON object".to_string())?;

    if !obj.get("quoteStyle").map(Value::is_object).unwrap_or(false) {
        return Err("quoteStyle is missing or not an object".to_string());
    }

    obj.entry("isCustom").or_insert(json!(true));

    let fallback = &default_preset().footer_style;
    let footer = obj.entry("footerStyle").or_insert_with(|| json!({}));
    let footer = footer
        .as_object_mut()
        .ok_or_else(|| "footerStyle is not an object".to_string())?;

    if let Some(color) = &fallback.color {
        footer.entry("color").or_insert(json!(color));
    }
    if let Some(font_size) = &fallback.font_size {
        footer.entry("fontSize").or_insert(json!(font_size));
    }

    Ok(definition)
}
