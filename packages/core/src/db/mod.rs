//! Database Layer
//!
//! Persistence for custom blockquote styles:
//!
//! - [`StyleStore`]: the async storage abstraction the service talks to
//! - [`SqliteStyleStore`]: embedded libsql store with additive schema upgrades
//! - [`MemoryStyleStore`]: ephemeral store for sessions without a database
//! - [`RowMigrationRegistry`]: per-row upgrades of stored definitions
//! - [`StyleEvent`]: change notifications broadcast by the service
//!
//! Presets are never stored; they are compiled in (see `models::presets`).

mod error;
pub mod events;
mod memory_store;
mod migrations;
mod sqlite_store;
mod style_store;

#[cfg(test)]
mod sqlite_store_test;

pub use error::DatabaseError;
pub use events::StyleEvent;
pub use memory_store::MemoryStyleStore;
pub use migrations::{
    MigrationError, MigrationReport, RowMigrationRegistry, RowTransform, CURRENT_ROW_VERSION,
    CURRENT_SCHEMA_VERSION,
};
pub use sqlite_store::SqliteStyleStore;
pub use style_store::{StyleFilter, StyleStore};
