//! libsql Style Store
//!
//! Persists custom styles in an embedded libsql (SQLite-compatible) database.
//!
//! # Schema (version 2)
//!
//! ```sql
//! styles(
//!     id TEXT PRIMARY KEY,
//!     name TEXT NOT NULL,
//!     is_custom INTEGER NOT NULL,
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     row_version INTEGER NOT NULL,
//!     definition TEXT NOT NULL,      -- StyleDefinition JSON
//!     synced_at TEXT,                -- added in v2
//!     deleted INTEGER NOT NULL       -- added in v2
//! )
//! store_meta(key TEXT PRIMARY KEY, value TEXT NOT NULL)
//! ```
//!
//! Indexes cover `name`, `is_custom`, `created_at`, `updated_at`, `synced_at`
//! and `deleted`. Upgrades only ever add columns; rows written by older builds
//! are then upgraded by [`RowMigrationRegistry`].
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microsecond
//! precision, `Z` suffix) so lexical comparison in SQL matches time order.
//!
//! # Connection Pattern
//!
//! The store holds a single connection for its lifetime. That keeps
//! `":memory:"` databases coherent (every libsql connection to `":memory:"`
//! is a separate database) and serializes writes from the service.

use crate::db::migrations::{
    MigrationReport, RowMigrationRegistry, CURRENT_ROW_VERSION, CURRENT_SCHEMA_VERSION,
};
use crate::db::{DatabaseError, StyleFilter, StyleStore};
use crate::models::{StyleDefinition, StyleRecord};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use libsql::{Builder, Connection, Database, Row};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

const SCHEMA_VERSION_KEY: &str = "schema_version";

const SELECT_COLUMNS: &str =
    "SELECT id, name, is_custom, created_at, updated_at, synced_at, deleted, definition FROM styles";

/// Format a timestamp for storage
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("Invalid timestamp '{}'", s))?
        .with_timezone(&Utc))
}

/// libsql-backed [`StyleStore`]
pub struct SqliteStyleStore {
    /// Kept alive for the lifetime of the connection
    _db: Database,
    conn: Mutex<Connection>,
    db_path: PathBuf,
    migration_report: MigrationReport,
}

impl SqliteStyleStore {
    /// Open (or create) the store at `db_path`
    ///
    /// This will:
    /// 1. Ensure the parent directory exists
    /// 2. Open the database file (`":memory:"` is accepted)
    /// 3. Create or additively upgrade the schema
    /// 4. Run row migrations, recording per-row failures
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the directory cannot be created, the
    /// connection fails, or the schema cannot be initialized. Individual row
    /// migration failures are not errors; see [`Self::migration_report`].
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self, DatabaseError> {
        let db_path = db_path.as_ref().to_path_buf();
        let in_memory = db_path.as_os_str() == ":memory:";

        if !in_memory {
            if let Some(parent) = db_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        if e.kind() == std::io::ErrorKind::PermissionDenied {
                            DatabaseError::permission_denied(db_path.clone())
                        } else {
                            DatabaseError::DirectoryCreationFailed(e)
                        }
                    })?;
                }
            }
        }

        let db = Builder::new_local(&db_path)
            .build()
            .await
            .map_err(|e| DatabaseError::connection_failed(db_path.clone(), e))?;
        let conn = db.connect()?;

        let mut store = Self {
            _db: db,
            conn: Mutex::new(conn),
            db_path,
            migration_report: MigrationReport::default(),
        };

        store.initialize_schema(in_memory).await?;
        store.migration_report = store
            .migrate_rows(&RowMigrationRegistry::with_defaults())
            .await?;

        tracing::info!(
            "Style store ready at {} (schema v{}, {} row(s) migrated, {} failed)",
            store.db_path.display(),
            CURRENT_SCHEMA_VERSION,
            store.migration_report.migrated,
            store.migration_report.failed.len()
        );

        Ok(store)
    }

    /// In-memory store (nothing persisted across restarts)
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::open(":memory:").await
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Row migration outcome from `open`
    pub fn migration_report(&self) -> &MigrationReport {
        &self.migration_report
    }

    /// Execute a PRAGMA statement
    ///
    /// PRAGMA statements return rows, so they go through query() rather
    /// than execute().
    async fn execute_pragma(conn: &Connection, pragma: &str) -> Result<(), DatabaseError> {
        conn.query(pragma, ()).await.map_err(|e| {
            DatabaseError::sql_execution(format!("Failed to execute '{}': {}", pragma, e))
        })?;
        Ok(())
    }

    async fn exec(conn: &Connection, sql: &str, what: &str) -> Result<(), DatabaseError> {
        conn.execute(sql, ()).await.map_err(|e| {
            DatabaseError::initialization_failed(format!("Failed to {}: {}", what, e))
        })?;
        Ok(())
    }

    /// Create the schema, or upgrade an older one in place
    async fn initialize_schema(&self, in_memory: bool) -> Result<(), DatabaseError> {
        let conn = self.conn.lock().await;

        if !in_memory {
            Self::execute_pragma(&conn, "PRAGMA journal_mode = WAL").await?;
        }
        Self::execute_pragma(&conn, "PRAGMA busy_timeout = 5000").await?;

        Self::exec(
            &conn,
            "CREATE TABLE IF NOT EXISTS store_meta (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            "create store_meta table",
        )
        .await?;

        let version = match Self::read_schema_version(&conn).await? {
            Some(v) => v,
            None if Self::table_exists(&conn, "styles").await? => {
                // Table predates version tracking: that is the v1 layout
                1
            }
            None => {
                Self::create_styles_table(&conn).await?;
                CURRENT_SCHEMA_VERSION
            }
        };

        if version > CURRENT_SCHEMA_VERSION {
            return Err(DatabaseError::initialization_failed(format!(
                "Store schema v{} is newer than supported v{}",
                version, CURRENT_SCHEMA_VERSION
            )));
        }

        if version < 2 {
            tracing::info!("Upgrading style store schema v{} -> v2", version);
            Self::upgrade_to_v2(&conn).await?;
        }

        Self::create_indexes(&conn).await?;
        Self::write_schema_version(&conn, CURRENT_SCHEMA_VERSION).await?;

        Ok(())
    }

    async fn create_styles_table(conn: &Connection) -> Result<(), DatabaseError> {
        Self::exec(
            conn,
            "CREATE TABLE IF NOT EXISTS styles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                is_custom INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                row_version INTEGER NOT NULL DEFAULT 1,
                definition TEXT NOT NULL,
                synced_at TEXT,
                deleted INTEGER NOT NULL DEFAULT 0
            )",
            "create styles table",
        )
        .await
    }

    /// v2 adds sync bookkeeping and tombstones
    async fn upgrade_to_v2(conn: &Connection) -> Result<(), DatabaseError> {
        let columns = Self::column_names(conn, "styles").await?;
        if !columns.iter().any(|c| c == "synced_at") {
            Self::exec(
                conn,
                "ALTER TABLE styles ADD COLUMN synced_at TEXT",
                "add styles.synced_at",
            )
            .await?;
        }
        if !columns.iter().any(|c| c == "deleted") {
            Self::exec(
                conn,
                "ALTER TABLE styles ADD COLUMN deleted INTEGER NOT NULL DEFAULT 0",
                "add styles.deleted",
            )
            .await?;
        }
        Ok(())
    }

    async fn create_indexes(conn: &Connection) -> Result<(), DatabaseError> {
        for column in [
            "name",
            "is_custom",
            "created_at",
            "updated_at",
            "synced_at",
            "deleted",
        ] {
            let sql = format!(
                "CREATE INDEX IF NOT EXISTS idx_styles_{col} ON styles({col})",
                col = column
            );
            Self::exec(conn, &sql, &format!("create index on styles.{}", column)).await?;
        }
        Ok(())
    }

    async fn read_schema_version(conn: &Connection) -> Result<Option<u32>, DatabaseError> {
        let mut rows = conn
            .query(
                "SELECT value FROM store_meta WHERE key = ?",
                [SCHEMA_VERSION_KEY],
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to read schema version: {}", e)))?;

        match rows.next().await? {
            Some(row) => {
                let raw: String = row.get(0)?;
                raw.parse::<u32>().map(Some).map_err(|_| {
                    DatabaseError::initialization_failed(format!(
                        "Unreadable schema version '{}'",
                        raw
                    ))
                })
            }
            None => Ok(None),
        }
    }

    async fn write_schema_version(conn: &Connection, version: u32) -> Result<(), DatabaseError> {
        conn.execute(
            "INSERT INTO store_meta (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (SCHEMA_VERSION_KEY, version.to_string()),
        )
        .await
        .map_err(|e| DatabaseError::sql_execution(format!("Failed to write schema version: {}", e)))?;
        Ok(())
    }

    async fn table_exists(conn: &Connection, table: &str) -> Result<bool, DatabaseError> {
        let mut rows = conn
            .query(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?",
                [table],
            )
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to inspect schema: {}", e)))?;
        Ok(rows.next().await?.is_some())
    }

    async fn column_names(conn: &Connection, table: &str) -> Result<Vec<String>, DatabaseError> {
        let mut rows = conn
            .query(&format!("PRAGMA table_info({})", table), ())
            .await
            .map_err(|e| DatabaseError::sql_execution(format!("Failed to inspect columns: {}", e)))?;

        let mut names = Vec::new();
        while let Some(row) = rows.next().await? {
            let name: String = row.get(1)?;
            names.push(name);
        }
        Ok(names)
    }

    /// Upgrade rows below `CURRENT_ROW_VERSION`
    ///
    /// A failing row is logged and left untouched; reads skip it until a
    /// later build knows how to migrate it.
    async fn migrate_rows(
        &self,
        registry: &RowMigrationRegistry,
    ) -> Result<MigrationReport, DatabaseError> {
        let conn = self.conn.lock().await;
        let mut report = MigrationReport::default();

        let mut pending = Vec::new();
        {
            let mut rows = conn
                .query(
                    "SELECT id, row_version, definition FROM styles WHERE row_version < ?",
                    [CURRENT_ROW_VERSION as i64],
                )
                .await
                .map_err(|e| {
                    DatabaseError::sql_execution(format!("Failed to scan rows for migration: {}", e))
                })?;
            while let Some(row) = rows.next().await? {
                let id: String = row.get(0)?;
                let version: i64 = row.get(1)?;
                let definition: String = row.get(2)?;
                pending.push((id, version, definition));
            }
        }

        for (id, version, raw) in pending {
            let migrated = serde_json::from_str::<serde_json::Value>(&raw)
                .map_err(|e| format!("definition is not valid JSON: {}", e))
                .and_then(|value| {
                    registry
                        .apply(&value, version as u32, CURRENT_ROW_VERSION)
                        .map_err(|e| e.to_string())
                })
                .and_then(|value| {
                    serde_json::from_value::<StyleDefinition>(value.clone())
                        .map(|def| (def, value))
                        .map_err(|e| format!("migrated definition does not parse: {}", e))
                });

            match migrated {
                Ok((def, value)) => {
                    conn.execute(
                        "UPDATE styles SET definition = ?, name = ?, is_custom = ?, row_version = ? WHERE id = ?",
                        (
                            value.to_string(),
                            def.name.clone(),
                            def.is_custom as i64,
                            CURRENT_ROW_VERSION as i64,
                            id.clone(),
                        ),
                    )
                    .await
                    .map_err(|e| {
                        DatabaseError::sql_execution(format!("Failed to persist migrated row {}: {}", id, e))
                    })?;
                    report.migrated += 1;
                }
                Err(reason) => {
                    tracing::warn!("Style row {} could not be migrated: {}", id, reason);
                    report.failed.push((id, reason));
                }
            }
        }

        Ok(report)
    }

    fn row_to_record(row: &Row) -> Result<StyleRecord> {
        let id: String = row.get(0).context("Failed to get id")?;
        let name: String = row.get(1).context("Failed to get name")?;
        let is_custom: i64 = row.get(2).context("Failed to get is_custom")?;
        let created_at: String = row.get(3).context("Failed to get created_at")?;
        let updated_at: String = row.get(4).context("Failed to get updated_at")?;
        let synced_at: Option<String> = row.get(5).context("Failed to get synced_at")?;
        let deleted: i64 = row.get(6).context("Failed to get deleted")?;
        let definition_json: String = row.get(7).context("Failed to get definition")?;

        let mut definition: StyleDefinition = serde_json::from_str(&definition_json)
            .map_err(|e| DatabaseError::corrupt_row(id.clone(), e.to_string()))?;
        // Indexed columns are authoritative over the JSON copy
        definition.id = id;
        definition.name = name;
        definition.is_custom = is_custom != 0;

        Ok(StyleRecord {
            definition,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
            synced_at: synced_at.as_deref().map(parse_timestamp).transpose()?,
            deleted: deleted != 0,
        })
    }

    /// Build the WHERE clause for a filter. Only `name` needs a bound
    /// parameter; the boolean predicates are literals.
    fn where_clause(filter: &StyleFilter) -> String {
        let mut clauses = vec![format!("row_version >= {}", CURRENT_ROW_VERSION)];
        if let Some(is_custom) = filter.is_custom {
            clauses.push(format!("is_custom = {}", is_custom as i64));
        }
        if let Some(deleted) = filter.deleted {
            clauses.push(format!("deleted = {}", deleted as i64));
        }
        match filter.needs_sync {
            Some(true) => clauses.push("(synced_at IS NULL OR synced_at < updated_at)".to_string()),
            Some(false) => {
                clauses.push("(synced_at IS NOT NULL AND synced_at >= updated_at)".to_string())
            }
            None => {}
        }
        if filter.name.is_some() {
            clauses.push("name = ?".to_string());
        }
        clauses.join(" AND ")
    }

    async fn run_query(&self, sql: &str, filter: &StyleFilter) -> Result<libsql::Rows> {
        let conn = self.conn.lock().await;
        let rows = match &filter.name {
            Some(name) => conn.query(sql, [name.as_str()]).await,
            None => conn.query(sql, ()).await,
        };
        rows.with_context(|| format!("Failed to execute style query: {}", sql))
    }
}

#[async_trait]
impl StyleStore for SqliteStyleStore {
    async fn get(&self, id: &str) -> Result<Option<StyleRecord>> {
        let conn = self.conn.lock().await;
        let sql = format!(
            "{} WHERE id = ? AND row_version >= {}",
            SELECT_COLUMNS, CURRENT_ROW_VERSION
        );
        let mut rows = conn
            .query(&sql, [id])
            .await
            .context("Failed to execute get query")?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_record(&row)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, record: StyleRecord) -> Result<()> {
        let definition_json =
            serde_json::to_string(&record.definition).context("Failed to serialize style")?;
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT INTO styles (id, name, is_custom, created_at, updated_at, synced_at, deleted, row_version, definition)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                is_custom = excluded.is_custom,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at,
                synced_at = excluded.synced_at,
                deleted = excluded.deleted,
                row_version = excluded.row_version,
                definition = excluded.definition",
            (
                record.definition.id.clone(),
                record.definition.name.clone(),
                record.definition.is_custom as i64,
                format_timestamp(&record.created_at),
                format_timestamp(&record.updated_at),
                record.synced_at.as_ref().map(format_timestamp),
                record.deleted as i64,
                CURRENT_ROW_VERSION as i64,
                definition_json,
            ),
        )
        .await
        .with_context(|| format!("Failed to store style {}", record.definition.id))?;

        Ok(())
    }

    async fn query(&self, filter: &StyleFilter) -> Result<Vec<StyleRecord>> {
        let sql = format!(
            "{} WHERE {} ORDER BY rowid ASC",
            SELECT_COLUMNS,
            Self::where_clause(filter)
        );
        let mut rows = self.run_query(&sql, filter).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(Self::row_to_record(&row)?);
        }
        Ok(records)
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let affected = conn
            .execute("DELETE FROM styles WHERE id = ?", [id])
            .await
            .with_context(|| format!("Failed to delete style {}", id))?;
        Ok(affected > 0)
    }

    async fn count(&self, filter: &StyleFilter) -> Result<usize> {
        let sql = format!(
            "SELECT COUNT(*) FROM styles WHERE {}",
            Self::where_clause(filter)
        );
        let mut rows = self.run_query(&sql, filter).await?;
        match rows.next().await? {
            Some(row) => {
                let count: i64 = row.get(0).context("Failed to read count")?;
                Ok(count as usize)
            }
            None => Ok(0),
        }
    }

    async fn clear(&self) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute("DELETE FROM styles", ())
            .await
            .context("Failed to clear styles")?;
        Ok(())
    }

    fn schema_version(&self) -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}
