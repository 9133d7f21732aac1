//! Tests for the libsql style store

use super::*;
use crate::models::{presets, StyleDefinition, StyleRecord};
use chrono::{Duration, SubsecRound, Utc};
use tempfile::TempDir;

fn record(id: &str, name: &str) -> StyleRecord {
    let mut def: StyleDefinition = presets()[1].clone();
    def.id = id.to_string();
    def.name = name.to_string();
    def.is_custom = true;
    StyleRecord::new(def, Utc::now().trunc_subsecs(6))
}

async fn open_temp() -> (SqliteStyleStore, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = SqliteStyleStore::open(temp_dir.path().join("styles.db"))
        .await
        .unwrap();
    (store, temp_dir)
}

#[tokio::test]
async fn test_fresh_store_is_empty_and_current() {
    let (store, _dir) = open_temp().await;

    assert_eq!(store.schema_version(), CURRENT_SCHEMA_VERSION);
    assert!(store.migration_report().is_clean());
    assert_eq!(store.count(&StyleFilter::all()).await.unwrap(), 0);
    assert!(store.get("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_put_get_round_trip_preserves_timestamps() {
    let (store, _dir) = open_temp().await;
    let mut rec = record("a", "Alpha");
    rec.synced_at = Some(rec.updated_at - Duration::seconds(5));

    store.put(rec.clone()).await.unwrap();

    let loaded = store.get("a").await.unwrap().unwrap();
    assert_eq!(loaded, rec);
    assert!(loaded.needs_sync());
}

#[tokio::test]
async fn test_upsert_keeps_insertion_order() {
    let (store, _dir) = open_temp().await;
    store.put(record("a", "A")).await.unwrap();
    store.put(record("b", "B")).await.unwrap();
    store.put(record("a", "A renamed")).await.unwrap();

    let names: Vec<String> = store
        .query(&StyleFilter::all())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.definition.name)
        .collect();
    assert_eq!(names, vec!["A renamed".to_string(), "B".to_string()]);
}

#[tokio::test]
async fn test_filters_match_memory_semantics() {
    let (store, _dir) = open_temp().await;

    let live = record("live", "Live");
    let mut tomb = record("tomb", "Tomb");
    tomb.deleted = true;
    let mut synced = record("synced", "Synced");
    synced.synced_at = Some(synced.updated_at);

    for r in [live, tomb, synced] {
        store.put(r).await.unwrap();
    }

    assert_eq!(store.count(&StyleFilter::live_custom()).await.unwrap(), 2);
    assert_eq!(store.count(&StyleFilter::trash()).await.unwrap(), 1);
    assert_eq!(store.count(&StyleFilter::pending_sync()).await.unwrap(), 2);

    let by_name = store
        .query(&StyleFilter::all().with_name("Synced"))
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id(), "synced");
}

#[tokio::test]
async fn test_remove_and_clear() {
    let (store, _dir) = open_temp().await;
    store.put(record("a", "A")).await.unwrap();
    store.put(record("b", "B")).await.unwrap();

    assert!(store.remove("a").await.unwrap());
    assert!(!store.remove("a").await.unwrap());

    store.clear().await.unwrap();
    assert_eq!(store.count(&StyleFilter::all()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("styles.db");

    {
        let store = SqliteStyleStore::open(&path).await.unwrap();
        store.put(record("keep", "Keep")).await.unwrap();
    }

    let store = SqliteStyleStore::open(&path).await.unwrap();
    assert!(store.migration_report().is_clean());
    assert_eq!(
        store.get("keep").await.unwrap().unwrap().definition.name,
        "Keep"
    );
}

#[tokio::test]
async fn test_in_memory_store_is_usable() {
    let store = SqliteStyleStore::open_in_memory().await.unwrap();
    store.put(record("m", "Memory")).await.unwrap();
    assert_eq!(store.count(&StyleFilter::all()).await.unwrap(), 1);
}

/// A v1 database has no `synced_at`/`deleted` columns, no `store_meta`
/// table, and definitions without `footerStyle`.
#[tokio::test]
async fn test_v1_database_is_upgraded_and_broken_rows_are_skipped() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("legacy.db");

    {
        let db = libsql::Builder::new_local(&path).build().await.unwrap();
        let conn = db.connect().unwrap();
        conn.execute(
            "CREATE TABLE styles (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                is_custom INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                row_version INTEGER NOT NULL DEFAULT 1,
                definition TEXT NOT NULL
            )",
            (),
        )
        .await
        .unwrap();

        let ts = "2024-03-01T10:00:00.000000Z";
        conn.execute(
            "INSERT INTO styles (id, name, created_at, updated_at, definition) VALUES (?, ?, ?, ?, ?)",
            (
                "old-good",
                "Old Good",
                ts,
                ts,
                r##"{"id":"old-good","name":"Old Good","quoteStyle":{"background":"#fff","color":"#000","fontSize":"1em"}}"##,
            ),
        )
        .await
        .unwrap();
        conn.execute(
            "INSERT INTO styles (id, name, created_at, updated_at, definition) VALUES (?, ?, ?, ?, ?)",
            ("old-broken", "Old Broken", ts, ts, r#"{"name":"Old Broken"}"#),
        )
        .await
        .unwrap();
    }

    let store = SqliteStyleStore::open(&path).await.unwrap();

    let report = store.migration_report();
    assert_eq!(report.migrated, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "old-broken");

    let all = store.query(&StyleFilter::all()).await.unwrap();
    assert_eq!(all.len(), 1);
    let good = &all[0];
    assert_eq!(good.id(), "old-good");
    assert!(good.definition.is_custom);
    assert!(!good.deleted);
    assert!(good.synced_at.is_none());
    assert_eq!(good.definition.footer_style.color.as_deref(), Some("#666666"));

    assert!(store.get("old-broken").await.unwrap().is_none());

    // A second open finds nothing left to migrate except the broken row
    drop(store);
    let reopened = SqliteStyleStore::open(&path).await.unwrap();
    assert_eq!(reopened.migration_report().migrated, 0);
    assert_eq!(reopened.migration_report().failed.len(), 1);
}
