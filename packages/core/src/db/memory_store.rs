//! In-memory style store
//!
//! Used for ephemeral sessions (no database path configured) and tests.
//! Keeps records in insertion order so stream ordering matches the libsql
//! store.

use crate::db::migrations::CURRENT_SCHEMA_VERSION;
use crate::db::{StyleFilter, StyleStore};
use crate::models::StyleRecord;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemoryStyleStore {
    records: Arc<Mutex<Vec<StyleRecord>>>,
}

impl MemoryStyleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate with records (insertion order preserved)
    pub fn with_records(records: Vec<StyleRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StyleRecord>>> {
        self.records
            .lock()
            .map_err(|_| anyhow!("Failed to acquire style store lock"))
    }
}

#[async_trait]
impl StyleStore for MemoryStyleStore {
    async fn get(&self, id: &str) -> Result<Option<StyleRecord>> {
        let records = self.lock()?;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn put(&self, record: StyleRecord) -> Result<()> {
        let mut records = self.lock()?;
        match records.iter_mut().find(|r| r.id() == record.id()) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        Ok(())
    }

    async fn query(&self, filter: &StyleFilter) -> Result<Vec<StyleRecord>> {
        let records = self.lock()?;
        Ok(records.iter().filter(|r| filter.matches(r)).cloned().collect())
    }

    async fn remove(&self, id: &str) -> Result<bool> {
        let mut records = self.lock()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        Ok(records.len() != before)
    }

    async fn count(&self, filter: &StyleFilter) -> Result<usize> {
        let records = self.lock()?;
        Ok(records.iter().filter(|r| filter.matches(r)).count())
    }

    async fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        Ok(())
    }

    fn schema_version(&self) -> u32 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{presets, StyleDefinition};
    use chrono::Utc;

    fn record(id: &str, name: &str) -> StyleRecord {
        let mut def: StyleDefinition = presets()[0].clone();
        def.id = id.to_string();
        def.name = name.to_string();
        def.is_custom = true;
        StyleRecord::new(def, Utc::now())
    }

    #[tokio::test]
    async fn test_put_replaces_in_place() {
        let store = MemoryStyleStore::new();
        store.put(record("a", "A")).await.unwrap();
        store.put(record("b", "B")).await.unwrap();
        store.put(record("a", "A2")).await.unwrap();

        let all = store.query(&StyleFilter::all()).await.unwrap();
        let names: Vec<&str> = all.iter().map(|r| r.definition.name.as_str()).collect();
        assert_eq!(names, vec!["A2", "B"]);
    }

    #[tokio::test]
    async fn test_filters_and_remove() {
        let store = MemoryStyleStore::new();
        let mut tomb = record("gone", "Gone");
        tomb.deleted = true;
        store.put(record("live", "Live")).await.unwrap();
        store.put(tomb).await.unwrap();

        assert_eq!(store.count(&StyleFilter::live_custom()).await.unwrap(), 1);
        assert_eq!(store.count(&StyleFilter::trash()).await.unwrap(), 1);
        assert_eq!(
            store
                .count(&StyleFilter::all().with_name("Live"))
                .await
                .unwrap(),
            1
        );

        assert!(store.remove("gone").await.unwrap());
        assert!(!store.remove("gone").await.unwrap());
        assert_eq!(store.count(&StyleFilter::all()).await.unwrap(), 1);
    }

    #[test]
    fn test_seeded_records_keep_order() {
        let store = MemoryStyleStore::with_records(vec![record("z", "Z"), record("a", "A")]);

        let ids: Vec<String> = tokio_test::block_on(store.query(&StyleFilter::all()))
            .unwrap()
            .into_iter()
            .map(|r| r.definition.id)
            .collect();
        assert_eq!(ids, vec!["z", "a"]);
        assert!(tokio_test::block_on(store.clear()).is_ok());
        assert_eq!(tokio_test::block_on(store.count(&StyleFilter::all())).unwrap(), 0);
    }
}
