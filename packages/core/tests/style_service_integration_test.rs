//! Style service integration tests
//!
//! Exercises the public API end to end against both stores:
//! - Round trip of custom styles (create, get, export, import)
//! - Quota enforcement at the 101st style
//! - Soft-delete visibility and the trash
//! - Duplicate and import id freshness
//! - Partial import (valid entries land, invalid ones are reported)
//! - Persistence across reopen of the libsql store

#[cfg(test)]
mod style_service_integration_tests {
    use anyhow::Result;
    use aurora_core::db::{SqliteStyleStore, StyleEvent};
    use aurora_core::{
        AuroraConfig, FooterStyle, QuoteStyle, StyleDefinition, StyleService, StyleServiceError,
    };
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn draft(name: &str) -> StyleDefinition {
        StyleDefinition::draft(
            name,
            QuoteStyle {
                background: Some("#fafafa".to_string()),
                color: Some("#202020".to_string()),
                font_size: Some("1.1em".to_string()),
                border_left: Some("3px solid #999".to_string()),
                ..Default::default()
            },
            FooterStyle {
                color: Some("#606060".to_string()),
                font_size: Some("0.85em".to_string()),
                ..Default::default()
            },
        )
    }

    /// Helper to create a service over a libsql file in a temp dir
    async fn create_sqlite_service() -> Result<(StyleService, TempDir)> {
        let temp_dir = TempDir::new()?;
        let config = AuroraConfig {
            database_path: Some(temp_dir.path().join("styles").join("styles.db")),
            ..Default::default()
        };
        let service = StyleService::open(config).await?;
        Ok((service, temp_dir))
    }

    async fn create_memory_service() -> Result<StyleService> {
        Ok(StyleService::open(AuroraConfig::default()).await?)
    }

    #[tokio::test]
    async fn test_create_get_soft_delete_export_scenario() -> Result<()> {
        let (service, _temp_dir) = create_sqlite_service().await?;

        let created = service.create(draft("Scenario")).await?;
        assert!(created.is_custom);
        assert!(!created.id.is_empty());

        let fetched = service.get_by_id(&created.id).await?;
        assert_eq!(fetched, Some(created.clone()));

        assert!(service.soft_delete(&created.id).await?);
        assert_eq!(service.get_by_id(&created.id).await?, None);

        let envelope = service.export_all().await?;
        assert_eq!(envelope.version, "1.0");
        assert_eq!(envelope.count, 0);
        assert!(envelope.styles.is_empty());

        // The tombstone is still stored for a later sync pass
        let trash = service.list_deleted().await?;
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].id(), created.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_round_trip_through_export_and_import() -> Result<()> {
        let (source, _a) = create_sqlite_service().await?;
        let (target, _b) = create_sqlite_service().await?;

        let first = source.create(draft("First")).await?;
        let second = source.create(draft("Second")).await?;
        let json = source.export_json().await?;

        let report = target.import_json(&json).await?;
        assert_eq!(report.imported_count, 2);
        assert!(report.errors.is_empty());

        let imported = target.custom_styles().await?;
        let names: Vec<&str> = imported.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second"]);
        assert_eq!(imported[0].quote_style, first.quote_style);
        assert_eq!(imported[1].footer_style, second.footer_style);
        Ok(())
    }

    #[tokio::test]
    async fn test_quota_rejects_the_101st_style() -> Result<()> {
        let service = create_memory_service().await?;

        for i in 0..100 {
            service.create(draft(&format!("Style {}", i))).await?;
        }
        assert_eq!(service.count_custom().await?, 100);

        let result = service.create(draft("One too many")).await;
        assert!(matches!(
            result,
            Err(StyleServiceError::QuotaExceeded { limit: 100 })
        ));
        assert_eq!(service.count_custom().await?, 100);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_and_import_assign_fresh_ids() -> Result<()> {
        let service = create_memory_service().await?;
        let original = service.create(draft("Original")).await?;

        let copy = service
            .duplicate(&original.id, "Copy")
            .await?
            .expect("original exists");
        assert_ne!(copy.id, original.id);
        assert_eq!(service.count_custom().await?, 2);

        let json = service.export_json().await?;
        service.import_json(&json).await?;

        let ids: HashSet<String> = service
            .custom_styles()
            .await?
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids.len(), 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_partial_import_reports_invalid_entry() -> Result<()> {
        let service = create_memory_service().await?;
        let valid = serde_json::to_value(draft("Valid"))?;
        let payload = json!({
            "version": "1.0",
            "exportedAt": "2024-01-01T00:00:00Z",
            "count": 4,
            "styles": [
                valid.clone(),
                valid.clone(),
                { "name": "Broken", "quoteStyle": {} },
                valid,
            ]
        });

        let report = service.import_json(&payload.to_string()).await?;

        assert_eq!(report.imported_count, 3);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(service.count_custom().await?, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_import_writes_nothing() -> Result<()> {
        let service = create_memory_service().await?;

        let result = service.import_json("{ not json").await;
        assert!(matches!(result, Err(StyleServiceError::MalformedImport(_))));

        let result = service
            .import_json(r#"{"version":"2.0","styles":[]}"#)
            .await;
        assert!(matches!(
            result,
            Err(StyleServiceError::UnsupportedVersion(_))
        ));

        assert_eq!(service.count_custom().await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_style_stream_replays_current_list() -> Result<()> {
        let service = create_memory_service().await?;
        let created = service.create(draft("Streamed")).await?;

        // A late subscriber sees the current list immediately
        let rx = service.subscribe_styles();
        let styles = rx.borrow().clone();
        assert_eq!(styles.last().map(|s| s.id.as_str()), Some(created.id.as_str()));
        assert!(styles.iter().take(5).all(|s| !s.is_custom));

        let mut events = service.subscribe_to_events();
        service.soft_delete(&created.id).await?;
        let event = tokio::time::timeout(Duration::from_secs(1), events.recv()).await??;
        assert!(matches!(event, StyleEvent::Deleted { .. }));
        assert_eq!(service.all_styles().len(), 5);
        Ok(())
    }

    #[tokio::test]
    async fn test_styles_persist_across_reopen() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("styles.db");

        let kept_id = {
            let store = Arc::new(SqliteStyleStore::open(&db_path).await?);
            let service = StyleService::new(store, AuroraConfig::default()).await?;
            let kept = service.create(draft("Kept")).await?;
            let gone = service.create(draft("Gone")).await?;
            service.soft_delete(&gone.id).await?;
            kept.id
        };

        let store = Arc::new(SqliteStyleStore::open(&db_path).await?);
        let service = StyleService::new(store, AuroraConfig::default()).await?;

        let custom = service.custom_styles().await?;
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].id, kept_id);
        assert_eq!(service.list_deleted().await?.len(), 1);
        Ok(())
    }
}
