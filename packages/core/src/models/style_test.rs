//! Tests for style definitions and records

#[cfg(test)]
mod tests {
    use crate::models::{FooterStyle, QuoteStyle, StyleDefinition, StyleRecord, ValidationError};
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn valid_quote() -> QuoteStyle {
        QuoteStyle {
            background: Some("#fff".to_string()),
            color: Some("#111".to_string()),
            font_size: Some("1em".to_string()),
            ..Default::default()
        }
    }

    fn valid_footer() -> FooterStyle {
        FooterStyle {
            color: Some("#666".to_string()),
            font_size: Some("0.8em".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_draft_is_custom_without_id() {
        let style = StyleDefinition::draft("Demo", valid_quote(), valid_footer());
        assert!(style.is_custom);
        assert!(style.id.is_empty());
        assert!(style.validate().is_ok());
    }

    #[test]
    fn test_missing_name_fails_validation() {
        let style = StyleDefinition::draft("  ", valid_quote(), valid_footer());
        assert_eq!(
            style.validate(),
            Err(ValidationError::MissingField("name".to_string()))
        );
    }

    #[test]
    fn test_missing_quote_field_names_the_field() {
        let mut quote = valid_quote();
        quote.font_size = None;
        let style = StyleDefinition::draft("Demo", quote, valid_footer());
        let err = style.validate().unwrap_err();
        assert!(err.to_string().contains("quoteStyle.fontSize"));
    }

    #[test]
    fn test_blank_footer_field_counts_as_missing() {
        let mut footer = valid_footer();
        footer.color = Some("   ".to_string());
        let style = StyleDefinition::draft("Demo", valid_quote(), footer);
        assert_eq!(
            style.validate(),
            Err(ValidationError::MissingField("footerStyle.color".to_string()))
        );
    }

    #[test]
    fn test_unset_fields_are_not_serialized() {
        let value = serde_json::to_value(valid_quote()).unwrap();
        assert_eq!(
            value,
            json!({"background": "#fff", "color": "#111", "fontSize": "1em"})
        );
    }

    #[test]
    fn test_record_flattens_definition() {
        let style = StyleDefinition::draft("Demo", valid_quote(), valid_footer());
        let record = StyleRecord::new(style, Utc::now());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["name"], "Demo");
        assert_eq!(value["isCustom"], true);
        assert_eq!(value["deleted"], false);
        assert!(value.get("syncedAt").is_none());
        assert!(value.get("definition").is_none());

        let back: StyleRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_needs_sync_tracks_updated_at() {
        let now = Utc::now();
        let mut record = StyleRecord::new(
            StyleDefinition::draft("Demo", valid_quote(), valid_footer()),
            now,
        );
        assert!(record.needs_sync());

        record.synced_at = Some(now + Duration::seconds(1));
        assert!(!record.needs_sync());

        record.updated_at = now + Duration::seconds(5);
        assert!(record.needs_sync());
    }

    #[test]
    fn test_definition_without_footer_does_not_deserialize() {
        let raw = json!({"name": "Broken", "quoteStyle": {}});
        assert!(serde_json::from_value::<StyleDefinition>(raw).is_err());
    }
}
