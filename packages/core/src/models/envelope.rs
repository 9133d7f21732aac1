//! Import/Export File Format
//!
//! Export files are JSON envelopes:
//!
//! ```json
//! {"version": "1.0", "exportedAt": "2025-01-01T00:00:00Z", "count": 1, "styles": [ ... ]}
//! ```
//!
//! Import also accepts a bare array of styles (the legacy format written by
//! early builds). The envelope version is checked before anything else; each
//! style entry is kept as raw JSON so one malformed entry can be reported
//! without rejecting the rest of the batch.

use crate::constants::EXPORT_FORMAT_VERSION;
use crate::models::StyleDefinition;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Export envelope around custom styles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportExportEnvelope {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub count: usize,
    pub styles: Vec<StyleDefinition>,
}

impl ImportExportEnvelope {
    pub fn new(styles: Vec<StyleDefinition>, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            exported_at,
            count: styles.len(),
            styles,
        }
    }
}

/// Whole-payload failures; any of these means nothing is imported
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnvelopeError {
    #[error("Malformed import payload: {0}")]
    Malformed(String),

    #[error("Unsupported export version '{0}' (expected '1.0')")]
    UnsupportedVersion(String),
}

/// Result of a batch import
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported_count: usize,
    pub errors: Vec<String>,
}

/// Split an import payload into raw style entries
///
/// # Errors
///
/// - `Malformed` for invalid JSON, a non-object/non-array root, or an
///   envelope without a `styles` array
/// - `UnsupportedVersion` for an envelope whose `version` is not `"1.0"`
pub fn parse_import_payload(raw: &str) -> Result<Vec<Value>, EnvelopeError> {
    let root: Value =
        serde_json::from_str(raw).map_err(|e| EnvelopeError::Malformed(e.to_string()))?;
    split_import_value(root)
}

/// Same as [`parse_import_payload`] for an already-parsed value
pub fn split_import_value(root: Value) -> Result<Vec<Value>, EnvelopeError> {
    match root {
        Value::Array(items) => Ok(items),
        Value::Object(mut obj) => {
            let version = match obj.get("version") {
                Some(Value::String(v)) => v.clone(),
                Some(other) => other.to_string(),
                None => {
                    return Err(EnvelopeError::Malformed(
                        "envelope is missing 'version'".to_string(),
                    ))
                }
            };
            if version != EXPORT_FORMAT_VERSION {
                return Err(EnvelopeError::UnsupportedVersion(version));
            }
            match obj.remove("styles") {
                Some(Value::Array(items)) => Ok(items),
                _ => Err(EnvelopeError::Malformed(
                    "envelope 'styles' must be an array".to_string(),
                )),
            }
        }
        _ => Err(EnvelopeError::Malformed(
            "expected an export envelope or an array of styles".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serializes_with_camel_case_keys() {
        let envelope = ImportExportEnvelope::new(Vec::new(), Utc::now());
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["count"], 0);
        assert!(value.get("exportedAt").is_some());
        assert!(value["styles"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_bare_array_is_accepted() {
        let items = parse_import_payload(r#"[{"name":"a"},{"name":"b"}]"#).unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_wrong_version_is_rejected() {
        let raw = json!({"version": "2.0", "exportedAt": "x", "count": 0, "styles": []});
        assert_eq!(
            split_import_value(raw),
            Err(EnvelopeError::UnsupportedVersion("2.0".to_string()))
        );
    }

    #[test]
    fn test_malformed_payloads_fail_fast() {
        assert!(matches!(
            parse_import_payload("{oops"),
            Err(EnvelopeError::Malformed(_))
        ));
        assert!(matches!(
            parse_import_payload(r#""just a string""#),
            Err(EnvelopeError::Malformed(_))
        ));
        assert!(matches!(
            parse_import_payload(r#"{"version":"1.0","styles":{}}"#),
            Err(EnvelopeError::Malformed(_))
        ));
    }
}
