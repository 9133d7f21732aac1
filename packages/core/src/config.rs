//! Runtime configuration
//!
//! `AuroraConfig` is built once at startup (defaults, then an optional JSON
//! file, then environment overrides) and handed to [`crate::StyleService`].
//! All fields use `#[serde(default)]` so older config files without newer
//! fields still deserialize.

use crate::constants::{DEFAULT_STYLE_ID, MAX_CUSTOM_STYLES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding [`AuroraConfig::database_path`]
pub const ENV_DATABASE_PATH: &str = "AURORA_DATABASE_PATH";

/// Environment variable overriding [`AuroraConfig::max_custom_styles`]
pub const ENV_MAX_CUSTOM_STYLES: &str = "AURORA_MAX_CUSTOM_STYLES";

/// Environment variable overriding [`AuroraConfig::sync_enabled`]
pub const ENV_SYNC_ENABLED: &str = "AURORA_SYNC_ENABLED";

/// Configuration for the style subsystem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuroraConfig {
    /// Database file for custom styles (None = in-memory store)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// Quota of live custom styles
    pub max_custom_styles: usize,

    /// Style used when a quote's style id does not resolve
    pub default_style_id: String,

    /// Whether `sync_with_server` may contact the sync backend at all
    pub sync_enabled: bool,
}

impl Default for AuroraConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            max_custom_styles: MAX_CUSTOM_STYLES,
            default_style_id: DEFAULT_STYLE_ID.to_string(),
            sync_enabled: false,
        }
    }
}

impl AuroraConfig {
    /// Defaults with environment overrides applied
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Load a JSON config file, then apply environment overrides
    ///
    /// A missing file is not an error: defaults are used.
    pub async fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = match tokio::fs::read_to_string(path).await {
            Ok(raw) => serde_json::from_str::<AuroraConfig>(&raw).map_err(|e| {
                anyhow::anyhow!("Invalid config file {}: {}", path.display(), e)
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config file at {}, using defaults", path.display());
                AuroraConfig::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(config.with_env_overrides())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(ENV_DATABASE_PATH) {
            if !path.trim().is_empty() {
                self.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(max) = std::env::var(ENV_MAX_CUSTOM_STYLES)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
        {
            self.max_custom_styles = max;
        }

        if let Ok(flag) = std::env::var(ENV_SYNC_ENABLED) {
            self.sync_enabled = matches!(flag.as_str(), "1" | "true" | "yes");
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_constants() {
        let config = AuroraConfig::default();
        assert_eq!(config.max_custom_styles, 100);
        assert_eq!(config.default_style_id, "classic");
        assert!(config.database_path.is_none());
        assert!(!config.sync_enabled);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: AuroraConfig = serde_json::from_str(r#"{"syncEnabled": true}"#).unwrap();
        assert!(config.sync_enabled);
        assert_eq!(config.max_custom_styles, MAX_CUSTOM_STYLES);
        assert_eq!(config.default_style_id, DEFAULT_STYLE_ID);
    }

    #[tokio::test]
    async fn test_load_missing_file_falls_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = AuroraConfig::load(dir.path().join("missing.json"))
            .await
            .unwrap();
        assert_eq!(config.default_style_id, DEFAULT_STYLE_ID);
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("aurora.json");
        tokio::fs::write(&path, "{not json").await.unwrap();
        assert!(AuroraConfig::load(&path).await.is_err());
    }
}
