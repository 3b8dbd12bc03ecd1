//! Application configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MarkXError, MarkXResult};

/// Application configuration, loaded from a TOML file with full defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory exported files land in before an optional library commit
    pub scratch_dir: PathBuf,
    /// Root directory of the local media library
    pub library_dir: PathBuf,
    /// Brand-overlay image composited onto every export
    pub watermark_image: PathBuf,
    /// Default log filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scratch_dir: std::env::temp_dir().join("markx"),
            library_dir: PathBuf::from("markx-library"),
            watermark_image: PathBuf::from("assets/watermark.png"),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> MarkXResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| MarkXError::ConfigError {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| MarkXError::ConfigError {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })?;

        debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from the given file when present, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> MarkXResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = AppConfig::default();
        assert!(config.scratch_dir.ends_with("markx"));
        assert_eq!(config.library_dir, PathBuf::from("markx-library"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markx.toml");
        std::fs::write(&path, "library_dir = \"/media/library\"\n").unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.library_dir, PathBuf::from("/media/library"));
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_round_trip_through_toml() {
        let config = AppConfig::default();
        let serialized = toml::to_string(&config).unwrap();
        let restored: AppConfig = toml::from_str(&serialized).unwrap();
        assert_eq!(restored.scratch_dir, config.scratch_dir);
        assert_eq!(restored.watermark_image, config.watermark_image);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markx.toml");
        std::fs::write(&path, "scratch_dir = [not valid").unwrap();

        assert!(matches!(
            AppConfig::load(&path),
            Err(MarkXError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = AppConfig::load(Path::new("/nonexistent/markx.toml"));
        assert!(matches!(result, Err(MarkXError::ConfigError { .. })));
    }
}
