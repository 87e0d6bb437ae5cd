//! Configuration and constants for the CLI.

use crate::utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Default timeout for requests to a remote match service
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// Default remote match service endpoint
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

/// Current JSON report schema version
pub const REPORT_SCHEMA_VERSION: &str = "1.0.0";

// Per-pixel color distance tolerance used by the comparator (normalized 0..1).
// Distinct from the page-level failure threshold below.
pub const DEFAULT_PIXEL_TOLERANCE: f64 = 0.01;

// A page fails as soon as one pixel differs unless the caller relaxes this
pub const DEFAULT_FAILURE_THRESHOLD: f64 = 0.0;

// Rendering scale, 1.0 = 72 dpi (one pixel per PDF point)
pub const DEFAULT_SCALE: f64 = 1.0;
pub const MIN_REQUEST_SCALE: f64 = 1.0;
pub const MAX_REQUEST_SCALE: f64 = 10.0;
pub const POINTS_PER_INCH: f64 = 72.0;

/// Directory created next to a test file to hold its page snapshots
pub const SNAPSHOTS_DIR_NAME: &str = "__pdf_snapshots__";

pub const SNAPSHOT_SUFFIX: &str = "-snap";
pub const DIFF_SUFFIX: &str = "-diff.png";

/// Default poppler rasterizer binary
pub const DEFAULT_POPPLER_BIN: &str = "pdftoppm";

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pdf-snapshot.toml";

/// Settings loaded from `pdf-snapshot.toml`.
///
/// Every field is optional; CLI flags take precedence over file values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Remote match service; when absent pages are rendered locally
    pub server_url: Option<String>,

    /// Rendering scale
    pub scale: Option<f64>,

    /// Page-level failure threshold
    pub failure_threshold: Option<f64>,

    /// Path to the `pdftoppm` binary
    pub poppler_bin: Option<String>,
}

/// Load a configuration file
///
/// # Errors
/// * `ConfigError::Io` - If the file cannot be read
/// * `ConfigError::Parse` - If the TOML is invalid
/// * `ConfigError::Invalid` - If a value is out of range
pub fn load_config(path: impl AsRef<Path>) -> Result<FileConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let config: FileConfig = toml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

impl FileConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(scale) = self.scale {
            if !(MIN_REQUEST_SCALE..=MAX_REQUEST_SCALE).contains(&scale) {
                return Err(ConfigError::Invalid(format!(
                    "scale must be within [{}, {}], got {}",
                    MIN_REQUEST_SCALE, MAX_REQUEST_SCALE, scale
                )));
            }
        }

        if let Some(threshold) = self.failure_threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigError::Invalid(format!(
                    "failure_threshold must be within [0, 1], got {}",
                    threshold
                )));
            }
        }

        if let Some(url) = &self.server_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(
                    "server_url must start with http:// or https://".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let config: FileConfig = toml::from_str(
            r#"
server_url = "http://localhost:4000"
scale = 2.0
failure_threshold = 0.05
poppler_bin = "/usr/bin/pdftoppm"
"#,
        )
        .unwrap();

        assert_eq!(config.server_url.as_deref(), Some("http://localhost:4000"));
        assert_eq!(config.scale, Some(2.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_is_valid() {
        let config: FileConfig = toml::from_str("").unwrap();
        assert_eq!(config, FileConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf-snapshot.toml");
        fs::write(&path, "threshhold = 0.1\n").unwrap();

        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_out_of_range_values_rejected() {
        let config = FileConfig {
            scale: Some(11.0),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FileConfig {
            failure_threshold: Some(1.5),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = FileConfig {
            server_url: Some("ftp://host".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
