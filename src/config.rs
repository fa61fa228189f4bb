//! Configuration file support for vuln-impact.
//!
//! Provides YAML-based configuration through `vuln-impact.config.yml` files,
//! including data structures, file loading, validation and the resolved
//! engine settings.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::application::dto::DEFAULT_MAX_CONCURRENCY;
use crate::impact_analysis::domain::Severity;
use crate::impact_analysis::services::DEFAULT_BREADTH_WEIGHT;
use crate::shared::security::{read_bounded_file, MAX_CONFIG_FILE_SIZE};
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "vuln-impact.config.yml";

/// Default per-operation graph-store deadline
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub breadth_weight: Option<f64>,
    pub max_depth: Option<u32>,
    pub max_concurrency: Option<usize>,
    pub store_timeout_ms: Option<u64>,
    pub fail_on_severity: Option<String>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = read_bounded_file(path, "config file", MAX_CONFIG_FILE_SIZE).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }

    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Some(weight) = config.breadth_weight {
        if !weight.is_finite() || weight < 0.0 {
            bail!(
                "Invalid config: breadth_weight must be a non-negative number, got {}.\n\n\
                 💡 Hint: Use 0 to rank by CVSS score alone, or the default of {}.",
                weight,
                DEFAULT_BREADTH_WEIGHT
            );
        }
    }

    if config.max_concurrency == Some(0) {
        bail!(
            "Invalid config: max_concurrency must be at least 1.\n\n\
             💡 Hint: Remove the field to use the default of {}.",
            DEFAULT_MAX_CONCURRENCY
        );
    }

    if config.store_timeout_ms == Some(0) {
        bail!(
            "Invalid config: store_timeout_ms must be at least 1.\n\n\
             💡 Hint: Remove the field to use the default of {} ms.",
            DEFAULT_STORE_TIMEOUT_MS
        );
    }

    if let Some(ref severity) = config.fail_on_severity {
        severity.parse::<Severity>().map_err(|e| {
            anyhow::anyhow!(
                "Invalid config: fail_on_severity: {}\n\n\
                 💡 Hint: Use one of CRITICAL, HIGH, MEDIUM or LOW.",
                e
            )
        })?;
    }

    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    for key in config.unknown_fields.keys() {
        tracing::warn!(field = %key, "Unknown config field will be ignored");
    }
}

/// Engine settings after merging defaults, the config file and CLI flags
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub breadth_weight: f64,
    pub max_depth: Option<u32>,
    pub max_concurrency: usize,
    pub store_timeout: Duration,
    pub fail_on_severity: Severity,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            breadth_weight: DEFAULT_BREADTH_WEIGHT,
            max_depth: None,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            store_timeout: Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS),
            fail_on_severity: Severity::High,
        }
    }
}

impl EngineConfig {
    /// Layers a validated config file over the defaults
    pub fn from_file(config: Option<&ConfigFile>) -> Result<Self> {
        let mut resolved = Self::default();
        let Some(config) = config else {
            return Ok(resolved);
        };

        if let Some(weight) = config.breadth_weight {
            resolved.breadth_weight = weight;
        }
        if config.max_depth.is_some() {
            resolved.max_depth = config.max_depth;
        }
        if let Some(concurrency) = config.max_concurrency {
            resolved.max_concurrency = concurrency;
        }
        if let Some(timeout_ms) = config.store_timeout_ms {
            resolved.store_timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(ref severity) = config.fail_on_severity {
            resolved.fail_on_severity = severity.parse::<Severity>().map_err(anyhow::Error::msg)?;
        }
        Ok(resolved)
    }

    /// Applies command-line overrides; a flag always wins over the file
    pub fn with_overrides(mut self, max_depth: Option<u32>, fail_on: Option<Severity>) -> Self {
        if max_depth.is_some() {
            self.max_depth = max_depth;
        }
        if let Some(severity) = fail_on {
            self.fail_on_severity = severity;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.yml");
        fs::write(&config_path, content).unwrap();
        (dir, config_path)
    }

    #[test]
    fn test_load_valid_config() {
        let (_dir, path) = write_config(
            r#"
breadth_weight: 0.5
max_depth: 6
max_concurrency: 16
store_timeout_ms: 250
fail_on_severity: critical
"#,
        );

        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.breadth_weight, Some(0.5));
        assert_eq!(config.max_depth, Some(6));
        assert_eq!(config.max_concurrency, Some(16));
        assert_eq!(config.store_timeout_ms, Some(250));

        let resolved = EngineConfig::from_file(Some(&config)).unwrap();
        assert_eq!(resolved.store_timeout, Duration::from_millis(250));
        assert_eq!(resolved.fail_on_severity, Severity::Critical);
    }

    #[test]
    fn test_discover_config_found() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILENAME), "max_depth: 3\n").unwrap();

        let config = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.max_depth, Some(3));
    }

    #[test]
    fn test_discover_config_not_found() {
        let dir = TempDir::new().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_load_config_missing_file() {
        let result = load_config_from_path(Path::new("/nonexistent/config.yml"));
        let err = format!("{}", result.unwrap_err());
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_load_config_parse_error() {
        let (_dir, path) = write_config("invalid: yaml: [[[broken");
        let err = format!("{}", load_config_from_path(&path).unwrap_err());
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_negative_breadth_weight_rejected() {
        let (_dir, path) = write_config("breadth_weight: -1.0\n");
        let err = format!("{}", load_config_from_path(&path).unwrap_err());
        assert!(err.contains("breadth_weight must be a non-negative number"));
    }

    #[test]
    fn test_zero_concurrency_and_timeout_rejected() {
        let (_dir, path) = write_config("max_concurrency: 0\n");
        assert!(load_config_from_path(&path).is_err());

        let (_dir, path) = write_config("store_timeout_ms: 0\n");
        let err = format!("{}", load_config_from_path(&path).unwrap_err());
        assert!(err.contains("store_timeout_ms must be at least 1"));
    }

    #[test]
    fn test_invalid_severity_rejected() {
        let (_dir, path) = write_config("fail_on_severity: catastrophic\n");
        let err = format!("{}", load_config_from_path(&path).unwrap_err());
        assert!(err.contains("fail_on_severity"));
    }

    #[test]
    fn test_unknown_fields_are_kept_for_warning() {
        let (_dir, path) = write_config("max_depth: 2\nformat: markdown\n");
        let config = load_config_from_path(&path).unwrap();
        assert_eq!(config.unknown_fields.len(), 1);
        assert!(config.unknown_fields.contains_key("format"));
    }

    #[test]
    fn test_cli_overrides_win() {
        let config = ConfigFile {
            max_depth: Some(2),
            fail_on_severity: Some("LOW".to_string()),
            ..ConfigFile::default()
        };
        let resolved = EngineConfig::from_file(Some(&config))
            .unwrap()
            .with_overrides(Some(5), Some(Severity::Critical));

        assert_eq!(resolved.max_depth, Some(5));
        assert_eq!(resolved.fail_on_severity, Severity::Critical);
        assert_eq!(resolved.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    }

    #[test]
    fn test_default_config() {
        let resolved = EngineConfig::from_file(None).unwrap();
        assert_eq!(resolved, EngineConfig::default());
        assert_eq!(resolved.max_depth, None);
        assert_eq!(resolved.breadth_weight, DEFAULT_BREADTH_WEIGHT);
    }
}
