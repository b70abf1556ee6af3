//! Runtime configuration for sqltidy.
//!
//! Configuration is stored in TOML and covers the two knobs the organizer
//! exposes: how long dated operation logs are kept, and a category override
//! table merged on top of the shipped defaults.
//!
//! # Configuration File Format
//!
//! ```toml
//! log_retention_days = 30
//!
//! [categories]
//! datafiles = [".parquet", ".feather"]
//! database = [".sql", ".ddl", ".dump"]
//! ```
//!
//! Each `[categories]` entry maps a category label to the extensions it
//! claims. Entries override the defaults: an extension listed here is
//! reassigned to the new label even if a default category already owns it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::file_category::CategoryTable;

/// Errors that can occur while loading configuration.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for an organization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TidyConfig {
    /// How many days of dated log files to keep. Defaults to 30.
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u32,

    /// Category overrides: label -> extensions. A BTreeMap keeps the order
    /// in which overrides are applied deterministic.
    #[serde(default)]
    pub categories: BTreeMap<String, Vec<String>>,
}

fn default_log_retention_days() -> u32 {
    30
}

impl TidyConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.sqltidyrc.toml` in the current directory
    /// 3. Look for `~/.config/sqltidy/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".sqltidyrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("sqltidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ConfigNotFound` if file does not exist.
    /// Returns `ConfigError::ConfigInvalid` if TOML parsing fails.
    /// Returns `ConfigError::IoError` if file cannot be read.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Builds the effective category table: defaults first, then the
    /// configured overrides on top.
    pub fn category_table(&self) -> CategoryTable {
        CategoryTable::defaults().with_overrides(&self.categories)
    }
}

impl Default for TidyConfig {
    fn default() -> Self {
        Self {
            log_retention_days: default_log_retention_days(),
            categories: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file_category::Categorizer;

    #[test]
    fn test_default_retention_is_thirty_days() {
        let config = TidyConfig::default();
        assert_eq!(config.log_retention_days, 30);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_str = r#"
log_retention_days = 7

[categories]
datafiles = [".parquet", ".feather"]
"#;
        let config: TidyConfig = toml::from_str(toml_str).expect("config should parse");
        assert_eq!(config.log_retention_days, 7);
        assert_eq!(
            config.categories.get("datafiles"),
            Some(&vec![".parquet".to_string(), ".feather".to_string()])
        );
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: TidyConfig = toml::from_str("").expect("empty config should parse");
        assert_eq!(config.log_retention_days, 30);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_category_table_applies_overrides() {
        let toml_str = r#"
[categories]
datafiles = [".csv"]
"#;
        let config: TidyConfig = toml::from_str(toml_str).expect("config should parse");
        let categorizer = Categorizer::new(&config.category_table());

        assert_eq!(categorizer.classify(".csv"), "datafiles");
        assert_eq!(categorizer.classify(".pdf"), "documents");
    }

    #[test]
    fn test_invalid_toml_is_rejected() {
        let temp_dir = tempfile::tempdir().expect("temp dir");
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "log_retention_days = \"soon\"").expect("write config");

        let result = TidyConfig::load(Some(&path));
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = TidyConfig::load(Some(Path::new("/no/such/config.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}
