//! Configuration file
//!
//! Optional defaults for every flag, stored in TOML format at
//! `<config dir>/aws-s3/config.toml`. Flags and environment variables always
//! take precedence over values read here.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Configuration file contents
///
/// Every field is optional; an absent file behaves like an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    pub region: Option<String>,
    pub bucket: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,

    /// Custom endpoint for S3-compatible services
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing (needed by most self-hosted services)
    pub force_path_style: Option<bool>,

    /// Per-request timeout handed to the SDK
    pub request_timeout_secs: Option<u64>,

    /// Upper bound for a whole command
    pub command_timeout_secs: Option<u64>,

    /// Upper bound for `ls`
    pub list_timeout_secs: Option<u64>,

    /// Keep uploading remaining files after a failure
    pub continue_on_error: Option<bool>,
}

/// Loads the configuration file from disk
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
        let config_path = config_dir.join("aws-s3").join("config.toml");
        Ok(Self { config_path })
    }

    /// Create a ConfigManager with a custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            tracing::debug!(path = %self.config_path.display(), "no config file");
            return Ok(Config {
                schema_version: SCHEMA_VERSION,
                ..Default::default()
            });
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        // Files written before versioning was introduced omit the field
        config.schema_version = SCHEMA_VERSION;

        tracing::debug!(path = %self.config_path.display(), "loaded config file");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = ConfigManager::with_path(config_path);
        (manager, temp_dir)
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        let (manager, _temp_dir) = temp_config_manager();
        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert!(config.region.is_none());
        assert!(config.bucket.is_none());
    }

    #[test]
    fn test_load_values() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(
            &manager.config_path,
            r#"
            region = "eu-west-1"
            bucket = "backups"
            endpoint_url = "http://localhost:9000"
            force_path_style = true
            list_timeout_secs = 30
            continue_on_error = true
            "#,
        )
        .unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.schema_version, SCHEMA_VERSION);
        assert_eq!(config.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.bucket.as_deref(), Some("backups"));
        assert_eq!(config.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert_eq!(config.force_path_style, Some(true));
        assert_eq!(config.list_timeout_secs, Some(30));
        assert_eq!(config.continue_on_error, Some(true));
        assert!(config.access_key_id.is_none());
    }

    #[test]
    fn test_schema_version_too_new() {
        let (manager, _temp_dir) = temp_config_manager();

        let content = format!("schema_version = {}\n", SCHEMA_VERSION + 1);
        std::fs::write(&manager.config_path, content).unwrap();

        let result = manager.load();
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("newer than supported"));
    }

    #[test]
    fn test_invalid_toml() {
        let (manager, _temp_dir) = temp_config_manager();
        std::fs::write(&manager.config_path, "region = [").unwrap();
        assert!(matches!(manager.load(), Err(Error::TomlParse(_))));
    }
}
