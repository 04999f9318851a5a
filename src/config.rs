use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::vocab::scheduler::PracticeSettings;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DrillbookConfig {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub sync: SyncConfig,
    /// Default practice filters; the collaborator may override per session.
    pub practice: PracticeSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

/// Remote-tier settings. Sync is off unless a base URL is configured, and
/// even then the startup probe can take it back out of service.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: Option<String>,
    pub api_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_drillbook_dir()
            .join("vocab.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

/// Returns `~/.drillbook/`
pub fn default_drillbook_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".drillbook")
}

/// Returns the default config file path: `~/.drillbook/config.toml`
pub fn default_config_path() -> PathBuf {
    default_drillbook_dir().join("config.toml")
}

impl DrillbookConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DrillbookConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (DRILLBOOK_DB,
    /// DRILLBOOK_REMOTE_URL, DRILLBOOK_REMOTE_TOKEN, DRILLBOOK_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("DRILLBOOK_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("DRILLBOOK_REMOTE_URL") {
            self.sync.base_url = Some(val);
        }
        if let Ok(val) = std::env::var("DRILLBOOK_REMOTE_TOKEN") {
            self.sync.api_token = Some(val);
        }
        if let Ok(val) = std::env::var("DRILLBOOK_LOG_LEVEL") {
            self.app.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = DrillbookConfig::default();
        assert_eq!(config.app.log_level, "info");
        assert!(config.storage.db_path.ends_with("vocab.db"));
        assert!(config.sync.base_url.is_none());
        config.practice.validate().unwrap();
        assert!(config.practice.enabled_modes.audio);
        assert!(config.practice.enabled_modes.translation);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[app]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[sync]
base_url = "https://sync.example.net"

[practice]
today_new_only = true
tag_filter = "hsk1"

[practice.proficiency_range]
min = -200
max = 0
"#;
        let config: DrillbookConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.app.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(
            config.sync.base_url.as_deref(),
            Some("https://sync.example.net")
        );
        assert!(config.practice.today_new_only);
        assert_eq!(config.practice.tag_filter.as_deref(), Some("hsk1"));
        assert_eq!(config.practice.proficiency_range.min, -200);
        // defaults still apply for unset fields
        assert!(config.practice.enabled_modes.audio);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = DrillbookConfig::default();
        std::env::set_var("DRILLBOOK_DB", "/tmp/override.db");
        std::env::set_var("DRILLBOOK_REMOTE_URL", "https://kv.example.net");
        std::env::set_var("DRILLBOOK_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(
            config.sync.base_url.as_deref(),
            Some("https://kv.example.net")
        );
        assert_eq!(config.app.log_level, "trace");

        // Clean up
        std::env::remove_var("DRILLBOOK_DB");
        std::env::remove_var("DRILLBOOK_REMOTE_URL");
        std::env::remove_var("DRILLBOOK_LOG_LEVEL");
    }
}
