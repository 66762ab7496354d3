//! Configuration management for Offlinist
//!
//! Loading, parsing and validation of the TOML configuration file.

use crate::constants::{
    AUTO_SYNC_INTERVAL_SECS, CONFIG_GENERATED, DEFAULT_REMOTE_URL, REMOTE_TIMEOUT_SECS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub sync: SyncConfig,
    pub remote: RemoteConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Sync configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Run the reconciler automatically while online
    pub auto_sync_enabled: bool,
    /// Seconds between automatic sync passes
    pub auto_sync_interval_seconds: u32,
}

/// Remote service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the remote task service
    pub base_url: String,
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// Database file path; when unset the platform data directory is used
    pub database_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingConfig {
    /// Enable logging
    pub enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync_enabled: true,
            auto_sync_interval_seconds: AUTO_SYNC_INTERVAL_SECS,
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REMOTE_URL.to_string(),
            timeout_seconds: REMOTE_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Locate the config file: working directory first, then the platform
    /// config directory.
    fn find_config_file() -> Result<Option<PathBuf>> {
        let current_dir_config = PathBuf::from("offlinist.toml");
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("offlinist").join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.sync.auto_sync_interval_seconds == 0 {
            anyhow::bail!("auto_sync_interval_seconds must be at least 1");
        }
        if self.sync.auto_sync_interval_seconds > 3600 {
            anyhow::bail!("auto_sync_interval_seconds cannot exceed 3600 (1 hour)");
        }

        // Validate remote settings
        if self.remote.base_url.is_empty() {
            anyhow::bail!("remote base_url cannot be empty");
        }
        if !self.remote.base_url.starts_with("http://")
            && !self.remote.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "remote base_url must start with http:// or https://, got '{}'",
                self.remote.base_url
            );
        }
        if self.remote.timeout_seconds == 0 || self.remote.timeout_seconds > 300 {
            anyhow::bail!(
                "remote timeout_seconds must be between 1 and 300, got {}",
                self.remote.timeout_seconds
            );
        }

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content =
            toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        let header = format!(
            "# Offlinist Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join("offlinist"))
    }

    /// Get the platform data directory path (database and log files)
    pub fn get_data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))
            .map(|dir| dir.join("offlinist"))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
