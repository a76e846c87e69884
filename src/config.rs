//! Persisted client configuration
//!
//! One small JSON file under the OS config directory holding the device IP
//! and the status polarity. Survives restarts, has no expiry.

use crate::error::ConfigError;
use directories_next::ProjectDirs;
use giza_shared::Polarity;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Device IP address, e.g. "192.168.254.170"
    #[serde(default)]
    pub device_ip: Option<String>,
    /// How sound/vibration flags map onto "Detected"
    #[serde(default)]
    pub polarity: Polarity,
}

/// Reads and writes the config file
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = ProjectDirs::from("io", "giza", "giza-remote").ok_or(ConfigError::NoConfigPath)?;
        let path = dirs.config_dir().join("giza-remote.json");
        info!("Using config file {}", path.display());
        Ok(Self { path })
    }

    /// Store backed by an explicit path, for tests
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load the config, falling back to defaults when no file exists yet
    pub async fn load(&self) -> Result<AppConfig, ConfigError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) if content.is_empty() => Ok(AppConfig::default()),
            Ok(content) => Ok(serde_json::from_slice(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(AppConfig::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if let Some(directory) = self.path.parent() {
            tokio::fs::create_dir_all(directory).await?;
        }
        let content = serde_json::to_string_pretty(config)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }
}
