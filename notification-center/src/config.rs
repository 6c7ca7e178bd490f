//! Configuration management for the notification center.

use crate::constants::{list, polling};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application ID for configuration storage.
pub const APP_ID: &str = "com.lamassu.notification-center";

/// Name of the configuration file inside the application config directory.
const CONFIG_FILE: &str = "config.json";

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,
    #[error("config I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Notification center configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// GraphQL endpoint of the admin backend
    pub endpoint: String,
    /// Interval between scheduled fetches, in milliseconds
    pub poll_interval_ms: u64,
    /// Rows rendered beyond each viewport edge
    pub overscan_rows: usize,
    /// Placeholder height for rows that have not been measured
    pub default_row_height: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8070/graphql".to_string(),
            poll_interval_ms: polling::INTERVAL_MS,
            overscan_rows: list::OVERSCAN_ROWS,
            default_row_height: list::DEFAULT_ROW_HEIGHT,
        }
    }
}

impl Config {
    /// Path of the configuration file, if the platform has a config directory.
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_ID).join(CONFIG_FILE))
    }

    /// Load configuration from disk, falling back to defaults if not found.
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            tracing::error!("No config directory, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Self>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config: {:?}", config);
                    config.sanitized()
                }
                Err(err) => {
                    tracing::error!(?err, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(err) => {
                tracing::error!(?err, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoConfigDir)?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&path, serde_json::to_string_pretty(self)?)?;
        tracing::info!("Saved config: {:?}", self);
        Ok(())
    }

    /// Poll interval as a duration. Never zero.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Replace values that would break layout with their defaults.
    pub fn sanitized(mut self) -> Self {
        if !(self.default_row_height.is_finite() && self.default_row_height > 0.0) {
            tracing::warn!(
                "Ignoring invalid default_row_height {}",
                self.default_row_height
            );
            self.default_row_height = list::DEFAULT_ROW_HEIGHT;
        }
        if self.poll_interval_ms == 0 {
            tracing::warn!("Ignoring zero poll_interval_ms");
            self.poll_interval_ms = polling::INTERVAL_MS;
        }
        self
    }
}
