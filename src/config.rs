//! Configuration loading and defaults for idle-prompt.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::idle::MonitorConfig;

/// Default prompt text.
pub const DEFAULT_PROMPT_MESSAGE: &str = "You will be logged out soon";

/// Errors from validating idle settings.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Idle time must be positive, got {0} seconds")]
    NonPositiveIdleTime(f64),

    #[error("Idle time must be a finite number of seconds")]
    NonFiniteIdleTime,

    #[error("Idle time of {0} seconds is longer than the 30 day maximum")]
    IdleTimeTooLarge(f64),
}

/// Main configuration for idle-prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds without activity before the user is idle (default: 5).
    pub idle_time_seconds: f64,

    /// Window in milliseconds within which activity bursts count as one
    /// rearm of the idle timer (default: 500).
    pub debounce_ms: u64,

    /// Text shown in the session prompt.
    pub prompt_message: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            idle_time_seconds: 5.0,
            debounce_ms: 500,
            prompt_message: DEFAULT_PROMPT_MESSAGE.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration from the default path, or return defaults if not found.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(p) = path {
            return Self::load(p);
        }

        // Try default config path
        if let Some(config_dir) = dirs::config_dir() {
            let default_path = config_dir.join("idle-prompt").join("config.toml");
            if default_path.exists() {
                return Self::load(&default_path);
            }
        }

        Ok(Self::default())
    }

    /// Validate the idle settings and build the monitor config.
    pub fn monitor(&self) -> Result<MonitorConfig, ConfigError> {
        MonitorConfig::from_secs_f64(self.idle_time_seconds, self.debounce_ms)
    }
}
