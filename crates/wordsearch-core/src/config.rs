//! Client configuration.

use crate::drawing::{DEFAULT_BRUSH_WIDTH, DEFAULT_CANVAS_SIZE};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Invalid configuration: {0}")]
    Parse(String),
}

/// Settings of the workspace client.
///
/// Every field is optional in the JSON file; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the generation service.
    pub server_url: String,
    pub request_timeout_secs: u64,
    /// Delay before a queued preview request is sent.
    pub preview_debounce_ms: u64,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub brush_width: f64,
    /// Where exported documents are written. Current directory when unset.
    pub download_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
            preview_debounce_ms: 250,
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
            brush_width: DEFAULT_BRUSH_WIDTH,
            download_dir: None,
        }
    }
}

impl ClientConfig {
    /// Default config file location.
    ///
    /// On Unix: `~/.config/wordsearch/config.json`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("wordsearch").join("config.json"))
    }

    /// Parse from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load from `path`, falling back to defaults when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default location.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn preview_debounce(&self) -> Duration {
        Duration::from_millis(self.preview_debounce_ms)
    }

    /// Directory exported documents are written to.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}
