//! Application configuration.

use dashpage_core::BoardConfig;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },
    #[error("Invalid config {path}: {message}")]
    Parse { path: String, message: String },
}

/// Settings for the application shell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where widgets and preferences are stored. Defaults to the platform
    /// data directory.
    pub data_dir: Option<PathBuf>,
    /// Cached trending payload used by the `trending` command.
    pub trending_cache: Option<PathBuf>,
    /// Size of the widget container when no real page is attached.
    pub container: Size,
    pub board: BoardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            trending_cache: None,
            container: Size::new(1280.0, 800.0),
            board: BoardConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load `path` if given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
