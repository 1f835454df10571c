//! Configuration manager for loading application configuration
//!
//! Reads `<app-data>/NotchHud/config.json`. The core never writes this file: persisting settings
//! belongs to the settings collaborator.

use crate::config::models::AppConfig;
use crate::error::{NotchError, Result, StringError};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Directory name under the per-user app-data directory
const APP_DIR_NAME: &str = "NotchHud";

/// Configuration manager
pub struct ConfigManager;

impl ConfigManager {
    /// Per-user app-data base directory
    ///
    /// Resolution order: `APPDATA`, `XDG_CONFIG_HOME`, `$HOME/.config`, then the working directory.
    pub fn app_data_dir() -> PathBuf {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata);
        }
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg);
        }
        std::env::var("HOME")
            .map(|home| PathBuf::from(home).join(".config"))
            .unwrap_or_else(|_| PathBuf::from("."))
    }

    /// Get the path to the configuration file
    pub fn get_config_path() -> PathBuf {
        Self::app_data_dir().join(APP_DIR_NAME).join("config.json")
    }

    /// Ensure the configuration directory exists and return it
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_path = Self::get_config_path();
        let config_dir = config_path
            .parent()
            .ok_or_else(|| NotchError::ConfigError(StringError::new("Invalid config path")))?;

        std::fs::create_dir_all(config_dir)?;
        Ok(config_dir.to_path_buf())
    }

    /// Load configuration from the default location
    ///
    /// If the configuration file doesn't exist or is corrupt, returns default configuration.
    pub fn load() -> Result<AppConfig> {
        Self::load_from(&Self::get_config_path())
    }

    /// Load configuration from an explicit path
    pub fn load_from(config_path: &Path) -> Result<AppConfig> {
        if !config_path.exists() {
            info!("Configuration file not found, using defaults");
            return Ok(AppConfig::default());
        }

        let json = std::fs::read_to_string(config_path)?;

        match serde_json::from_str(&json) {
            Ok(config) => {
                info!("Configuration loaded from {}", config_path.display());
                Ok(config)
            }
            Err(e) => {
                warn!("Failed to parse configuration, using defaults: {}", e);
                Ok(AppConfig::default())
            }
        }
    }
}
