//! Configuration management module
//!
//! This module loads the read-only configuration consumed by the core. Configuration is stored
//! in `<app-data>/NotchHud/config.json`; a missing or unreadable file yields defaults.

pub mod manager;
pub mod models;

pub use manager::ConfigManager;
pub use models::{AppConfig, MonitoringPreferences, UserPreferences};
