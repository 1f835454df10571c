//! Configuration data models
//!
//! The settings collaborator owns the user-facing preferences; this core only reads them.
//! Timing constants that the HUD and overlay guarantees depend on are not configurable and live
//! next to the code that enforces them.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// User preferences provided by the settings store
    pub preferences: UserPreferences,
    /// Backend sampling settings
    pub monitoring: MonitoringPreferences,
}

/// User preferences and settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPreferences {
    /// Whether volume/brightness changes show a HUD at all
    pub hud_enabled: bool,
    /// Whether the renderer should force the notch size on screens without a hardware notch
    pub force_notch_size: bool,
}

/// Sampling settings for the platform backends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringPreferences {
    /// How often the audio endpoint is sampled for volume/mute/device changes (25-1000)
    pub audio_poll_interval_ms: u64,
    /// How often display brightness is sampled (50-2000)
    pub brightness_poll_interval_ms: u64,
    /// Explicit sysfs backlight directory; discovered automatically when unset
    pub backlight_path: Option<PathBuf>,
}

impl Default for UserPreferences {
    fn default() -> Self {
        Self {
            hud_enabled: true,
            force_notch_size: true,
        }
    }
}

impl Default for MonitoringPreferences {
    fn default() -> Self {
        Self {
            audio_poll_interval_ms: 100,
            brightness_poll_interval_ms: 250,
            backlight_path: None,
        }
    }
}

impl MonitoringPreferences {
    /// Audio sampling interval clamped to its supported range
    pub fn audio_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.audio_poll_interval_ms.clamp(25, 1000))
    }

    /// Brightness sampling interval clamped to its supported range
    pub fn brightness_poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.brightness_poll_interval_ms.clamp(50, 2000))
    }
}
