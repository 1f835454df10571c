//! Display brightness sources
//!
//! Brightness is read as a scalar in 0.0-1.0. Linux exposes it through the sysfs backlight class
//! (`/sys/class/backlight/<device>/{brightness,max_brightness}`); systems without a backlight
//! device get [`UnavailableBrightness`], which the reader turns into the 1.0 default.

use crate::config::MonitoringPreferences;
use crate::error::{NotchError, Result, StringError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default sysfs backlight class directory
const SYSFS_BACKLIGHT_ROOT: &str = "/sys/class/backlight";

/// Something that can report the current display brightness
pub trait BrightnessSource: Send + Sync {
    /// Current brightness in 0.0-1.0
    fn brightness(&self) -> Result<f32>;
}

/// Backlight device exposed through sysfs
#[derive(Debug, Clone)]
pub struct SysfsBacklight {
    dir: PathBuf,
}

impl SysfsBacklight {
    /// Backlight at an explicit device directory
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// First backlight device under the system backlight class
    pub fn discover() -> Option<Self> {
        Self::discover_in(Path::new(SYSFS_BACKLIGHT_ROOT))
    }

    /// First backlight device (by name) under `root`
    pub fn discover_in(root: &Path) -> Option<Self> {
        let mut devices: Vec<PathBuf> = fs::read_dir(root)
            .ok()?
            .filter_map(std::result::Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.join("max_brightness").is_file())
            .collect();
        devices.sort();
        devices.into_iter().next().map(Self::new)
    }

    /// Device directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read_value(&self, name: &str) -> Result<u64> {
        let raw = fs::read_to_string(self.dir.join(name))
            .map_err(|e| NotchError::BrightnessUnavailable(Box::new(e)))?;
        raw.trim()
            .parse::<u64>()
            .map_err(|e| NotchError::BrightnessUnavailable(Box::new(e)))
    }
}

impl BrightnessSource for SysfsBacklight {
    #[expect(
        clippy::cast_precision_loss,
        reason = "backlight ranges are far below f32 integer precision limits"
    )]
    fn brightness(&self) -> Result<f32> {
        let max = self.read_value("max_brightness")?;
        if max == 0 {
            return Err(NotchError::BrightnessUnavailable(StringError::new(format!(
                "{} reports max_brightness 0",
                self.dir.display()
            ))));
        }
        let current = self.read_value("brightness")?;
        Ok((current as f32 / max as f32).clamp(0.0, 1.0))
    }
}

/// Placeholder for systems without a readable backlight
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableBrightness;

impl BrightnessSource for UnavailableBrightness {
    fn brightness(&self) -> Result<f32> {
        Err(NotchError::BrightnessUnavailable(StringError::new(
            "no backlight device on this system",
        )))
    }
}

/// Brightness source for this system, honoring an explicit backlight path from the config
pub fn system_brightness(preferences: &MonitoringPreferences) -> Arc<dyn BrightnessSource> {
    if let Some(path) = &preferences.backlight_path {
        info!("Using configured backlight {}", path.display());
        return Arc::new(SysfsBacklight::new(path));
    }
    match SysfsBacklight::discover() {
        Some(backlight) => {
            info!("Discovered backlight {}", backlight.dir().display());
            Arc::new(backlight)
        }
        None => {
            debug!("No backlight device found, brightness HUD will show defaults");
            Arc::new(UnavailableBrightness)
        }
    }
}
