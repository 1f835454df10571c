//! Degrading volume and brightness readers
//!
//! The HUD asks these readers for a value on every refresh tick. A read never fails from the
//! caller's point of view: on error the reader returns the last value it read successfully, or a
//! fixed default before the first success.

use crate::error::NotchError;
use crate::hardware::audio::AudioSubsystem;
use crate::hardware::backlight::BrightnessSource;
use std::sync::Arc;
use tracing::{debug, trace};

/// Volume reported before any successful read
pub const DEFAULT_VOLUME: f32 = 0.01;

/// Mute state reported before any successful read
pub const DEFAULT_MUTED: bool = false;

/// Brightness reported before any successful read
pub const DEFAULT_BRIGHTNESS: f32 = 1.0;

/// Output volume and mute state at one point in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeReading {
    /// Scalar volume in 0.0-1.0
    pub level: f32,
    /// Whether output is muted
    pub muted: bool,
}

impl VolumeReading {
    /// Value the HUD displays: 0.0 while muted, otherwise the level
    pub fn displayed(self) -> f32 {
        if self.muted { 0.0 } else { self.level }
    }
}

/// Reads output volume and mute for the current default device
pub struct VolumeReader {
    audio: Arc<dyn AudioSubsystem>,
    last_level: Option<f32>,
    last_muted: Option<bool>,
}

impl VolumeReader {
    /// Reader over `audio`
    pub fn new(audio: Arc<dyn AudioSubsystem>) -> Self {
        Self {
            audio,
            last_level: None,
            last_muted: None,
        }
    }

    /// Current scalar volume, falling back to the last known value or [`DEFAULT_VOLUME`]
    pub fn volume(&mut self) -> f32 {
        let read = self
            .audio
            .default_output_device()
            .and_then(|device| self.audio.volume_scalar(device));
        match read {
            Ok(level) if level.is_finite() => {
                let level = level.clamp(0.0, 1.0);
                self.last_level = Some(level);
                level
            }
            Ok(level) => {
                trace!("Ignoring non-finite volume {}", level);
                self.last_level.unwrap_or(DEFAULT_VOLUME)
            }
            Err(e) => {
                log_failed_read("volume", &e);
                self.last_level.unwrap_or(DEFAULT_VOLUME)
            }
        }
    }

    /// Current mute state, falling back to the last known value or [`DEFAULT_MUTED`]
    pub fn is_muted(&mut self) -> bool {
        let read = self
            .audio
            .default_output_device()
            .and_then(|device| self.audio.is_muted(device));
        match read {
            Ok(muted) => {
                self.last_muted = Some(muted);
                muted
            }
            Err(e) => {
                log_failed_read("mute", &e);
                self.last_muted.unwrap_or(DEFAULT_MUTED)
            }
        }
    }

    /// Volume and mute together
    pub fn read(&mut self) -> VolumeReading {
        VolumeReading {
            level: self.volume(),
            muted: self.is_muted(),
        }
    }
}

/// Reads display brightness
pub struct BrightnessReader {
    source: Arc<dyn BrightnessSource>,
    last: Option<f32>,
}

impl BrightnessReader {
    /// Reader over `source`
    pub fn new(source: Arc<dyn BrightnessSource>) -> Self {
        Self { source, last: None }
    }

    /// Current brightness, falling back to the last known value or [`DEFAULT_BRIGHTNESS`]
    pub fn brightness(&mut self) -> f32 {
        match self.source.brightness() {
            Ok(level) if level.is_finite() => {
                let level = level.clamp(0.0, 1.0);
                self.last = Some(level);
                level
            }
            Ok(_) => self.last.unwrap_or(DEFAULT_BRIGHTNESS),
            Err(e) => {
                log_failed_read("brightness", &e);
                self.last.unwrap_or(DEFAULT_BRIGHTNESS)
            }
        }
    }
}

/// Transient failures are expected between refresh ticks; anything else is worth a louder line
fn log_failed_read(what: &str, error: &NotchError) {
    if error.is_transient() {
        trace!("{} read failed: {}", what, error);
    } else {
        debug!("{} read unavailable: {}", what, error);
    }
}
