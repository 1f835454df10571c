//! Platform hardware access
//!
//! - [`audio`]: audio subsystem abstraction (default device, volume, mute, listeners)
//! - [`polled`]: listener emulation for backends that can only be sampled
//! - [`backlight`]: display brightness sources
//! - [`readers`]: degrading readers the HUD queries on every refresh tick
//!
//! The platform picks the concrete backends through [`system_audio`] and
//! [`backlight::system_brightness`].

pub mod audio;
pub mod backlight;
pub mod polled;
pub mod readers;

#[cfg(windows)]
pub mod windows_audio;

pub use audio::{
    AudioObject, AudioProperty, AudioSubsystem, DeviceId, ListenerId, PropertyListener,
};
pub use backlight::{BrightnessSource, SysfsBacklight, UnavailableBrightness, system_brightness};
pub use polled::{AudioEndpoint, PolledAudioSubsystem};
pub use readers::{BrightnessReader, VolumeReader, VolumeReading};

use crate::error::{NotchError, Result, StringError};
use std::sync::Arc;
use std::time::Duration;

/// Audio endpoint for platforms without a supported audio backend
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedAudioEndpoint;

impl UnsupportedAudioEndpoint {
    fn unavailable() -> NotchError {
        NotchError::AudioUnavailable(StringError::new(
            "no audio backend for this platform",
        ))
    }
}

impl AudioEndpoint for UnsupportedAudioEndpoint {
    fn default_output_device(&self) -> Result<DeviceId> {
        Err(Self::unavailable())
    }

    fn volume_scalar(&self, _device: DeviceId) -> Result<f32> {
        Err(Self::unavailable())
    }

    fn is_muted(&self, _device: DeviceId) -> Result<bool> {
        Err(Self::unavailable())
    }
}

/// Audio subsystem for this platform, sampled every `interval`
pub fn system_audio(interval: Duration) -> Arc<dyn AudioSubsystem> {
    #[cfg(windows)]
    {
        Arc::new(PolledAudioSubsystem::new(
            windows_audio::WindowsAudioEndpoint::new(),
            interval,
        ))
    }

    #[cfg(not(windows))]
    {
        tracing::warn!("No native audio backend on this platform, volume HUD shows defaults");
        Arc::new(PolledAudioSubsystem::new(UnsupportedAudioEndpoint, interval))
    }
}
