//! Transient volume/brightness HUD
//!
//! Each HUD kind is a small state machine:
//!
//! ```text
//!           event                          hide timer (1.5 s)
//!   Idle ─────────────▶ Active ──────────────────────────────▶ Idle
//!                        │  ▲
//!                        └──┘ event: restart refresh + hide timers
//! ```
//!
//! Entering `Active` sets the icon and an initial value, then starts two timers: a refresh timer
//! that re-reads the value every 0.1 s for ten ticks (so the level follows a held volume key),
//! and a hide timer that clears the HUD 1.5 s after the *last* event. Kinds are independent.

use crate::bus::Topic;
use crate::hardware::{BrightnessReader, VolumeReader};
use crate::utils::CancellableTimer;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Interval between value refreshes while a HUD is shown
pub const HUD_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Number of refreshes after each event
pub const HUD_REFRESH_TICKS: u32 = 10;

/// Time from the last event until the HUD hides
pub const HUD_HIDE_DELAY: Duration = Duration::from_millis(1500);

/// HUD kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HudKind {
    /// Output volume
    Volume,
    /// Display brightness
    Brightness,
}

impl HudKind {
    /// Every kind
    pub const ALL: [Self; 2] = [Self::Volume, Self::Brightness];

    /// Bus topic that triggers this kind
    pub const fn topic(self) -> Topic {
        match self {
            Self::Volume => Topic::VolumeChanged,
            Self::Brightness => Topic::BrightnessChanged,
        }
    }

    /// Kind triggered by `topic`, if any
    pub const fn from_topic(topic: Topic) -> Option<Self> {
        match topic {
            Topic::VolumeChanged => Some(Self::Volume),
            Topic::BrightnessChanged => Some(Self::Brightness),
            Topic::ClipboardChanged => None,
        }
    }

    const fn icon(self) -> HudIcon {
        match self {
            Self::Volume => HudIcon::Speaker,
            Self::Brightness => HudIcon::Brightness,
        }
    }
}

/// Icon shown in the HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum HudIcon {
    /// Nothing shown
    #[default]
    None,
    /// Speaker glyph
    Speaker,
    /// Sun glyph
    Brightness,
}

/// Displayed state of one HUD kind
///
/// `icon` and `value` are set and cleared together.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct HudState {
    /// Icon to draw
    pub icon: HudIcon,
    /// Level in 0.0-1.0
    pub value: Option<f32>,
    /// When the current activation began
    #[serde(skip)]
    pub active_since: Option<Instant>,
}

impl HudState {
    /// Whether the HUD is currently shown
    pub fn is_active(&self) -> bool {
        self.icon != HudIcon::None
    }
}

#[derive(Debug)]
struct HudChannel {
    state: HudState,
    refresh: CancellableTimer,
    hide: CancellableTimer,
}

impl HudChannel {
    fn new() -> Self {
        Self {
            state: HudState::default(),
            refresh: CancellableTimer::repeating(HUD_REFRESH_INTERVAL, Some(HUD_REFRESH_TICKS)),
            hide: CancellableTimer::one_shot(HUD_HIDE_DELAY),
        }
    }

    fn reset(&mut self) {
        self.refresh.cancel();
        self.hide.cancel();
        self.state = HudState::default();
    }

    fn next_deadline(&self) -> Option<Instant> {
        crate::utils::timer::earliest([self.refresh.deadline(), self.hide.deadline()])
    }
}

/// Drives the volume and brightness HUDs
pub struct HudCoordinator {
    volume: HudChannel,
    brightness: HudChannel,
    volume_reader: VolumeReader,
    brightness_reader: BrightnessReader,
    enabled: bool,
}

impl HudCoordinator {
    /// Coordinator reading through the given readers; `enabled` mirrors the HUD preference
    pub fn new(
        volume_reader: VolumeReader,
        brightness_reader: BrightnessReader,
        enabled: bool,
    ) -> Self {
        Self {
            volume: HudChannel::new(),
            brightness: HudChannel::new(),
            volume_reader,
            brightness_reader,
            enabled,
        }
    }

    /// Turn HUD display on or off for future events
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether events produce a HUD
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Handle a change event of `kind` at `now`
    ///
    /// Returns `true` if the displayed state changed.
    pub fn on_event(&mut self, kind: HudKind, now: Instant) -> bool {
        if !self.enabled {
            trace!("HUD disabled, ignoring {:?} event", kind);
            return false;
        }

        let value = self.read(kind);
        let channel = self.channel_mut(kind);
        let before = channel.state;

        channel.refresh.start(now);
        channel.hide.start(now);
        channel.state.icon = kind.icon();
        channel.state.value = Some(value);
        if !before.is_active() {
            channel.state.active_since = Some(now);
            debug!("{:?} HUD shown at {:.2}", kind, value);
        }

        channel.state != before
    }

    /// Run the refresh and hide timers due at `now`
    ///
    /// Returns `true` if any displayed state changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        let mut changed = false;
        for kind in HudKind::ALL {
            changed |= self.advance_kind(kind, now);
        }
        changed
    }

    fn advance_kind(&mut self, kind: HudKind, now: Instant) -> bool {
        let channel = self.channel_mut(kind);
        let refreshes = channel.refresh.poll(now);
        if channel.hide.poll(now) > 0 {
            channel.reset();
            debug!("{:?} HUD hidden", kind);
            return true;
        }
        if refreshes == 0 || !channel.state.is_active() {
            return false;
        }

        let value = self.read(kind);
        let channel = self.channel_mut(kind);
        let changed = channel.state.value != Some(value);
        channel.state.value = Some(value);
        changed
    }

    /// Displayed state of `kind`
    pub fn state(&self, kind: HudKind) -> &HudState {
        match kind {
            HudKind::Volume => &self.volume.state,
            HudKind::Brightness => &self.brightness.state,
        }
    }

    /// Cancel all timers and hide both HUDs
    pub fn reset(&mut self) {
        self.volume.reset();
        self.brightness.reset();
    }

    /// Earliest pending timer across both kinds
    pub fn next_deadline(&self) -> Option<Instant> {
        crate::utils::timer::earliest([
            self.volume.next_deadline(),
            self.brightness.next_deadline(),
        ])
    }

    fn channel_mut(&mut self, kind: HudKind) -> &mut HudChannel {
        match kind {
            HudKind::Volume => &mut self.volume,
            HudKind::Brightness => &mut self.brightness,
        }
    }

    fn read(&mut self, kind: HudKind) -> f32 {
        match kind {
            HudKind::Volume => self.volume_reader.read().displayed(),
            HudKind::Brightness => self.brightness_reader.brightness(),
        }
    }
}
