//! Coordinating logic
//!
//! The controller owns every piece of mutable UI-facing state and runs on a single thread.
//!
//! # Overview
//!
//! - [`HudCoordinator`]: volume/brightness HUD state machines with refresh and hide timers
//! - [`OverlayCoordinator`]: debounced clipboard overlay visibility from two hover inputs
//! - [`NotchController`]: the loop that owns both coordinators and the clipboard poller, drives
//!   every timer and sends [`NotchState`] snapshots to the renderer
//!
//! # Event Flow
//!
//! ```text
//! audio/brightness threads ─▶ ControllerHandle ─▶ NotchController ─▶ SignalBus ─▶ HudCoordinator
//!                                                       │
//! clipboard poller (timer) ────────────────────────────▶│──▶ NotchState ─▶ renderer
//!                                                       │
//! renderer hover/close/copy ─▶ ControllerHandle ───────▶ OverlayCoordinator
//! ```
//!
//! # Timing
//!
//! All timers are deadlines polled by the loop, which sleeps on its inbox until the earliest
//! one. Because every entry point takes the current `Instant`, the timing guarantees can be
//! exercised deterministically:
//!
//! - HUD: refresh every 100 ms for 10 ticks, hide 1.5 s after the last event
//! - Overlay: close 300 ms after the last hover was lost
//! - Clipboard: sample every 500 ms

pub mod hud;
pub mod notch_controller;
pub mod overlay;

pub use hud::{
    HUD_HIDE_DELAY, HUD_REFRESH_INTERVAL, HUD_REFRESH_TICKS, HudCoordinator, HudIcon, HudKind,
    HudState,
};
pub use notch_controller::{ControllerHandle, ControllerMessage, NotchController, NotchState};
pub use overlay::{OVERLAY_CLOSE_DELAY, OverlayCoordinator};
