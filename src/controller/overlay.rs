//! Clipboard history overlay visibility
//!
//! Two hover inputs keep the overlay open: the indicator (the notch itself) and the history list.
//! Moving the pointer from one to the other produces a brief moment where neither is hovered, so
//! losing hover only schedules a close [`OVERLAY_CLOSE_DELAY`] later. Regaining either hover
//! before then cancels the close and the overlay never flickers.

use crate::utils::CancellableTimer;
use std::time::{Duration, Instant};
use tracing::trace;

/// Grace period between losing hover and hiding the overlay
pub const OVERLAY_CLOSE_DELAY: Duration = Duration::from_millis(300);

/// Debounced overlay visibility
#[derive(Debug)]
pub struct OverlayCoordinator {
    indicator_hovered: bool,
    history_hovered: bool,
    visible: bool,
    close_timer: CancellableTimer,
}

impl OverlayCoordinator {
    /// Hidden overlay with no hover
    pub fn new() -> Self {
        Self {
            indicator_hovered: false,
            history_hovered: false,
            visible: false,
            close_timer: CancellableTimer::one_shot(OVERLAY_CLOSE_DELAY),
        }
    }

    /// Pointer entered (`true`) or left (`false`) the indicator.
    ///
    /// Returns `true` if visibility changed.
    pub fn on_indicator_hover(&mut self, hovered: bool, now: Instant) -> bool {
        self.indicator_hovered = hovered;
        self.hover_changed(now)
    }

    /// Pointer entered (`true`) or left (`false`) the history list.
    ///
    /// Returns `true` if visibility changed.
    pub fn on_history_hover(&mut self, hovered: bool, now: Instant) -> bool {
        self.history_hovered = hovered;
        self.hover_changed(now)
    }

    fn hover_changed(&mut self, now: Instant) -> bool {
        if self.indicator_hovered || self.history_hovered {
            self.close_timer.cancel();
            let changed = !self.visible;
            self.visible = true;
            return changed;
        }
        if self.visible {
            trace!("Overlay hover lost, closing in {:?}", OVERLAY_CLOSE_DELAY);
            self.close_timer.start(now);
        }
        false
    }

    /// Hide immediately and forget both hover inputs. Returns `true` if it was visible.
    pub fn close(&mut self) -> bool {
        self.indicator_hovered = false;
        self.history_hovered = false;
        self.close_timer.cancel();
        std::mem::replace(&mut self.visible, false)
    }

    /// Run the close timer. Returns `true` if the overlay was hidden.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.close_timer.poll(now) == 0 {
            return false;
        }
        if self.indicator_hovered || self.history_hovered || !self.visible {
            return false;
        }
        self.visible = false;
        trace!("Overlay closed after hover grace period");
        true
    }

    /// Whether the overlay is shown
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether the pointer is over the indicator
    pub fn is_indicator_hovered(&self) -> bool {
        self.indicator_hovered
    }

    /// Whether the pointer is over the history list
    pub fn is_history_hovered(&self) -> bool {
        self.history_hovered
    }

    /// Pending close deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.close_timer.deadline()
    }
}

impl Default for OverlayCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
