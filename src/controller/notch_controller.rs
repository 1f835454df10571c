//! Notch controller implementation
//!
//! [`NotchController`] is the single coordinating thread. Everything that mutates HUD, overlay
//! or clipboard history state happens inside its loop; other threads only send it
//! [`ControllerMessage`]s through a [`ControllerHandle`].

use crate::bus::{SignalBus, SignalSink, SubscriptionHandle, Topic};
use crate::clipboard::ClipboardEntry;
use crate::config::UserPreferences;
use crate::controller::hud::{HudCoordinator, HudKind, HudState};
use crate::controller::overlay::OverlayCoordinator;
use crate::monitor::ClipboardPoller;
use crate::utils::timer::earliest;
use parking_lot::Mutex;
use serde::Serialize;
use smallvec::SmallVec;
use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Longest the loop sleeps when no timer is armed
const IDLE_WAIT: Duration = Duration::from_secs(1);

/// How soon the loop retries a snapshot the renderer had no room for
const STATE_RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// Messages accepted by the controller loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerMessage {
    /// A change signal raised on another thread, to be published on the bus
    Signal(Topic),
    /// Pointer entered or left the indicator
    IndicatorHover(bool),
    /// Pointer entered or left the history list
    HistoryHover(bool),
    /// Close the overlay immediately (e.g. after an item was picked)
    CloseOverlay,
    /// Put text on the clipboard
    Copy(String),
    /// Leave the loop
    Shutdown,
}

/// Cloneable sender into the controller loop
///
/// This is the only way foreign threads reach the coordinating thread.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    sender: mpsc::Sender<ControllerMessage>,
}

impl ControllerHandle {
    /// Queue `message`. Returns `false` if the controller is gone.
    pub fn send(&self, message: ControllerMessage) -> bool {
        match self.sender.send(message) {
            Ok(()) => true,
            Err(e) => {
                debug!("Controller is gone, dropping {:?}", e.0);
                false
            }
        }
    }

    /// Report indicator hover
    pub fn indicator_hover(&self, hovered: bool) {
        self.send(ControllerMessage::IndicatorHover(hovered));
    }

    /// Report history list hover
    pub fn history_hover(&self, hovered: bool) {
        self.send(ControllerMessage::HistoryHover(hovered));
    }

    /// Close the overlay
    pub fn close_overlay(&self) {
        self.send(ControllerMessage::CloseOverlay);
    }

    /// Copy `text` to the clipboard
    pub fn copy(&self, text: impl Into<String>) {
        self.send(ControllerMessage::Copy(text.into()));
    }

    /// Ask the loop to exit
    pub fn shutdown(&self) {
        self.send(ControllerMessage::Shutdown);
    }
}

impl SignalSink for ControllerHandle {
    fn post(&self, topic: Topic) {
        self.send(ControllerMessage::Signal(topic));
    }
}

/// State snapshot sent to the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotchState {
    /// Volume HUD
    pub volume: HudState,
    /// Brightness HUD
    pub brightness: HudState,
    /// Whether the clipboard overlay should be drawn (never while the history is empty)
    pub overlay_visible: bool,
    /// Clipboard history, most recent first
    pub history: Vec<ClipboardEntry>,
    /// Whether to force the notch size on screens without a hardware notch
    pub force_notch_size: bool,
}

/// Coordinating thread for HUD, overlay and clipboard state
pub struct NotchController {
    bus: SignalBus,
    inbox: Option<mpsc::Receiver<ControllerMessage>>,
    state_sender: mpsc::SyncSender<NotchState>,
    poller: ClipboardPoller,
    hud: HudCoordinator,
    overlay: OverlayCoordinator,
    force_notch_size: bool,
    /// HUD kinds delivered by the bus since the last drain
    hud_events: Arc<Mutex<SmallVec<[HudKind; 4]>>>,
    subscriptions: SmallVec<[SubscriptionHandle; 2]>,
    /// The renderer's channel was full when the latest state changed
    state_pending: bool,
    started: bool,
}

impl NotchController {
    /// Create the controller and the handle other threads use to reach it
    ///
    /// The HUD coordinator is fed through bus subscriptions, so any producer publishing
    /// `volume-changed` or `brightness-changed` on `bus` drives the HUD.
    pub fn new(
        preferences: &UserPreferences,
        bus: SignalBus,
        poller: ClipboardPoller,
        mut hud: HudCoordinator,
        state_sender: mpsc::SyncSender<NotchState>,
    ) -> (Self, ControllerHandle) {
        let (sender, inbox) = mpsc::channel();
        hud.set_enabled(preferences.hud_enabled);

        let hud_events: Arc<Mutex<SmallVec<[HudKind; 4]>>> = Arc::default();
        let subscriptions = HudKind::ALL
            .into_iter()
            .map(|kind| {
                let events = Arc::clone(&hud_events);
                bus.subscribe(kind.topic(), move |_| events.lock().push(kind))
            })
            .collect();

        let controller = Self {
            bus,
            inbox: Some(inbox),
            state_sender,
            poller,
            hud,
            overlay: OverlayCoordinator::new(),
            force_notch_size: preferences.force_notch_size,
            hud_events,
            subscriptions,
            state_pending: false,
            started: false,
        };
        (controller, ControllerHandle { sender })
    }

    /// Bus the controller publishes on
    pub fn bus(&self) -> &SignalBus {
        &self.bus
    }

    /// Start clipboard sampling and send the first snapshot. Idempotent.
    pub fn start(&mut self, now: Instant) {
        if self.started {
            return;
        }
        self.started = true;
        self.poller.start(now);
        self.send_state();
    }

    /// Run the controller loop on the calling thread until shutdown or until every handle is
    /// dropped
    pub fn run(&mut self) {
        let Some(inbox) = self.inbox.take() else {
            warn!("Controller loop already running; run() call ignored");
            return;
        };

        info!("Entering notch controller loop");
        self.start(Instant::now());
        loop {
            let now = Instant::now();
            self.advance(now);

            let mut timeout = self
                .next_deadline()
                .map_or(IDLE_WAIT, |deadline| deadline.saturating_duration_since(now));
            if self.state_pending {
                timeout = timeout.min(STATE_RETRY_INTERVAL);
            }
            match inbox.recv_timeout(timeout) {
                Ok(message) => {
                    if !self.handle_message(message, Instant::now()) {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    warn!("All controller handles dropped. Exiting controller loop.");
                    break;
                }
            }
        }

        self.shutdown();
        info!("Notch controller loop exited");
    }

    /// Apply one message at `now`. Returns `false` when the loop should exit.
    pub fn handle_message(&mut self, message: ControllerMessage, now: Instant) -> bool {
        trace!("Controller message: {:?}", message);
        let changed = match message {
            ControllerMessage::Signal(topic) => self.publish(topic, now),
            ControllerMessage::IndicatorHover(hovered) => {
                self.overlay.on_indicator_hover(hovered, now)
            }
            ControllerMessage::HistoryHover(hovered) => self.overlay.on_history_hover(hovered, now),
            ControllerMessage::CloseOverlay => self.overlay.close(),
            ControllerMessage::Copy(text) => {
                if let Err(e) = self.poller.copy(&text) {
                    warn!("Failed to copy to clipboard: {}", e);
                }
                false
            }
            ControllerMessage::Shutdown => {
                info!("Controller shutdown requested");
                return false;
            }
        };

        if changed {
            self.send_state();
        }
        true
    }

    /// Run every timer due at `now`, sending a snapshot if anything visible changed
    ///
    /// A snapshot the renderer previously had no room for is retried here with the current state.
    pub fn advance(&mut self, now: Instant) {
        let mut changed = self.poller.advance(now);
        changed |= self.drain_hud_events(now);
        changed |= self.hud.advance(now);
        changed |= self.overlay.advance(now);
        if changed || self.state_pending {
            self.send_state();
        }
    }

    /// Earliest armed timer
    pub fn next_deadline(&self) -> Option<Instant> {
        earliest([
            self.poller.next_deadline(),
            self.hud.next_deadline(),
            self.overlay.next_deadline(),
        ])
    }

    /// Whether the renderer has not yet received the latest state
    pub fn has_pending_state(&self) -> bool {
        self.state_pending
    }

    /// Current snapshot
    pub fn state(&self) -> NotchState {
        let history = self.poller.history();
        NotchState {
            volume: *self.hud.state(HudKind::Volume),
            brightness: *self.hud.state(HudKind::Brightness),
            overlay_visible: self.overlay.is_visible() && !history.is_empty(),
            history: history.snapshot(),
            force_notch_size: self.force_notch_size,
        }
    }

    /// Stop sampling, cancel every timer, hide everything and drop the bus subscriptions
    pub fn shutdown(&mut self) {
        self.poller.stop();
        self.hud.reset();
        self.overlay.close();
        for handle in self.subscriptions.drain(..) {
            self.bus.unsubscribe(handle);
        }
        self.hud_events.lock().clear();
        self.started = false;
    }

    fn publish(&mut self, topic: Topic, now: Instant) -> bool {
        self.bus.publish(topic);
        let hud_changed = self.drain_hud_events(now);
        hud_changed || topic == Topic::ClipboardChanged
    }

    fn drain_hud_events(&mut self, now: Instant) -> bool {
        let events = std::mem::take(&mut *self.hud_events.lock());
        let mut changed = false;
        for kind in events {
            changed |= self.hud.on_event(kind, now);
        }
        changed
    }

    /// Offer the current state to the renderer without blocking
    ///
    /// When the channel is full the state is marked pending and re-sent, freshly built, on the
    /// next loop pass. Intermediate states may be skipped; the latest one always lands.
    fn send_state(&mut self) {
        match self.state_sender.try_send(self.state()) {
            Ok(()) => {
                self.state_pending = false;
                trace!("State snapshot sent");
            }
            Err(TrySendError::Full(_)) => {
                if !self.state_pending {
                    debug!("Renderer is behind, holding the latest state for retry");
                }
                self.state_pending = true;
            }
            Err(TrySendError::Disconnected(_)) => {
                self.state_pending = false;
                debug!("Renderer is gone, dropping state snapshot");
            }
        }
    }
}
