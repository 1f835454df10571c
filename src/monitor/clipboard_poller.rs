//! Clipboard sampling
//!
//! The host clipboard offers no change notification, only a change counter. [`ClipboardPoller`]
//! samples that counter every [`CLIPBOARD_POLL_INTERVAL`] and re-reads the text only when the
//! counter moved. New non-empty text goes to the front of the history and `clipboard-changed` is
//! published.
//!
//! The poller is driven by the coordinating thread: it owns a deadline timer that the controller
//! advances with the current time, so no sampling happens concurrently with history reads.

use crate::bus::{SignalBus, Topic};
use crate::clipboard::{ClipboardHistory, ClipboardHost};
use crate::error::{NotchError, Result};
use crate::utils::CancellableTimer;
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

/// Interval between clipboard samples
pub const CLIPBOARD_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Samples the host clipboard and maintains the clipboard history
pub struct ClipboardPoller {
    host: Box<dyn ClipboardHost>,
    bus: SignalBus,
    history: ClipboardHistory,
    /// Change counter of the last successfully processed sample
    last_seen: Option<u64>,
    timer: CancellableTimer,
}

impl ClipboardPoller {
    /// Create a stopped poller over `host`, publishing on `bus`
    pub fn new(host: Box<dyn ClipboardHost>, bus: SignalBus) -> Self {
        Self {
            host,
            bus,
            history: ClipboardHistory::new(),
            last_seen: None,
            timer: CancellableTimer::repeating(CLIPBOARD_POLL_INTERVAL, None),
        }
    }

    /// Check the clipboard immediately, then sample every [`CLIPBOARD_POLL_INTERVAL`] from `now`
    ///
    /// Starting a running poller restarts its sampling schedule.
    pub fn start(&mut self, now: Instant) {
        info!("Starting clipboard polling");
        self.check();
        self.timer.start(now);
    }

    /// Stop sampling. Idempotent.
    pub fn stop(&mut self) {
        if self.timer.cancel() {
            info!("Stopped clipboard polling");
        }
    }

    /// Whether sampling is scheduled
    pub fn is_running(&self) -> bool {
        self.timer.is_armed()
    }

    /// Run the samples due at `now`
    ///
    /// Several missed ticks collapse into a single sample. Returns `true` if the history changed.
    pub fn advance(&mut self, now: Instant) -> bool {
        if self.timer.poll(now) == 0 {
            return false;
        }
        self.check()
    }

    /// Next time a sample is due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Sample the clipboard once. Returns `true` if the history changed.
    pub fn check(&mut self) -> bool {
        let count = match self.host.change_count() {
            Ok(count) => count,
            Err(e) => {
                skip_sample(&e);
                return false;
            }
        };
        if self.last_seen == Some(count) {
            return false;
        }

        let text = match self.host.read_text() {
            Ok(text) => text,
            Err(e) => {
                skip_sample(&e);
                return false;
            }
        };
        self.last_seen = Some(count);

        let Some(text) = text else {
            trace!("Clipboard changed to non-text content");
            return false;
        };
        if !self.history.record(text, Utc::now()) {
            return false;
        }

        debug!("Clipboard history updated ({} entries)", self.history.len());
        self.bus.publish(Topic::ClipboardChanged);
        true
    }

    /// Place `text` on the host clipboard
    ///
    /// The history is not touched here; the next sample picks the text up and moves it to the
    /// front.
    pub fn copy(&mut self, text: &str) -> Result<()> {
        self.host.write_text(text)?;
        debug!("Copied {} chars to clipboard", text.chars().count());
        Ok(())
    }

    /// Current history, most recent first
    pub fn history(&self) -> &ClipboardHistory {
        &self.history
    }
}

/// Log a failed sample; the next tick retries either way
fn skip_sample(error: &NotchError) {
    if error.is_transient() {
        debug!("Skipping clipboard sample: {}", error);
    } else {
        warn!("Clipboard sample failed: {}", error);
    }
}
