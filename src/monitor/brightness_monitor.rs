//! Display brightness polling
//!
//! Brightness has no portable change notification, so a background thread samples the
//! [`BrightnessSource`] and posts `brightness-changed` whenever the level moves. The first sample
//! only establishes a baseline. Failed samples are skipped and do not reset the baseline.

use crate::bus::{SignalSink, Topic};
use crate::hardware::BrightnessSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Level deltas below this are not reported
const BRIGHTNESS_EPSILON: f32 = 0.001;

/// Background poller posting `brightness-changed`
pub struct BrightnessMonitor {
    source: Arc<dyn BrightnessSource>,
    sink: Arc<dyn SignalSink>,
    interval: Duration,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl BrightnessMonitor {
    /// Monitor `source` every `interval`, posting to `sink`
    pub fn new(
        source: Arc<dyn BrightnessSource>,
        sink: Arc<dyn SignalSink>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            sink,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    /// Spawn the sampling thread. Does nothing if already running.
    pub fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Brightness monitor already running");
            return;
        }

        let running = Arc::clone(&self.running);
        let source = Arc::clone(&self.source);
        let sink = Arc::clone(&self.sink);
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name("brightness-monitor".to_string())
            .spawn(move || {
                info!("Brightness monitor started with interval {:?}", interval);
                let mut last = None;
                while running.load(Ordering::SeqCst) {
                    if sample(source.as_ref(), &mut last) {
                        sink.post(Topic::BrightnessChanged);
                    }
                    thread::sleep(interval);
                }
                info!("Brightness monitor stopped");
            });

        match spawned {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => {
                warn!("Failed to spawn brightness monitor: {}", e);
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Stop the sampling thread and wait for it. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Brightness monitor thread panicked");
            }
        }
    }

    /// Whether the sampling thread is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for BrightnessMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Take one sample; returns `true` if the level moved since the last successful sample
fn sample(source: &dyn BrightnessSource, last: &mut Option<f32>) -> bool {
    let level = match source.brightness() {
        Ok(level) => level,
        Err(e) => {
            trace!("Brightness sample failed: {}", e);
            return false;
        }
    };
    let changed = last.is_some_and(|previous| (previous - level).abs() > BRIGHTNESS_EPSILON);
    *last = Some(level);
    if changed {
        debug!("Brightness changed to {:.3}", level);
    }
    changed
}
