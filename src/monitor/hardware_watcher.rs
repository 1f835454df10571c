//! Audio property watcher
//!
//! Keeps listeners registered for the default output device's volume and mute, and follows the
//! default device when it changes. Every volume or mute callback is posted to a [`SignalSink`] as
//! `volume-changed`; the sink is what moves the signal off the audio subsystem's thread.
//!
//! # Device switches
//!
//! When the default device changes, the listeners on the old device are removed and new ones are
//! registered against the new device. A callback still in flight for the old device is dropped by
//! comparing the device it was registered for with the currently bound device, so one hardware
//! change never produces two signals.
//!
//! Callbacks hold only a weak reference to the watcher state, so a dropped watcher never keeps
//! receiving events through listeners the subsystem failed to remove.

use crate::bus::{SignalSink, Topic};
use crate::hardware::{AudioObject, AudioProperty, AudioSubsystem, DeviceId, ListenerId};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, info, trace, warn};

/// Listener bookkeeping, guarded by the watcher mutex
#[derive(Debug, Default)]
struct WatcherState {
    monitoring: bool,
    /// Device the volume/mute listeners are bound to (`UNKNOWN` when unbound)
    device: DeviceId,
    default_listener: Option<ListenerId>,
    volume_listener: Option<ListenerId>,
    mute_listener: Option<ListenerId>,
}

struct WatcherInner {
    audio: Arc<dyn AudioSubsystem>,
    sink: Arc<dyn SignalSink>,
    state: Mutex<WatcherState>,
}

/// Watches the default output device for volume and mute changes
pub struct HardwareWatcher {
    inner: Arc<WatcherInner>,
}

impl HardwareWatcher {
    /// Watcher over `audio` that posts `volume-changed` to `sink`
    pub fn new(audio: Arc<dyn AudioSubsystem>, sink: Arc<dyn SignalSink>) -> Self {
        Self {
            inner: Arc::new(WatcherInner {
                audio,
                sink,
                state: Mutex::new(WatcherState::default()),
            }),
        }
    }

    /// Register the default-device listener and bind volume/mute listeners to the current device
    ///
    /// Registration failures are logged and leave that signal missing. Calling this while already
    /// monitoring does nothing.
    pub fn start_monitoring(&self) {
        let mut state = self.inner.state.lock();
        if state.monitoring {
            debug!("Hardware watcher already monitoring");
            return;
        }
        info!("Starting audio property monitoring");
        state.monitoring = true;

        let weak = Arc::downgrade(&self.inner);
        match self.inner.audio.add_listener(
            AudioObject::System,
            AudioProperty::DefaultOutputDevice,
            Arc::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.on_default_device_changed();
                }
            }),
        ) {
            Ok(id) => state.default_listener = Some(id),
            Err(e) => warn!("Default output device changes will be missed: {}", e),
        }

        match self.inner.audio.default_output_device() {
            Ok(device) => self.inner.bind_device(&mut state, device),
            Err(e) => warn!("No default output device, volume changes will be missed: {}", e),
        }
    }

    /// Remove every listener. Safe to call without a prior start, and idempotent.
    pub fn stop_monitoring(&self) {
        let mut state = self.inner.state.lock();
        if !state.monitoring {
            return;
        }
        info!("Stopping audio property monitoring");
        state.monitoring = false;

        if let Some(id) = state.default_listener.take() {
            self.inner.remove(id);
        }
        self.inner.unbind_device(&mut state);
    }

    /// Whether listeners are (nominally) registered
    pub fn is_monitoring(&self) -> bool {
        self.inner.state.lock().monitoring
    }

    /// Device the volume and mute listeners are bound to
    pub fn current_device(&self) -> DeviceId {
        self.inner.state.lock().device
    }
}

impl Drop for HardwareWatcher {
    fn drop(&mut self) {
        self.stop_monitoring();
    }
}

impl WatcherInner {
    fn on_default_device_changed(self: &Arc<Self>) {
        let device = match self.audio.default_output_device() {
            Ok(device) => device,
            Err(e) => {
                warn!("Default output device changed but cannot be resolved: {}", e);
                return;
            }
        };

        let mut state = self.state.lock();
        if !state.monitoring || state.device == device {
            return;
        }
        info!("Default output device changed: {} -> {}", state.device, device);
        self.unbind_device(&mut state);
        self.bind_device(&mut state, device);
    }

    fn on_device_property(&self, device: DeviceId, property: AudioProperty) {
        {
            let state = self.state.lock();
            if !state.monitoring || state.device != device {
                trace!("Dropping {} change from unbound {}", property.name(), device);
                return;
            }
        }
        trace!("{} changed on {}", property.name(), device);
        self.sink.post(Topic::VolumeChanged);
    }

    fn bind_device(self: &Arc<Self>, state: &mut WatcherState, device: DeviceId) {
        state.device = device;
        if !device.is_known() {
            return;
        }
        state.volume_listener = self.register_device_listener(device, AudioProperty::VolumeScalar);
        state.mute_listener = self.register_device_listener(device, AudioProperty::Mute);
        debug!("Bound volume listeners to {}", device);
    }

    fn unbind_device(&self, state: &mut WatcherState) {
        if !state.device.is_known() {
            return;
        }
        for id in [state.volume_listener.take(), state.mute_listener.take()]
            .into_iter()
            .flatten()
        {
            self.remove(id);
        }
        state.device = DeviceId::UNKNOWN;
    }

    fn register_device_listener(
        self: &Arc<Self>,
        device: DeviceId,
        property: AudioProperty,
    ) -> Option<ListenerId> {
        let object = AudioObject::Device(device);
        if !self.audio.has_property(object, property) {
            debug!("{} has no {} property", device, property.name());
            return None;
        }

        let weak: Weak<Self> = Arc::downgrade(self);
        let listener = Arc::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_device_property(device, property);
            }
        });
        match self.audio.add_listener(object, property, listener) {
            Ok(id) => Some(id),
            Err(e) => {
                warn!("{} changes on {} will be missed: {}", property.name(), device, e);
                None
            }
        }
    }

    fn remove(&self, id: ListenerId) {
        if let Err(e) = self.audio.remove_listener(id) {
            debug!("Failed to remove listener {:?}: {}", id, e);
        }
    }
}
