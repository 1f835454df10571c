//! Listener emulation over a sampling audio backend
//!
//! Some platform APIs only offer property reads, not change notifications (or offer them through
//! callback interfaces that are heavy to host). [`PolledAudioSubsystem`] turns such a backend into
//! an [`AudioSubsystem`] by sampling the default device, and the volume and mute of every device
//! that has listeners, on a background thread. A listener fires when the value it watches differs
//! from the previous sample. The first sample after a registration is a baseline and never fires.
//!
//! Listeners run on the sampling thread with no internal lock held, so a listener may add or
//! remove listeners (which is exactly what a default-device listener does).

use crate::error::{NotchError, Result, StringError};
use crate::hardware::audio::{
    AudioObject, AudioProperty, AudioSubsystem, DeviceId, ListenerId, PropertyListener,
};
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Volume deltas below this are treated as sampling noise
const VOLUME_EPSILON: f32 = 1e-4;

/// Read-only audio backend sampled by [`PolledAudioSubsystem`]
pub trait AudioEndpoint: Send + Sync + 'static {
    /// Current default output device
    fn default_output_device(&self) -> Result<DeviceId>;

    /// Scalar output volume of `device`
    fn volume_scalar(&self, device: DeviceId) -> Result<f32>;

    /// Output mute state of `device`
    fn is_muted(&self, device: DeviceId) -> Result<bool>;

    /// Whether `object` exposes `property`
    fn supports(&self, object: AudioObject, property: AudioProperty) -> bool {
        matches!(
            (object, property),
            (AudioObject::System, AudioProperty::DefaultOutputDevice)
                | (
                    AudioObject::Device(_),
                    AudioProperty::VolumeScalar | AudioProperty::Mute
                )
        )
    }
}

struct Registration {
    object: AudioObject,
    property: AudioProperty,
    listener: PropertyListener,
}

/// Values seen by the previous sampling pass
#[derive(Default)]
struct Sample {
    default_device: Option<DeviceId>,
    volumes: HashMap<DeviceId, f32>,
    mutes: HashMap<DeviceId, bool>,
}

struct Shared<E> {
    endpoint: E,
    listeners: Mutex<HashMap<ListenerId, Registration>>,
    next_id: AtomicU64,
    running: AtomicBool,
    interval: Duration,
}

/// [`AudioSubsystem`] that emulates property listeners by sampling an [`AudioEndpoint`]
///
/// The sampling thread starts with the first listener registration and stops when the subsystem
/// is dropped.
pub struct PolledAudioSubsystem<E: AudioEndpoint> {
    shared: Arc<Shared<E>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<E: AudioEndpoint> PolledAudioSubsystem<E> {
    /// Wrap `endpoint`, sampling it every `interval` while listeners exist
    pub fn new(endpoint: E, interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                endpoint,
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                running: AtomicBool::new(false),
                interval,
            }),
            worker: Mutex::new(None),
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.shared.listeners.lock().len()
    }

    /// Whether the sampling thread is running
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    fn ensure_worker(&self) -> Result<()> {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return Ok(());
        }

        self.shared.running.store(true, Ordering::SeqCst);
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("audio-sampler".to_string())
            .spawn(move || shared.run())
            .map_err(|e| {
                self.shared.running.store(false, Ordering::SeqCst);
                NotchError::AudioUnavailable(Box::new(e))
            })?;
        *worker = Some(handle);
        Ok(())
    }

    fn stop(&self) {
        self.shared.running.store(false, Ordering::SeqCst);
        let Some(handle) = self.worker.lock().take() else {
            return;
        };
        // A listener holding the last owner can drop us on the sampling thread itself
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!("Audio sampling thread panicked");
        }
    }
}

impl<E: AudioEndpoint> Drop for PolledAudioSubsystem<E> {
    fn drop(&mut self) {
        self.stop();
    }
}

impl<E: AudioEndpoint> AudioSubsystem for PolledAudioSubsystem<E> {
    fn default_output_device(&self) -> Result<DeviceId> {
        self.shared.endpoint.default_output_device()
    }

    fn has_property(&self, object: AudioObject, property: AudioProperty) -> bool {
        self.shared.endpoint.supports(object, property)
    }

    fn add_listener(
        &self,
        object: AudioObject,
        property: AudioProperty,
        listener: PropertyListener,
    ) -> Result<ListenerId> {
        if !self.shared.endpoint.supports(object, property) {
            return Err(NotchError::ListenerRegistration {
                property: property.name(),
                source: StringError::new(format!("{object:?} does not expose {}", property.name())),
            });
        }
        if let AudioObject::Device(device) = object {
            if !device.is_known() {
                return Err(NotchError::ListenerRegistration {
                    property: property.name(),
                    source: StringError::new("device is not resolved"),
                });
            }
        }

        let id = ListenerId(self.shared.next_id.fetch_add(1, Ordering::SeqCst));
        self.shared.listeners.lock().insert(
            id,
            Registration {
                object,
                property,
                listener,
            },
        );
        trace!("Registered {} listener {:?} on {:?}", property.name(), id, object);

        self.ensure_worker()?;
        Ok(id)
    }

    fn remove_listener(&self, id: ListenerId) -> Result<()> {
        match self.shared.listeners.lock().remove(&id) {
            Some(registration) => {
                trace!(
                    "Removed {} listener {:?}",
                    registration.property.name(),
                    id
                );
                Ok(())
            }
            None => Err(NotchError::ListenerRegistration {
                property: "unknown",
                source: StringError::new(format!("listener {id:?} is not registered")),
            }),
        }
    }

    fn volume_scalar(&self, device: DeviceId) -> Result<f32> {
        self.shared.endpoint.volume_scalar(device)
    }

    fn is_muted(&self, device: DeviceId) -> Result<bool> {
        self.shared.endpoint.is_muted(device)
    }
}

impl<E: AudioEndpoint> Shared<E> {
    fn run(&self) {
        info!("Audio sampler started with interval {:?}", self.interval);
        let mut previous = Sample::default();
        while self.running.load(Ordering::SeqCst) {
            self.sample(&mut previous);
            thread::sleep(self.interval);
        }
        info!("Audio sampler stopped");
    }

    /// One sampling pass: compare against `previous`, fire changed listeners, update `previous`
    fn sample(&self, previous: &mut Sample) {
        match self.endpoint.default_output_device() {
            Ok(device) => {
                let changed = previous.default_device.is_some_and(|last| last != device);
                previous.default_device = Some(device);
                if changed {
                    debug!("Default output device changed to {}", device);
                    self.fire(AudioObject::System, AudioProperty::DefaultOutputDevice);
                }
            }
            Err(e) => trace!("Default device sample failed: {}", e),
        }

        let devices: SmallVec<[DeviceId; 2]> = {
            let listeners = self.listeners.lock();
            let mut devices = SmallVec::new();
            for registration in listeners.values() {
                if let AudioObject::Device(device) = registration.object {
                    if !devices.contains(&device) {
                        devices.push(device);
                    }
                }
            }
            devices
        };
        previous.volumes.retain(|device, _| devices.contains(device));
        previous.mutes.retain(|device, _| devices.contains(device));

        for device in devices {
            if let Ok(volume) = self.endpoint.volume_scalar(device) {
                let changed = previous
                    .volumes
                    .insert(device, volume)
                    .is_some_and(|last| (last - volume).abs() > VOLUME_EPSILON);
                if changed {
                    self.fire(AudioObject::Device(device), AudioProperty::VolumeScalar);
                }
            }
            if let Ok(muted) = self.endpoint.is_muted(device) {
                let changed = previous
                    .mutes
                    .insert(device, muted)
                    .is_some_and(|last| last != muted);
                if changed {
                    self.fire(AudioObject::Device(device), AudioProperty::Mute);
                }
            }
        }
    }

    fn fire(&self, object: AudioObject, property: AudioProperty) {
        let listeners: SmallVec<[PropertyListener; 2]> = self
            .listeners
            .lock()
            .values()
            .filter(|r| r.object == object && r.property == property)
            .map(|r| Arc::clone(&r.listener))
            .collect();

        for listener in listeners {
            listener();
        }
    }
}
