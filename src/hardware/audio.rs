//! Audio subsystem abstraction
//!
//! Mirrors the shape of an OS audio object model: a system object that knows the default output
//! device, device objects that carry volume and mute properties, and property listeners that the
//! OS invokes on a thread of its choosing. Listener lifetime is tied to the object it was
//! registered on, so a listener on one device never fires for another.

use crate::error::Result;
use std::fmt;
use std::sync::Arc;

/// Handle of an audio device. `0` means "no device resolved yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub u32);

impl DeviceId {
    /// Unresolved device handle
    pub const UNKNOWN: Self = Self(0);

    /// Whether this handle refers to a resolved device
    pub fn is_known(self) -> bool {
        self != Self::UNKNOWN
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "device#{}", self.0)
    }
}

/// Object a property belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioObject {
    /// The audio system as a whole
    System,
    /// A specific device
    Device(DeviceId),
}

/// Observable audio properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioProperty {
    /// Default output device of the system object
    DefaultOutputDevice,
    /// Scalar output volume of a device (0.0-1.0)
    VolumeScalar,
    /// Output mute state of a device
    Mute,
}

impl AudioProperty {
    /// Human readable property name used in logs and errors
    pub const fn name(self) -> &'static str {
        match self {
            Self::DefaultOutputDevice => "default-output-device",
            Self::VolumeScalar => "volume",
            Self::Mute => "mute",
        }
    }
}

/// Token identifying a registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Callback fired by the audio subsystem when a property changes
///
/// Invoked on an arbitrary thread owned by the subsystem.
pub type PropertyListener = Arc<dyn Fn() + Send + Sync>;

/// OS audio subsystem: device lookup, property reads, property listeners
///
/// Every primitive is fallible and callers treat failures as degraded functionality.
pub trait AudioSubsystem: Send + Sync {
    /// Resolve the current default output device
    fn default_output_device(&self) -> Result<DeviceId>;

    /// Whether `object` exposes `property`
    fn has_property(&self, object: AudioObject, property: AudioProperty) -> bool;

    /// Register `listener` for changes of `property` on `object`
    fn add_listener(
        &self,
        object: AudioObject,
        property: AudioProperty,
        listener: PropertyListener,
    ) -> Result<ListenerId>;

    /// Unregister a listener
    ///
    /// An invocation already in flight on the subsystem's thread may still complete after this
    /// returns, so listeners must tolerate one late call.
    fn remove_listener(&self, id: ListenerId) -> Result<()>;

    /// Scalar output volume of `device`
    fn volume_scalar(&self, device: DeviceId) -> Result<f32>;

    /// Output mute state of `device`
    fn is_muted(&self, device: DeviceId) -> Result<bool>;
}
