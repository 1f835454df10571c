//! Windows Core Audio endpoint backend
//!
//! Reads the default render endpoint through `IMMDeviceEnumerator` and `IAudioEndpointVolume`.
//! Device handles are derived from the endpoint id string, so the same physical endpoint always
//! maps to the same [`DeviceId`] and a default-device switch shows up as a different handle.
//!
//! Only the current default endpoint can be read. Asking for any other device is an error, which
//! callers already treat as a transient read failure.

use crate::error::{NotchError, Result, StringError};
use crate::hardware::audio::DeviceId;
use crate::hardware::polled::AudioEndpoint;
use std::hash::{DefaultHasher, Hash, Hasher};
use windows::Win32::Media::Audio::Endpoints::IAudioEndpointVolume;
use windows::Win32::Media::Audio::{
    IMMDevice, IMMDeviceEnumerator, MMDeviceEnumerator, eMultimedia, eRender,
};
use windows::Win32::System::Com::{
    CLSCTX_ALL, COINIT_MULTITHREADED, CoCreateInstance, CoInitializeEx, CoTaskMemFree,
    CoUninitialize,
};

/// Balances a successful `CoInitializeEx` on drop
struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    #[expect(
        unsafe_code,
        reason = "Windows FFI for CoInitializeEx; reserved pointer is None and the flags are valid"
    )]
    fn new() -> Self {
        // SAFETY: reserved parameter must be None; S_FALSE (already initialized) still needs a
        // matching CoUninitialize, which HRESULT::is_ok covers
        let hr = unsafe { CoInitializeEx(None, COINIT_MULTITHREADED) };
        Self {
            initialized: hr.is_ok(),
        }
    }
}

impl Drop for ComGuard {
    #[expect(unsafe_code, reason = "Windows FFI for CoUninitialize paired with CoInitializeEx")]
    fn drop(&mut self) {
        if self.initialized {
            // SAFETY: paired with the successful CoInitializeEx in ComGuard::new on this thread
            unsafe { CoUninitialize() };
        }
    }
}

/// Default render endpoint reader
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsAudioEndpoint;

impl WindowsAudioEndpoint {
    /// Create the backend; COM is initialized per call on the calling thread
    pub fn new() -> Self {
        Self
    }

    #[expect(
        unsafe_code,
        reason = "Windows FFI for CoCreateInstance and GetDefaultAudioEndpoint"
    )]
    fn default_endpoint() -> Result<IMMDevice> {
        // SAFETY: MMDeviceEnumerator is the documented CLSID for IMMDeviceEnumerator; both calls
        // return owned interface pointers released on drop
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(|e| NotchError::AudioUnavailable(Box::new(e)))?;
            enumerator
                .GetDefaultAudioEndpoint(eRender, eMultimedia)
                .map_err(|e| NotchError::AudioUnavailable(Box::new(e)))
        }
    }

    #[expect(
        unsafe_code,
        reason = "Windows FFI for IMMDevice::GetId; the returned PWSTR is freed with CoTaskMemFree"
    )]
    fn device_id(device: &IMMDevice) -> Result<DeviceId> {
        // SAFETY: GetId returns a CoTaskMemAlloc'd, NUL-terminated string that we own and free
        // exactly once after copying it
        let id = unsafe {
            let raw = device
                .GetId()
                .map_err(|e| NotchError::audio_property("default-output-device", e.to_string()))?;
            let text = raw.to_string();
            CoTaskMemFree(Some(raw.0 as *const _));
            text.map_err(|e| NotchError::audio_property("default-output-device", e.to_string()))?
        };
        Ok(hash_endpoint_id(&id))
    }

    #[expect(unsafe_code, reason = "Windows FFI for IMMDevice::Activate")]
    fn endpoint_volume(device: DeviceId, property: &'static str) -> Result<IAudioEndpointVolume> {
        let endpoint = Self::default_endpoint()?;
        if Self::device_id(&endpoint)? != device {
            return Err(NotchError::AudioProperty {
                property,
                source: StringError::new(format!("{device} is no longer the default endpoint")),
            });
        }
        // SAFETY: Activate with CLSCTX_ALL and no activation params is the documented way to
        // obtain IAudioEndpointVolume from an endpoint
        unsafe { endpoint.Activate::<IAudioEndpointVolume>(CLSCTX_ALL, None) }.map_err(|e| {
            NotchError::AudioProperty {
                property,
                source: Box::new(e),
            }
        })
    }
}

impl AudioEndpoint for WindowsAudioEndpoint {
    fn default_output_device(&self) -> Result<DeviceId> {
        let _com = ComGuard::new();
        let endpoint = Self::default_endpoint()?;
        Self::device_id(&endpoint)
    }

    #[expect(unsafe_code, reason = "Windows FFI for GetMasterVolumeLevelScalar")]
    fn volume_scalar(&self, device: DeviceId) -> Result<f32> {
        let _com = ComGuard::new();
        let volume = Self::endpoint_volume(device, "volume")?;
        // SAFETY: volume is a live IAudioEndpointVolume obtained above
        unsafe { volume.GetMasterVolumeLevelScalar() }.map_err(|e| NotchError::AudioProperty {
            property: "volume",
            source: Box::new(e),
        })
    }

    #[expect(unsafe_code, reason = "Windows FFI for IAudioEndpointVolume::GetMute")]
    fn is_muted(&self, device: DeviceId) -> Result<bool> {
        let _com = ComGuard::new();
        let volume = Self::endpoint_volume(device, "mute")?;
        // SAFETY: volume is a live IAudioEndpointVolume obtained above
        let muted = unsafe { volume.GetMute() }.map_err(|e| NotchError::AudioProperty {
            property: "mute",
            source: Box::new(e),
        })?;
        Ok(muted.as_bool())
    }
}

/// Stable, never-zero handle for an endpoint id string
fn hash_endpoint_id(id: &str) -> DeviceId {
    let mut hasher = DefaultHasher::new();
    id.hash(&mut hasher);
    let hash = hasher.finish();
    #[expect(
        clippy::cast_possible_truncation,
        reason = "folding a 64-bit hash into the 32-bit handle space is intended"
    )]
    let folded = (hash ^ (hash >> 32)) as u32;
    DeviceId(folded.max(1))
}
