//! Host clipboard access
//!
//! [`ClipboardHost`] is the seam between the poller and the operating system. The poller only
//! needs a cheap change counter plus text read/write; everything else about the platform
//! clipboard stays behind this trait so tests can substitute a scripted host.
//!
//! [`SystemClipboard`] talks to the real clipboard through `arboard`. On Windows the change
//! counter is the native clipboard sequence number. Other platforms expose no such counter to
//! `arboard`, so one is derived from a fingerprint of the current text: the counter advances
//! whenever the fingerprint differs from the previous sample.

use crate::error::{NotchError, Result, StringError};
use tracing::debug;

/// Clipboard facility the poller samples
pub trait ClipboardHost {
    /// Monotonically increasing counter that changes whenever the clipboard content changes
    fn change_count(&mut self) -> Result<u64>;

    /// Current plain-text payload, `None` when the clipboard holds no text
    fn read_text(&mut self) -> Result<Option<String>>;

    /// Replace the clipboard content with `text`
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// The operating system clipboard
pub struct SystemClipboard {
    /// Lazily opened connection; dropped after a failure so the next call reopens it
    clipboard: Option<arboard::Clipboard>,
    /// Derived change counter (non-Windows)
    #[cfg_attr(windows, allow(dead_code))]
    counter: u64,
    /// Fingerprint of the text seen by the last `change_count` (non-Windows)
    #[cfg_attr(windows, allow(dead_code))]
    fingerprint: Option<u64>,
}

impl SystemClipboard {
    /// Create a handle; the OS clipboard is opened on first use
    pub fn new() -> Self {
        Self {
            clipboard: None,
            counter: 0,
            fingerprint: None,
        }
    }

    fn connection(&mut self) -> Result<&mut arboard::Clipboard> {
        if self.clipboard.is_none() {
            let clipboard = arboard::Clipboard::new()
                .map_err(|e| NotchError::ClipboardUnavailable(Box::new(e)))?;
            debug!("Opened system clipboard");
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| NotchError::ClipboardUnavailable(StringError::new("clipboard closed")))
    }

    fn get_text(&mut self) -> Result<Option<String>> {
        let result = self.connection()?.get_text();
        match result {
            Ok(text) => Ok(Some(text)),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(e) => {
                self.clipboard = None;
                Err(NotchError::ClipboardUnavailable(Box::new(e)))
            }
        }
    }
}

impl Default for SystemClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipboardHost for SystemClipboard {
    #[cfg(windows)]
    #[expect(
        unsafe_code,
        reason = "Windows FFI for GetClipboardSequenceNumber, which takes no arguments and cannot fail"
    )]
    fn change_count(&mut self) -> Result<u64> {
        use windows::Win32::System::DataExchange::GetClipboardSequenceNumber;

        // SAFETY: no arguments, no preconditions; returns 0 when the window station has no access
        let sequence = unsafe { GetClipboardSequenceNumber() };
        if sequence == 0 {
            return Err(NotchError::ClipboardUnavailable(StringError::new(
                "clipboard sequence number unavailable",
            )));
        }
        Ok(u64::from(sequence))
    }

    #[cfg(not(windows))]
    fn change_count(&mut self) -> Result<u64> {
        let current = self.get_text()?.map(|text| fingerprint(&text));
        if current != self.fingerprint {
            self.fingerprint = current;
            self.counter += 1;
        }
        Ok(self.counter)
    }

    fn read_text(&mut self) -> Result<Option<String>> {
        self.get_text()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let result = self.connection()?.set_text(text.to_owned());
        result.map_err(|e| {
            self.clipboard = None;
            NotchError::ClipboardUnavailable(Box::new(e))
        })
    }
}

#[cfg(not(windows))]
fn fingerprint(text: &str) -> u64 {
    use std::hash::{DefaultHasher, Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish()
}
