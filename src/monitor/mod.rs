//! Change detection
//!
//! Producers that notice external state changes and turn them into bus topics:
//!
//! - [`ClipboardPoller`]: samples the clipboard change counter on the coordinating thread and
//!   maintains the clipboard history
//! - [`HardwareWatcher`]: keeps audio property listeners bound to the default output device
//! - [`BrightnessMonitor`]: samples display brightness on a background thread
//!
//! The watcher and the brightness monitor run on foreign threads and only ever post through a
//! [`SignalSink`](crate::bus::SignalSink).

pub mod brightness_monitor;
pub mod clipboard_poller;
pub mod hardware_watcher;

pub use brightness_monitor::BrightnessMonitor;
pub use clipboard_poller::{CLIPBOARD_POLL_INTERVAL, ClipboardPoller};
pub use hardware_watcher::HardwareWatcher;
