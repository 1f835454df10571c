//! Clipboard history data and host access
//!
//! - `ClipboardHistory`: bounded (10 entries), deduplicated by exact text, most recent first
//! - `ClipboardHost`: change counter plus text read/write against the platform clipboard
//!
//! Sampling lives in [`crate::monitor::clipboard_poller`], which is the only writer of the
//! history.

pub mod history;
pub mod host;

pub use history::{ClipboardEntry, ClipboardHistory, HISTORY_CAPACITY};
pub use host::{ClipboardHost, SystemClipboard};
