//! `notch-hud` - Event coordination core for a notch-style indicator overlay
//!
//! Detects clipboard, output volume and display brightness changes and turns them into a
//! transient HUD plus a clipboard history overlay. A single coordinating thread
//! (`NotchController`) owns all UI-facing state; clipboard sampling runs on its timers, while the
//! audio watcher and the brightness monitor post signals to it from their own threads.
//!
//! Rendering is not part of this crate: the controller sends `NotchState` snapshots to whatever
//! draws them and accepts hover, close and copy requests back through a `ControllerHandle`.

// Module declarations
pub mod bus;
pub mod clipboard;
pub mod config;
pub mod controller;
pub mod error;
pub mod hardware;
pub mod monitor;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{NotchError, Result};
