//! Utility modules
//!
//! Provides logging initialization and the cancellable timer primitive shared by the
//! poller and both coordinators.

pub mod logging;
pub mod timer;

pub use logging::init_logging;
pub use timer::CancellableTimer;
