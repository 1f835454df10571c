#![allow(clippy::unwrap_used)]

//! Shared test utilities for unit tests.
//!
//! Only compiled during testing (`#[cfg(test)]`).

use std::sync::Mutex;
use tempfile::TempDir;

/// Serializes tests that modify the APPDATA environment variable.
static APPDATA_LOCK: Mutex<()> = Mutex::new(());

/// Create a temporary test directory that is removed when dropped.
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// RAII guard that points APPDATA at a temp directory for a test scope and restores the
/// original value when dropped.
///
/// `APPDATA_LOCK` is held for the guard's lifetime, so only one test at a time observes a
/// modified environment.
pub struct AppdataGuard {
    original: Option<String>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

#[expect(
    unsafe_code,
    reason = "Test-only environment mutation serialized by APPDATA_LOCK"
)]
impl AppdataGuard {
    /// Create a new guard that sets APPDATA to the given temp directory path.
    pub fn new(temp_dir: &TempDir) -> Self {
        let lock = APPDATA_LOCK
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let original = std::env::var("APPDATA").ok();
        // SAFETY: APPDATA_LOCK serializes every writer of APPDATA in this test binary and the
        // value is restored on drop.
        unsafe {
            std::env::set_var("APPDATA", temp_dir.path());
        }
        Self {
            original,
            _lock: lock,
        }
    }
}

#[expect(
    unsafe_code,
    reason = "Test-only environment restoration serialized by APPDATA_LOCK"
)]
impl Drop for AppdataGuard {
    fn drop(&mut self) {
        // SAFETY: still holding APPDATA_LOCK, see `AppdataGuard::new`.
        if let Some(ref original) = self.original {
            unsafe {
                std::env::set_var("APPDATA", original);
            }
        } else {
            unsafe {
                std::env::remove_var("APPDATA");
            }
        }
    }
}
