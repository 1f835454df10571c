//! Logging system initialization
//!
//! Sets up tracing-based logging with file output to `<app-data>/NotchHud/app.log`
//! and automatic rotation on application startup keeping 10 historical files.

use crate::config::ConfigManager;
use crate::error::{NotchError, Result, StringError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (app.log.1 through app.log.9)
const MAX_LOG_FILES: u8 = 9;

/// Initialize the logging system
///
/// Log level defaults to INFO but can be configured via `RUST_LOG` environment variable.
/// Rotates existing logs on startup to maintain a history of the last 10 sessions.
pub fn init_logging() -> Result<()> {
    let log_dir = ConfigManager::ensure_config_dir()?;

    let log_path = log_dir.join("app.log");
    rotate_logs_on_startup(&log_path)?;

    // tracing_appender has no startup-based rotation, so rotation is handled above
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(&log_dir)
        .map_err(|e| NotchError::ConfigError(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| NotchError::ConfigError(Box::new(e)))?;

    tracing::info!("notch-hud v{} started", env!("CARGO_PKG_VERSION"));

    Ok(())
}

/// Rotate log files on application startup
///
/// - app.log.9 is deleted (oldest log)
/// - app.log.N -> app.log.N+1 for N in 8..=1
/// - app.log -> app.log.1
///
/// A fresh app.log is created by the logger afterwards.
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path
        .parent()
        .ok_or_else(|| NotchError::ConfigError(StringError::new("Invalid log path")))?;

    let log_name = log_path
        .file_name()
        .ok_or_else(|| NotchError::ConfigError(StringError::new("Invalid log filename")))?
        .to_string_lossy();

    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        if current_log.exists() {
            std::fs::rename(&current_log, log_dir.join(format!("{log_name}.{}", i + 1)))?;
        }
    }

    std::fs::rename(log_path, log_dir.join(format!("{log_name}.1")))?;

    Ok(())
}
