//! Error types for the notch HUD core
//!
//! Every fallible primitive in this crate (clipboard host, audio subsystem, brightness source,
//! configuration) reports through [`NotchError`]. None of these errors are ever shown to the
//! user: transient read failures degrade to last-known values and listener registration
//! failures degrade to a missing signal. The variants exist so the degradation can be logged
//! with a full error chain.
//!
//! Error variants use `#[source]` to preserve error chains for better observability.

use thiserror::Error;

/// Simple error type for wrapping string messages while implementing `std::error::Error`
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StringError(pub String);

impl StringError {
    /// Create a new `StringError` from a string message
    pub fn new(msg: impl Into<String>) -> Box<Self> {
        Box::new(Self(msg.into()))
    }
}

/// Main error type for the notch HUD core
#[derive(Debug, Error)]
pub enum NotchError {
    /// The host clipboard could not be opened or read
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No usable audio subsystem or default output device
    #[error("Audio subsystem unavailable: {0}")]
    AudioUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Reading an audio property (volume, mute, default device) failed
    #[error("Failed to read audio property {property}: {source}")]
    AudioProperty {
        /// Property that was being read
        property: &'static str,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The audio subsystem refused a property listener
    #[error("Failed to register listener for {property}: {source}")]
    ListenerRegistration {
        /// Property the listener was meant for
        property: &'static str,
        /// Underlying failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Display brightness cannot be queried on this system
    #[error("Brightness unavailable: {0}")]
    BrightnessUnavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Windows API error
    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsApiError(#[from] windows::core::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl NotchError {
    /// Shorthand for an [`NotchError::AudioProperty`] with a plain message
    pub fn audio_property(property: &'static str, msg: impl Into<String>) -> Self {
        Self::AudioProperty {
            property,
            source: StringError::new(msg),
        }
    }

    /// Whether this error is a transient read failure that the caller should skip over
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::ClipboardUnavailable(_)
                | Self::AudioProperty { .. }
                | Self::BrightnessUnavailable(_)
        )
    }
}

/// Result type alias for notch HUD operations
pub type Result<T> = std::result::Result<T, NotchError>;
