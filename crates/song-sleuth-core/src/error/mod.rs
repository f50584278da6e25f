use crate::SessionState;

use error_location::ErrorLocation;
use thiserror::Error;

/// Core errors with source location tracking.
#[derive(Error, Debug)]
pub enum CoreError {
    /// No audio input device found.
    #[error("No microphone found {location}")]
    NoMicrophoneFound {
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Audio device operation failed.
    #[error("Audio device error: {reason} {location}")]
    DeviceError {
        /// Description of the device error.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The captured audio artifact could not be written or read.
    #[error("Audio artifact error at {path:?}: {reason} {location}")]
    ArtifactError {
        /// Path of the artifact.
        path: std::path::PathBuf,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recognition request could not be completed.
    #[error("Recognition request failed: {reason} {location}")]
    RecognitionRequestFailed {
        /// Description of the transport failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// The recognition request exceeded its deadline.
    #[error("Recognition timed out after {timeout_secs}s {location}")]
    RecognitionTimedOut {
        /// Configured deadline in seconds.
        timeout_secs: u64,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Cover image download failed.
    #[error("Image fetch failed for {url}: {reason} {location}")]
    ImageFetchFailed {
        /// Image URL.
        url: String,
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Persistent settings could not be read or written.
    #[error("Settings error: {reason} {location}")]
    SettingsError {
        /// Description of the failure.
        reason: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// An event arrived in a session state that does not accept it.
    #[error("Protocol violation: {event} received while {state:?} {location}")]
    ProtocolViolation {
        /// Name of the rejected event.
        event: &'static str,
        /// Session state at the time of the event.
        state: SessionState,
        /// Source location where error occurred.
        location: ErrorLocation,
    },

    /// Failed to send a message through an async channel.
    #[error("Channel send failed: {message} {location}")]
    ChannelSendFailed {
        /// Human-readable error message.
        message: String,
        /// Source location where error occurred.
        location: ErrorLocation,
    },
}

impl CoreError {
    /// Whether this error is a rejected session event rather than a real failure.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, CoreError::ProtocolViolation { .. })
    }
}

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
