//! Interfaces the session controller drives.
//!
//! Concrete implementations live next to the subsystem they wrap
//! ([`crate::CpalRecorder`], [`crate::AuddClient`], [`crate::HttpImageFetcher`]);
//! the settings store is provided by the application.

use crate::{CoreResult, PersistedSong};

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

/// Microphone capture.
///
/// While active, the device posts `PeakChanged` commands and exactly one
/// terminal `RecordingComplete` (or `CaptureFailed`) into the controller's
/// command channel. A cancelled capture posts nothing further.
pub trait AudioDevice {
    /// Begin a new capture.
    fn start(&mut self) -> CoreResult<()>;

    /// Abort the capture and discard any partial artifact.
    fn cancel(&mut self) -> CoreResult<()>;

    /// Release the device after a completed capture. The artifact is kept.
    fn stop(&mut self) -> CoreResult<()>;

    /// Where the completed capture is written.
    fn artifact_path(&self) -> &Path;
}

/// Remote audio-fingerprint recognition.
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    /// Submit the captured audio and return the normalized response:
    /// `{status, result?: {title, artist, song_link, audio_src, image_src}, error_message?}`.
    async fn recognize(&self, artifact: &Path, credential: &str) -> CoreResult<Value>;
}

/// Cover image download.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Download `url` into `destination`.
    async fn fetch(&self, url: &str, destination: &Path) -> CoreResult<()>;
}

/// Persistent key/value settings used by the controller.
pub trait SettingsStore {
    /// Stored song history, most recent first.
    fn memory_list(&self) -> CoreResult<Vec<PersistedSong>>;

    /// Replace the stored song history.
    fn set_memory_list(&mut self, songs: &[PersistedSong]) -> CoreResult<()>;

    /// Recognition service credential. Empty when unset.
    fn token(&self) -> String;
}
