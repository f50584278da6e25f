//! Song-sleuth Core Library
//!
//! Recognition-session controller: records a short clip, submits it to an
//! audio-fingerprint recognition service, and keeps a deduplicated history of
//! recognized songs.
//!
//! # Example
//!
//! ```no_run
//! use song_sleuth_core::{
//!     AuddClient, Collaborators, ControllerOptions, CoreResult, CpalRecorder, HttpImageFetcher,
//!     PersistedSong, SessionCommand, SessionController, SettingsStore, DEFAULT_ENDPOINT,
//!     DEFAULT_RECORD_DURATION,
//! };
//!
//! use std::sync::Arc;
//!
//! struct InMemorySettings(Vec<PersistedSong>);
//!
//! impl SettingsStore for InMemorySettings {
//!     fn memory_list(&self) -> CoreResult<Vec<PersistedSong>> {
//!         Ok(self.0.clone())
//!     }
//!     fn set_memory_list(&mut self, songs: &[PersistedSong]) -> CoreResult<()> {
//!         self.0 = songs.to_vec();
//!         Ok(())
//!     }
//!     fn token(&self) -> String {
//!         "my-api-token".to_string()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> CoreResult<()> {
//!     let (command_tx, command_rx) = tokio::sync::mpsc::channel(64);
//!
//!     let collaborators = Collaborators {
//!         audio: Box::new(CpalRecorder::new(std::env::temp_dir(), DEFAULT_RECORD_DURATION, command_tx.clone())?),
//!         recognizer: Arc::new(AuddClient::new(DEFAULT_ENDPOINT)?),
//!         image_fetcher: Arc::new(HttpImageFetcher::new()?),
//!         settings: Box::new(InMemorySettings(Vec::new())),
//!     };
//!
//!     let controller =
//!         SessionController::init(collaborators, ControllerOptions::default(), command_tx.clone())?;
//!     let mut events = controller.subscribe();
//!
//!     command_tx.send(SessionCommand::Start).await.ok();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("{:?}", event);
//!         }
//!     });
//!
//!     controller.run(command_rx).await
//! }
//! ```

mod audio;
mod collaborators;
mod error;
mod memory_list;
mod peak;
mod recognition;
mod session;
mod song;

pub use {
    audio::{CpalRecorder, DEFAULT_RECORD_DURATION},
    collaborators::{AudioDevice, ImageFetcher, RecognitionClient, SettingsStore},
    error::{CoreError, Result as CoreResult},
    memory_list::MemoryList,
    peak::{ListeningFeedback, PeakCategory, classify, peak_db},
    recognition::{
        AuddClient, DEFAULT_ENDPOINT, HttpImageFetcher, MALFORMED_MESSAGE, NO_MATCH_MESSAGE,
        RecognitionOutcome, UNREACHABLE_MESSAGE, interpret, interpret_call,
        normalize_audd_response,
    },
    session::{
        CAPTURE_FAILED_MESSAGE, Collaborators, ControllerOptions, DEFAULT_RECOGNITION_TIMEOUT,
        Page, RecordingSession, SessionCommand, SessionController, SessionState, UiEvent,
    },
    song::{PersistedSong, Song},
};

#[cfg(test)]
mod tests;
