//! Recognition-session orchestration.
//!
//! The controller is the single owner of session state and the song history.
//! It runs on one task: UI commands, capture-device events and recognition
//! results all arrive as [`SessionCommand`]s on one channel, and the
//! presentation layer observes the result through [`UiEvent`]s.

use crate::{
    AudioDevice, CoreError, CoreResult, ImageFetcher, MemoryList, Page, RecognitionClient,
    RecognitionOutcome, RecordingSession, SessionCommand, SessionState, SettingsStore, Song,
    UiEvent, classify, interpret_call,
};

use std::{
    ops::ControlFlow,
    panic::Location,
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use error_location::ErrorLocation;
use tokio::sync::{broadcast, mpsc};
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};
use uuid::Uuid;

/// Default deadline for one recognition call.
pub const DEFAULT_RECOGNITION_TIMEOUT: Duration = Duration::from_secs(30);

/// User-facing copy when the microphone could not record.
pub const CAPTURE_FAILED_MESSAGE: &str = "Recording failed.";

/// Buffered UI events per subscriber before the slowest one starts lagging.
const UI_EVENT_CAPACITY: usize = 64;

/// Tunables for the controller.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Deadline for one recognition call.
    pub recognition_timeout: Duration,
    /// Directory cover images are downloaded into.
    pub image_cache_dir: PathBuf,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            recognition_timeout: DEFAULT_RECOGNITION_TIMEOUT,
            image_cache_dir: std::env::temp_dir(),
        }
    }
}

/// External systems the controller drives.
pub struct Collaborators {
    /// Microphone capture.
    pub audio: Box<dyn AudioDevice>,
    /// Recognition service client.
    pub recognizer: Arc<dyn RecognitionClient>,
    /// Cover image downloader.
    pub image_fetcher: Arc<dyn ImageFetcher>,
    /// Persistent settings.
    pub settings: Box<dyn SettingsStore>,
}

/// Owns the recording session and song history for the process lifetime.
pub struct SessionController {
    session: RecordingSession,
    memory_list: MemoryList,
    last_peak: Option<f64>,
    audio: Box<dyn AudioDevice>,
    recognizer: Arc<dyn RecognitionClient>,
    image_fetcher: Arc<dyn ImageFetcher>,
    settings: Box<dyn SettingsStore>,
    options: ControllerOptions,
    commands: mpsc::Sender<SessionCommand>,
    events: broadcast::Sender<UiEvent>,
}

impl SessionController {
    /// Load the song history and build the controller.
    ///
    /// `commands` must feed the receiver later passed to [`run`](Self::run);
    /// recognition results are posted back through it.
    #[track_caller]
    #[instrument(skip_all)]
    pub fn init(
        collaborators: Collaborators,
        options: ControllerOptions,
        commands: mpsc::Sender<SessionCommand>,
    ) -> CoreResult<Self> {
        let persisted = collaborators.settings.memory_list()?;
        let memory_list = MemoryList::load_from(&persisted);
        let (events, _) = broadcast::channel(UI_EVENT_CAPACITY);

        info!(
            song_count = memory_list.len(),
            recognition_timeout_ms = options.recognition_timeout.as_millis(),
            "Session controller initialized"
        );

        Ok(Self {
            session: RecordingSession::new(),
            memory_list,
            last_peak: None,
            audio: collaborators.audio,
            recognizer: collaborators.recognizer,
            image_fetcher: collaborators.image_fetcher,
            settings: collaborators.settings,
            options,
            commands,
            events,
        })
    }

    /// Receive UI events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Song history, read-only.
    pub fn memory_list(&self) -> &MemoryList {
        &self.memory_list
    }

    /// Last peak reading shown during the current capture.
    pub fn last_peak(&self) -> Option<f64> {
        self.last_peak
    }

    /// Surface to show when no session is running.
    pub fn default_page(&self) -> Page {
        if self.memory_list.is_empty() {
            Page::EmptyState
        } else {
            Page::MainScreen
        }
    }

    /// Process commands until [`SessionCommand::Shutdown`], then flush.
    ///
    /// The controller keeps a sender for its own results, so the channel never
    /// closes on its own; the loop ends only on shutdown.
    #[instrument(skip_all)]
    pub async fn run(mut self, mut commands: mpsc::Receiver<SessionCommand>) -> CoreResult<()> {
        info!("Session controller running");

        self.emit(UiEvent::HistoryChanged);
        self.emit(UiEvent::PageChanged(self.default_page()));

        while let Some(command) = commands.recv().await {
            if self.handle(command).is_break() {
                info!("Shutdown requested");
                break;
            }
        }

        self.shutdown()
    }

    /// Apply one command.
    pub fn handle(&mut self, command: SessionCommand) -> ControlFlow<()> {
        match command {
            SessionCommand::Start => self.start(),
            SessionCommand::Cancel => self.cancel(),
            SessionCommand::PeakChanged(peak) => self.peak_changed(peak),
            SessionCommand::RecordingComplete => self.recording_complete(),
            SessionCommand::CaptureFailed { reason } => self.capture_failed(&reason),
            SessionCommand::RecognitionFinished {
                session_id,
                outcome,
            } => self.finish_recognition(session_id, outcome),
            SessionCommand::ClearHistory => self.clear_history(),
            SessionCommand::Shutdown => return ControlFlow::Break(()),
        }

        ControlFlow::Continue(())
    }

    /// Begin listening. Ignored unless idle.
    #[instrument(skip(self))]
    pub fn start(&mut self) {
        let session_id = match self.session.start() {
            Ok(id) => id,
            Err(e) => return self.ignore(e),
        };

        if let Err(e) = self.audio.start() {
            error!(session_id = %session_id, error = ?e, "Failed to start capture");
            self.session.abort();
            self.emit(UiEvent::RecognitionFailed(CAPTURE_FAILED_MESSAGE.to_string()));
            self.emit_default_page();
            return;
        }

        self.last_peak = None;
        self.emit(UiEvent::SessionStateChanged(self.session.state()));
        self.emit(UiEvent::PageChanged(Page::Recording));
    }

    /// Abort listening. Ignored unless listening.
    #[instrument(skip(self))]
    pub fn cancel(&mut self) {
        let session_id = match self.session.cancel() {
            Ok(id) => id,
            Err(e) => return self.ignore(e),
        };

        if let Err(e) = self.audio.cancel() {
            warn!(session_id = %session_id, error = ?e, "Failed to cancel capture");
        }

        self.last_peak = None;
        self.emit_default_page();
    }

    /// Show feedback for a new peak reading. Dropped unless listening.
    pub fn peak_changed(&mut self, peak: f64) {
        if let Err(e) = self.session.accept_peak() {
            // Late peaks after completion are routine; keep them out of warn logs.
            debug!(error = %e, peak, "Dropping peak reading");
            return;
        }

        self.last_peak = Some(peak);
        self.emit(UiEvent::ListeningFeedbackChanged(classify(peak)));
    }

    /// Capture finished: start recognition in the background.
    #[instrument(skip(self))]
    pub fn recording_complete(&mut self) {
        let session_id = match self.session.complete_recording() {
            Ok(id) => id,
            Err(e) => return self.ignore(e),
        };

        if let Err(e) = self.audio.stop() {
            warn!(session_id = %session_id, error = ?e, "Failed to release capture device");
        }

        self.emit(UiEvent::SessionStateChanged(self.session.state()));
        self.spawn_recognition(session_id);
    }

    /// Capture device gave up mid-capture.
    #[instrument(skip(self))]
    pub fn capture_failed(&mut self, reason: &str) {
        let session_id = match self.session.cancel() {
            Ok(id) => id,
            Err(e) => return self.ignore(e),
        };

        error!(session_id = %session_id, reason, "Capture failed");

        if let Err(e) = self.audio.cancel() {
            warn!(session_id = %session_id, error = ?e, "Failed to release capture device");
        }

        self.last_peak = None;
        self.emit(UiEvent::RecognitionFailed(CAPTURE_FAILED_MESSAGE.to_string()));
        self.emit_default_page();
    }

    /// Apply a recognition result and return to idle.
    ///
    /// Results for any session other than the one awaiting a result are
    /// dropped, so each session yields at most one terminal outcome.
    #[instrument(skip(self, outcome))]
    pub fn finish_recognition(&mut self, session_id: Uuid, outcome: RecognitionOutcome) {
        if let Err(e) = self.session.finish(session_id) {
            return self.ignore(e);
        }

        info!(session_id = %session_id, outcome = outcome.kind(), "Recognition outcome");

        match outcome {
            RecognitionOutcome::Matched(song) => self.record_match(song),
            outcome => {
                if let Some(message) = outcome.failure_message() {
                    self.emit(UiEvent::RecognitionFailed(message));
                }
            }
        }

        self.emit_default_page();
    }

    /// Empty the history and persist the empty list right away.
    #[instrument(skip(self))]
    pub fn clear_history(&mut self) {
        self.memory_list.clear();

        if let Err(e) = self.flush_memory_list() {
            error!(error = ?e, "Failed to persist cleared history");
        }

        info!("History cleared");

        self.emit(UiEvent::HistoryChanged);
        if self.session.state().is_idle() {
            self.emit(UiEvent::PageChanged(self.default_page()));
        }
    }

    /// Release the device and persist the history if it changed.
    #[instrument(skip(self))]
    pub fn shutdown(&mut self) -> CoreResult<()> {
        if self.session.state().is_listening() {
            if let Err(e) = self.audio.cancel() {
                warn!(error = ?e, "Failed to cancel capture during shutdown");
            }
        }
        self.session.abort();

        if self.memory_list.needs_flush() {
            self.flush_memory_list()?;
        } else {
            debug!("History unchanged, nothing to flush");
        }

        info!(song_count = self.memory_list.len(), "Session controller shut down");

        Ok(())
    }

    fn record_match(&mut self, song: Song) {
        if let Some(url) = song.image_src.clone() {
            let destination = self.options.image_cache_dir.join(song.cover_file_name());
            self.spawn_cover_fetch(url, destination);
        }

        self.memory_list.insert_deduplicated(song.clone());

        self.emit(UiEvent::HistoryChanged);
        self.emit(UiEvent::RecognitionSucceeded(song));
    }

    fn spawn_recognition(&self, session_id: Uuid) {
        let recognizer = Arc::clone(&self.recognizer);
        let commands = self.commands.clone();
        let artifact = self.audio.artifact_path().to_path_buf();
        let credential = self.settings.token();
        let timeout = self.options.recognition_timeout;

        if credential.is_empty() {
            warn!(session_id = %session_id, "No recognition token configured");
        }

        let task = async move {
            let response =
                match tokio::time::timeout(timeout, recognizer.recognize(&artifact, &credential))
                    .await
                {
                    Ok(response) => response,
                    Err(_) => Err(CoreError::RecognitionTimedOut {
                        timeout_secs: timeout.as_secs(),
                        location: ErrorLocation::from(Location::caller()),
                    }),
                };

            let outcome = interpret_call(response);

            // Marshal back onto the controller task; nothing is mutated here.
            if let Err(e) = commands
                .send(SessionCommand::RecognitionFinished {
                    session_id,
                    outcome,
                })
                .await
            {
                error!(session_id = %session_id, error = %e, "Failed to deliver recognition result");
            }
        };

        tokio::spawn(task.instrument(info_span!("recognition", session_id = %session_id)));
    }

    fn spawn_cover_fetch(&self, url: String, destination: PathBuf) {
        let fetcher = Arc::clone(&self.image_fetcher);

        tokio::spawn(async move {
            match fetcher.fetch(&url, &destination).await {
                Ok(()) => debug!(url = %url, "Cover image fetched"),
                Err(e) => warn!(url = %url, error = ?e, "Cover image fetch failed"),
            }
        });
    }

    fn flush_memory_list(&mut self) -> CoreResult<()> {
        self.settings
            .set_memory_list(&self.memory_list.snapshot_for_persist())?;
        self.memory_list.mark_flushed();

        debug!(song_count = self.memory_list.len(), "History flushed");

        Ok(())
    }

    fn emit_default_page(&self) {
        self.emit(UiEvent::SessionStateChanged(self.session.state()));
        self.emit(UiEvent::PageChanged(self.default_page()));
    }

    fn emit(&self, event: UiEvent) {
        // No subscribers is fine: the presentation layer may not be attached yet.
        let _ = self.events.send(event);
    }

    fn ignore(&self, e: CoreError) {
        if e.is_protocol_violation() {
            warn!(error = %e, "Ignoring out-of-order session event");
        } else {
            error!(error = ?e, "Session event failed");
        }
    }
}
