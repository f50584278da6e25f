use crate::{ListeningFeedback, SessionState, Song};

/// Which main surface the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// No history yet.
    EmptyState,
    /// History list.
    MainScreen,
    /// Live recording feedback.
    Recording,
}

/// Signals published by the session controller.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// The session moved to a new state.
    SessionStateChanged(SessionState),
    /// New microphone feedback while listening.
    ListeningFeedbackChanged(ListeningFeedback),
    /// A song was recognized.
    RecognitionSucceeded(Song),
    /// Recognition ended without a match; message is user-facing.
    RecognitionFailed(String),
    /// The song history changed.
    HistoryChanged,
    /// The main surface changed.
    PageChanged(Page),
}
