use song_sleuth_core::{PeakCategory, SessionState, UiEvent};

/// Tray icon states mirroring the recognition session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayIconState {
    /// Ready to listen.
    Idle,
    /// Capturing audio, showing the latest signal strength.
    Listening(PeakCategory),
    /// Waiting for the recognition service.
    AwaitingResult,
}

impl TrayIconState {
    /// Tray state implied by a UI event, if the event changes it.
    pub fn from_event(event: &UiEvent) -> Option<Self> {
        match event {
            UiEvent::SessionStateChanged(state) => Some(Self::from(*state)),
            UiEvent::ListeningFeedbackChanged(feedback) => {
                Some(Self::Listening(feedback.category))
            }
            _ => None,
        }
    }

    /// Hover text for this state.
    pub fn tooltip(&self) -> &'static str {
        match self {
            Self::Idle => "Song Sleuth - Ready",
            Self::Listening(PeakCategory::Muted) => "Song Sleuth - Muted",
            Self::Listening(_) => "Song Sleuth - Listening...",
            Self::AwaitingResult => "Song Sleuth - Recognizing...",
        }
    }
}

impl From<SessionState> for TrayIconState {
    fn from(state: SessionState) -> Self {
        match state {
            SessionState::Idle => Self::Idle,
            // No reading yet; shows as muted until the first peak arrives.
            SessionState::Listening { .. } => Self::Listening(PeakCategory::Muted),
            SessionState::AwaitingResult { .. } => Self::AwaitingResult,
        }
    }
}
