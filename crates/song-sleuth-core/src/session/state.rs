use std::time::Instant;

use uuid::Uuid;

/// Recognition session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// Capturing audio.
    Listening {
        /// When capture started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
    /// Capture finished, recognition in flight.
    AwaitingResult {
        /// When capture started.
        started_at: Instant,
        /// Unique session ID for log correlation.
        session_id: Uuid,
    },
}

impl SessionState {
    /// Whether no session is in progress.
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionState::Idle)
    }

    /// Whether audio is being captured.
    pub fn is_listening(&self) -> bool {
        matches!(self, SessionState::Listening { .. })
    }

    /// Whether a recognition call is in flight.
    pub fn is_awaiting_result(&self) -> bool {
        matches!(self, SessionState::AwaitingResult { .. })
    }

    /// ID of the current session, if any.
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            SessionState::Idle => None,
            SessionState::Listening { session_id, .. }
            | SessionState::AwaitingResult { session_id, .. } => Some(*session_id),
        }
    }
}
