//! Recording lifecycle state machine.
//!
//! `Idle -> Listening -> AwaitingResult -> Idle`, with `Listening -> Idle` on
//! cancel. Every other event is rejected with [`CoreError::ProtocolViolation`]
//! and leaves the state untouched.

use crate::{CoreError, CoreResult, SessionState};

use std::{panic::Location, time::Instant};

use error_location::ErrorLocation;
use tracing::{debug, info};
use uuid::Uuid;

/// Owns the [`SessionState`] and enforces its transitions.
#[derive(Debug, Default)]
pub struct RecordingSession {
    state: SessionState,
}

impl RecordingSession {
    /// Create an idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `Idle -> Listening`. Returns the new session ID.
    #[track_caller]
    pub fn start(&mut self) -> CoreResult<Uuid> {
        match self.state {
            SessionState::Idle => {
                let session_id = Uuid::new_v4();
                self.state = SessionState::Listening {
                    started_at: Instant::now(),
                    session_id,
                };
                info!(session_id = %session_id, "Listening");
                Ok(session_id)
            }
            state => Err(Self::violation("start", state)),
        }
    }

    /// `Listening -> Idle`. Returns the cancelled session ID.
    #[track_caller]
    pub fn cancel(&mut self) -> CoreResult<Uuid> {
        match self.state {
            SessionState::Listening {
                started_at,
                session_id,
            } => {
                self.state = SessionState::Idle;
                info!(
                    session_id = %session_id,
                    duration_ms = started_at.elapsed().as_millis(),
                    "Listening cancelled"
                );
                Ok(session_id)
            }
            state => Err(Self::violation("cancel", state)),
        }
    }

    /// Check that a peak reading may be shown. Never changes state.
    #[track_caller]
    pub fn accept_peak(&self) -> CoreResult<()> {
        match self.state {
            SessionState::Listening { .. } => Ok(()),
            state => Err(Self::violation("peak_changed", state)),
        }
    }

    /// `Listening -> AwaitingResult`. Returns the session ID.
    #[track_caller]
    pub fn complete_recording(&mut self) -> CoreResult<Uuid> {
        match self.state {
            SessionState::Listening {
                started_at,
                session_id,
            } => {
                self.state = SessionState::AwaitingResult {
                    started_at,
                    session_id,
                };
                info!(
                    session_id = %session_id,
                    duration_ms = started_at.elapsed().as_millis(),
                    "Recording complete, awaiting result"
                );
                Ok(session_id)
            }
            state => Err(Self::violation("recording_complete", state)),
        }
    }

    /// `AwaitingResult -> Idle` for the session identified by `session_id`.
    #[track_caller]
    pub fn finish(&mut self, session_id: Uuid) -> CoreResult<()> {
        match self.state {
            SessionState::AwaitingResult {
                started_at,
                session_id: current,
            } if current == session_id => {
                self.state = SessionState::Idle;
                info!(
                    session_id = %session_id,
                    duration_ms = started_at.elapsed().as_millis(),
                    "Session finished"
                );
                Ok(())
            }
            state => Err(Self::violation("recognition_finished", state)),
        }
    }

    /// Return to `Idle` from any state.
    pub fn abort(&mut self) {
        if let Some(session_id) = self.state.session_id() {
            debug!(session_id = %session_id, "Session aborted");
        }
        self.state = SessionState::Idle;
    }

    #[track_caller]
    fn violation(event: &'static str, state: SessionState) -> CoreError {
        CoreError::ProtocolViolation {
            event,
            state,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}
