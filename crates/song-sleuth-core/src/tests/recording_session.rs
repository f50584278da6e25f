use crate::{CoreError, RecordingSession, SessionState};

use uuid::Uuid;

/// WHAT: start() from Idle moves to Listening
/// WHY: Entry point of every recognition session
#[test]
#[allow(clippy::unwrap_used)]
fn given_idle_session_when_starting_then_listening_with_new_id() {
    // Given: An idle session
    let mut session = RecordingSession::new();
    assert!(session.state().is_idle());

    // When: Starting
    let session_id = session.start().unwrap();

    // Then: Listening under the returned ID
    assert!(session.state().is_listening());
    assert_eq!(session.state().session_id(), Some(session_id));
}

/// WHAT: start() outside Idle is rejected and leaves state unchanged
/// WHY: Capture must never be double-started
#[test]
#[allow(clippy::unwrap_used)]
fn given_non_idle_session_when_starting_then_rejected_and_state_unchanged() {
    // Given: A listening session
    let mut session = RecordingSession::new();
    session.start().unwrap();
    let listening = session.state();

    // When: Starting again
    let result = session.start();

    // Then: Protocol violation, same state
    assert!(matches!(
        result,
        Err(CoreError::ProtocolViolation { event: "start", .. })
    ));
    assert_eq!(session.state(), listening);

    // Given: The session awaiting a result
    session.complete_recording().unwrap();
    let awaiting = session.state();

    // When/Then: Start is still rejected
    assert!(session.start().is_err());
    assert_eq!(session.state(), awaiting);
}

/// WHAT: cancel() from Listening returns to Idle
/// WHY: The user can abandon a capture
#[test]
#[allow(clippy::unwrap_used)]
fn given_listening_session_when_cancelling_then_idle() {
    // Given: A listening session
    let mut session = RecordingSession::new();
    let started = session.start().unwrap();

    // When: Cancelling
    let cancelled = session.cancel().unwrap();

    // Then: Idle, and the cancelled ID is the started one
    assert_eq!(cancelled, started);
    assert_eq!(session.state(), SessionState::Idle);
}

/// WHAT: cancel() while awaiting a result is rejected
/// WHY: In-flight recognition runs to completion
#[test]
#[allow(clippy::unwrap_used)]
fn given_awaiting_session_when_cancelling_then_rejected() {
    // Given: A session awaiting a result
    let mut session = RecordingSession::new();
    session.start().unwrap();
    session.complete_recording().unwrap();

    // When: Cancelling
    let result = session.cancel();

    // Then: Rejected, still awaiting
    assert!(result.is_err());
    assert!(session.state().is_awaiting_result());
}

/// WHAT: Peaks are only accepted while listening
/// WHY: Peaks after completion must be discarded
#[test]
#[allow(clippy::unwrap_used)]
fn given_each_state_when_accepting_peak_then_only_listening_accepts() {
    // Given: A fresh session
    let mut session = RecordingSession::new();

    // Then: Idle rejects
    assert!(session.accept_peak().is_err());

    // Then: Listening accepts without changing state
    session.start().unwrap();
    let listening = session.state();
    assert!(session.accept_peak().is_ok());
    assert_eq!(session.state(), listening);

    // Then: Awaiting rejects
    session.complete_recording().unwrap();
    assert!(session.accept_peak().is_err());
}

/// WHAT: Full cycle Idle -> Listening -> AwaitingResult -> Idle
/// WHY: The happy path returns to Idle on completion
#[test]
#[allow(clippy::unwrap_used)]
fn given_complete_recording_when_finishing_then_idle() {
    // Given: A session that completed its recording
    let mut session = RecordingSession::new();
    let session_id = session.start().unwrap();
    assert_eq!(session.complete_recording().unwrap(), session_id);

    // When: Finishing with the matching ID
    session.finish(session_id).unwrap();

    // Then: Idle
    assert!(session.state().is_idle());
}

/// WHAT: A result for another session is rejected
/// WHY: At most one terminal result per session
#[test]
#[allow(clippy::unwrap_used)]
fn given_awaiting_session_when_finishing_with_other_id_then_rejected() {
    // Given: A session awaiting a result
    let mut session = RecordingSession::new();
    session.start().unwrap();
    session.complete_recording().unwrap();
    let awaiting = session.state();

    // When: Finishing with an unrelated ID
    let result = session.finish(Uuid::new_v4());

    // Then: Rejected, still awaiting
    assert!(result.is_err());
    assert_eq!(session.state(), awaiting);
}

/// WHAT: recording_complete outside Listening is rejected
/// WHY: Out-of-order device events must not corrupt state
#[test]
fn given_idle_session_when_completing_recording_then_rejected() {
    // Given: An idle session
    let mut session = RecordingSession::new();

    // When: A completion event arrives
    let result = session.complete_recording();

    // Then: Rejected, still idle
    assert!(result.is_err_and(|e| e.is_protocol_violation()));
    assert!(session.state().is_idle());
}

/// WHAT: abort() returns to Idle from any state
/// WHY: Device failures must not strand the session
#[test]
#[allow(clippy::unwrap_used)]
fn given_awaiting_session_when_aborting_then_idle() {
    // Given: A session awaiting a result
    let mut session = RecordingSession::new();
    session.start().unwrap();
    session.complete_recording().unwrap();

    // When: Aborting
    session.abort();

    // Then: Idle
    assert!(session.state().is_idle());
}
