use crate::RecognitionOutcome;

use uuid::Uuid;

/// Inputs to the session controller.
///
/// UI commands, capture-device events and recognition results all arrive on
/// the same channel, so every state change happens on the controller's task.
#[derive(Debug, Clone)]
pub enum SessionCommand {
    /// Begin listening.
    Start,
    /// Abort listening.
    Cancel,
    /// Capture device reported a new peak level in dB.
    PeakChanged(f64),
    /// Capture device finished writing the artifact.
    RecordingComplete,
    /// Capture device failed mid-capture.
    CaptureFailed {
        /// Description of the failure.
        reason: String,
    },
    /// A recognition call finished.
    RecognitionFinished {
        /// Session the call belongs to.
        session_id: Uuid,
        /// Interpreted result.
        outcome: RecognitionOutcome,
    },
    /// Empty the song history.
    ClearHistory,
    /// Flush state and stop the controller loop.
    Shutdown,
}
