use crate::Song;

/// User-facing copy for a recording that produced no match.
pub const NO_MATCH_MESSAGE: &str = "The song was not recognized.";
/// User-facing copy for a response that did not have the expected shape.
pub const MALFORMED_MESSAGE: &str = "Something went wrong.";
/// User-facing copy for a recognition call that never produced a response.
pub const UNREACHABLE_MESSAGE: &str = "Could not reach the recognition service.";

/// Terminal classification of one recognition call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionOutcome {
    /// The service identified a song.
    Matched(Song),
    /// The service answered but found nothing.
    NoMatch,
    /// The service reported a failure; the message is shown verbatim.
    ServiceError(String),
    /// The response did not have the expected shape.
    Malformed,
    /// The call failed in transport or timed out.
    Unreachable(String),
}

impl RecognitionOutcome {
    /// Message shown to the user when the outcome is not a match.
    ///
    /// Returns `None` for [`RecognitionOutcome::Matched`].
    pub fn failure_message(&self) -> Option<String> {
        match self {
            RecognitionOutcome::Matched(_) => None,
            RecognitionOutcome::NoMatch => Some(NO_MATCH_MESSAGE.to_string()),
            RecognitionOutcome::ServiceError(message) => Some(message.clone()),
            RecognitionOutcome::Malformed => Some(MALFORMED_MESSAGE.to_string()),
            RecognitionOutcome::Unreachable(_) => Some(UNREACHABLE_MESSAGE.to_string()),
        }
    }

    /// Short name for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RecognitionOutcome::Matched(_) => "matched",
            RecognitionOutcome::NoMatch => "no_match",
            RecognitionOutcome::ServiceError(_) => "service_error",
            RecognitionOutcome::Malformed => "malformed",
            RecognitionOutcome::Unreachable(_) => "unreachable",
        }
    }
}
