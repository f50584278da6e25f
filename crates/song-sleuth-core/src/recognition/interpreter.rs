//! Validating parse of recognition-service responses.
//!
//! The response is parsed once into a tagged shape; every deviation from that
//! shape becomes [`RecognitionOutcome::Malformed`] rather than an error, so the
//! controller always receives a terminal outcome.

use crate::{CoreResult, RecognitionOutcome, Song};

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum RawResponse {
    Success {
        // `Value` has no missing-field default, so an absent `result` is rejected
        // while an explicit `null` is kept.
        result: Value,
    },
    Error {
        error_message: String,
    },
}

#[derive(Debug, Deserialize)]
struct RawSong {
    title: String,
    artist: String,
    song_link: String,
    audio_src: String,
    #[serde(default)]
    image_src: Option<String>,
}

impl From<RawSong> for Song {
    fn from(raw: RawSong) -> Self {
        Song {
            title: raw.title,
            artist: raw.artist,
            song_link: raw.song_link,
            audio_src: raw.audio_src,
            image_src: raw.image_src.filter(|src| !src.is_empty()),
        }
    }
}

/// Classify a normalized recognition response.
pub fn interpret(response: &Value) -> RecognitionOutcome {
    let raw = match RawResponse::deserialize(response) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(error = %e, "Recognition response has unexpected shape");
            return RecognitionOutcome::Malformed;
        }
    };

    match raw {
        RawResponse::Error { error_message } => {
            debug!(error_message = %error_message, "Recognition service reported an error");
            RecognitionOutcome::ServiceError(error_message)
        }
        RawResponse::Success { result } => interpret_result(result),
    }
}

/// Classify the outcome of a whole recognition call, including transport failure.
pub fn interpret_call(response: CoreResult<Value>) -> RecognitionOutcome {
    match response {
        Ok(value) => interpret(&value),
        Err(e) => {
            warn!(error = ?e, "Recognition call failed");
            RecognitionOutcome::Unreachable(e.to_string())
        }
    }
}

fn interpret_result(result: Value) -> RecognitionOutcome {
    match result {
        Value::Null => RecognitionOutcome::NoMatch,
        Value::Object(fields) if fields.is_empty() => RecognitionOutcome::NoMatch,
        Value::Object(fields) => match serde_json::from_value::<RawSong>(Value::Object(fields)) {
            Ok(raw) => RecognitionOutcome::Matched(raw.into()),
            Err(e) => {
                warn!(error = %e, "Recognition result is missing song fields");
                RecognitionOutcome::Malformed
            }
        },
        other => {
            warn!(result = %other, "Recognition result is not a mapping");
            RecognitionOutcome::Malformed
        }
    }
}
