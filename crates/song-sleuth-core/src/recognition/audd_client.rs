//! HTTP client for the AudD recognition API.

use crate::{CoreError, CoreResult, RecognitionClient};

use std::{panic::Location, path::Path, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

/// Default recognition endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.audd.io/";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Uploads a recording and normalizes the service's answer.
///
/// The overall request deadline is enforced by the session controller, so the
/// client only bounds connection setup.
#[derive(Debug, Clone)]
pub struct AuddClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AuddClient {
    /// Create a client posting to `endpoint`.
    #[track_caller]
    pub fn new(endpoint: impl Into<String>) -> CoreResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| CoreError::RecognitionRequestFailed {
                reason: format!("Failed to build HTTP client: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl RecognitionClient for AuddClient {
    #[instrument(skip(self, credential))]
    async fn recognize(&self, artifact: &Path, credential: &str) -> CoreResult<Value> {
        let bytes = tokio::fs::read(artifact)
            .await
            .map_err(|e| CoreError::ArtifactError {
                path: artifact.to_path_buf(),
                reason: format!("Failed to read recording: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let file_name = artifact
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("recording.wav")
            .to_string();

        debug!(byte_len = bytes.len(), file_name = %file_name, "Uploading recording");

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")
            .map_err(|e| CoreError::RecognitionRequestFailed {
                reason: format!("Invalid upload mime type: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let form = Form::new()
            .text("api_token", credential.to_string())
            .text("return", "spotify")
            .part("file", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| CoreError::RecognitionRequestFailed {
                reason: format!("Request failed: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let http_status = response.status();

        let body: Value = response
            .json()
            .await
            .map_err(|e| CoreError::RecognitionRequestFailed {
                reason: format!("Response body is not JSON (HTTP {}): {}", http_status, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(http_status = http_status.as_u16(), "Recognition response received");

        Ok(normalize_audd_response(body))
    }
}

/// Reshape an AudD response into `{status, result?, error_message?}`.
///
/// Keys that are missing upstream stay missing, so shape problems are still
/// visible to the interpreter.
pub fn normalize_audd_response(body: Value) -> Value {
    let Value::Object(mut body) = body else {
        return body;
    };

    let mut normalized = Map::new();

    let Some(status) = body.remove("status") else {
        return Value::Object(normalized);
    };

    match status.as_str() {
        Some("error") => {
            let message = body
                .get("error")
                .and_then(|error| error.get("error_message"))
                .or_else(|| body.get("error_message"))
                .cloned();
            if let Some(message) = message {
                normalized.insert("error_message".to_string(), message);
            }
        }
        Some("success") => {
            if let Some(result) = body.remove("result") {
                normalized.insert("result".to_string(), normalize_result(result));
            }
        }
        _ => {}
    }

    normalized.insert("status".to_string(), status);

    Value::Object(normalized)
}

fn normalize_result(result: Value) -> Value {
    let Value::Object(fields) = result else {
        return result;
    };

    if fields.is_empty() {
        return Value::Object(fields);
    }

    let mut song = Map::new();
    for key in ["title", "artist", "song_link"] {
        if let Some(value) = fields.get(key) {
            song.insert(key.to_string(), value.clone());
        }
    }

    let spotify = fields.get("spotify");

    let audio_src = spotify
        .and_then(|s| s.get("preview_url"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let image_src = spotify
        .and_then(|s| s.pointer("/album/images/0/url"))
        .and_then(Value::as_str)
        .unwrap_or_default();

    song.insert("audio_src".to_string(), Value::from(audio_src));
    song.insert("image_src".to_string(), Value::from(image_src));

    Value::Object(song)
}
