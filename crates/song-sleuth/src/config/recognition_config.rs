use crate::config::{default_endpoint, default_timeout_secs};

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Recognition service configuration.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// API token sent with every request. Empty means unconfigured.
    #[serde(default)]
    pub token: String,

    /// Endpoint the recording is posted to.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Deadline for one recognition call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl RecognitionConfig {
    /// Recognition deadline, never shorter than one second.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for RecognitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionConfig")
            .field("token", &if self.token.is_empty() { "<unset>" } else { "<redacted>" })
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
