use crate::config::default_record_duration_secs;

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Audio capture configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Length of the clip sent for recognition, in seconds.
    #[serde(default = "default_record_duration_secs")]
    pub record_duration_secs: u64,
}

impl AudioConfig {
    /// Clip length, never shorter than one second.
    pub fn record_duration(&self) -> Duration {
        Duration::from_secs(self.record_duration_secs.max(1))
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            record_duration_secs: default_record_duration_secs(),
        }
    }
}
