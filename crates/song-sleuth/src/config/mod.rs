mod audio_config;
mod behaviour_config;
#[allow(clippy::module_inception)]
mod config;
mod recognition_config;

pub(crate) use {
    audio_config::AudioConfig, behaviour_config::BehaviourConfig, config::{Config, write_atomic},
    recognition_config::RecognitionConfig,
};

use song_sleuth_core::{DEFAULT_ENDPOINT, DEFAULT_RECOGNITION_TIMEOUT, DEFAULT_RECORD_DURATION};

pub(crate) const DEFAULT_NOTIFICATIONS: bool = true;

pub(crate) fn default_notifications() -> bool {
    DEFAULT_NOTIFICATIONS
}

pub(crate) fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

pub(crate) fn default_timeout_secs() -> u64 {
    DEFAULT_RECOGNITION_TIMEOUT.as_secs()
}

pub(crate) fn default_record_duration_secs() -> u64 {
    DEFAULT_RECORD_DURATION.as_secs()
}
