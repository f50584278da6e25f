use crate::config::default_notifications;

use serde::{Deserialize, Serialize};

/// Application behavior configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Whether to show a desktop notification when a session ends.
    #[serde(default = "default_notifications")]
    pub notifications: bool,
}

impl Default for BehaviourConfig {
    fn default() -> Self {
        Self {
            notifications: default_notifications(),
        }
    }
}
