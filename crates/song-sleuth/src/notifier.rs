//! Desktop notifications for finished recognition sessions.

use song_sleuth_core::Song;

use notify_rust::Notification;
use tracing::{debug, instrument, warn};

const APP_NAME: &str = "Song Sleuth";

/// Content of one desktop notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    /// Headline.
    pub summary: String,
    /// Detail line.
    pub body: String,
}

impl NotificationContent {
    /// "Title" by "Artist".
    pub fn for_match(song: &Song) -> Self {
        Self {
            summary: song.title.clone(),
            body: format!("by {}", song.artist),
        }
    }

    /// Failure message as shown to the user.
    pub fn for_failure(message: &str) -> Self {
        Self {
            summary: APP_NAME.to_string(),
            body: message.to_string(),
        }
    }
}

/// Shows session outcomes as desktop notifications, if enabled.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    /// Create a notifier; a disabled one only logs.
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Show `content` without blocking the caller.
    #[instrument(skip(self))]
    pub fn show(&self, content: NotificationContent) {
        if !self.enabled {
            debug!("Notifications disabled");
            return;
        }

        // Some platforms block in show() until the daemon answers.
        tokio::task::spawn_blocking(move || {
            if let Err(e) = Notification::new()
                .appname(APP_NAME)
                .summary(&content.summary)
                .body(&content.body)
                .show()
            {
                warn!(error = %e, "Failed to show notification");
            }
        });
    }
}
