//! Maps controller UI events onto tray updates and notifications.

use crate::{NotificationContent, TrayCommand, TrayIconState};

use song_sleuth_core::{Page, SessionState, Song, UiEvent};

/// Something the shell must do in response to a UI event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Forward to the main thread.
    Tray(TrayCommand),
    /// Show a desktop notification.
    Notify(NotificationContent),
}

/// What the tray currently shows, so only real changes are forwarded.
#[derive(Debug)]
pub struct Presentation {
    icon: TrayIconState,
    session: SessionState,
    latest: Option<Song>,
}

impl Presentation {
    /// Start idle, with the most recent stored song if any.
    pub fn new(latest: Option<Song>) -> Self {
        Self {
            icon: TrayIconState::Idle,
            session: SessionState::Idle,
            latest,
        }
    }

    /// Most recent song, for "Open last song".
    pub fn latest(&self) -> Option<&Song> {
        self.latest.as_ref()
    }

    /// Current menu enablement.
    pub fn menu_state(&self) -> TrayCommand {
        TrayCommand::SetMenuState {
            can_listen: self.session.is_idle(),
            can_cancel: self.session.is_listening(),
            has_latest: self.latest.is_some(),
        }
    }

    /// Drop the latest song ahead of the controller confirming a clear.
    pub fn forget_latest(&mut self) -> TrayCommand {
        self.latest = None;
        self.menu_state()
    }

    /// Effects for one UI event, in the order they should run.
    pub fn apply(&mut self, event: &UiEvent) -> Vec<Effect> {
        let mut effects = Vec::new();

        if let Some(icon) = TrayIconState::from_event(event) {
            if icon != self.icon {
                self.icon = icon;
                effects.push(Effect::Tray(TrayCommand::SetState(icon)));
            }
        }

        match event {
            UiEvent::SessionStateChanged(state) => {
                self.session = *state;
                effects.push(Effect::Tray(self.menu_state()));
            }
            UiEvent::RecognitionSucceeded(song) => {
                self.latest = Some(song.clone());
                effects.push(Effect::Notify(NotificationContent::for_match(song)));
                effects.push(Effect::Tray(self.menu_state()));
            }
            UiEvent::RecognitionFailed(message) => {
                effects.push(Effect::Notify(NotificationContent::for_failure(message)));
            }
            UiEvent::PageChanged(Page::EmptyState) if self.latest.is_some() => {
                self.latest = None;
                effects.push(Effect::Tray(self.menu_state()));
            }
            UiEvent::ListeningFeedbackChanged(_)
            | UiEvent::HistoryChanged
            | UiEvent::PageChanged(_) => {}
        }

        effects
    }
}
