mod command;
mod controller;
mod recording_session;
mod state;
mod ui_event;

pub use {
    command::SessionCommand,
    controller::{
        CAPTURE_FAILED_MESSAGE, Collaborators, ControllerOptions, DEFAULT_RECOGNITION_TIMEOUT,
        SessionController,
    },
    recording_session::RecordingSession,
    state::SessionState,
    ui_event::{Page, UiEvent},
};
