//! Global hotkey handler.
//!
//! Registers CTRL+SHIFT+L as a global hotkey. A press starts listening when
//! idle and cancels a running capture; it does nothing while a recognition is
//! in flight.

use crate::{AppError, AppResult};

use song_sleuth_core::{SessionCommand, SessionState};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Human-readable hotkey, for logs.
pub const HOTKEY_LABEL: &str = "CTRL+SHIFT+L";

/// Global hotkey handler.
pub struct HotkeyHandler {
    hotkey_id: u32,
    session_state: watch::Receiver<SessionState>,
    command_tx: mpsc::Sender<SessionCommand>,
}

impl HotkeyHandler {
    /// Register CTRL+SHIFT+L as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey() -> AppResult<(GlobalHotKeyManager, u32)> {
        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        let hotkey = HotKey::new(Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyL);

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", HOTKEY_LABEL, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = HOTKEY_LABEL, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// `session_state` tracks the controller's state so a press can toggle
    /// between listening and cancelling.
    pub fn new(
        hotkey_id: u32,
        session_state: watch::Receiver<SessionState>,
        command_tx: mpsc::Sender<SessionCommand>,
    ) -> Self {
        Self {
            hotkey_id,
            session_state,
            command_tx,
        }
    }

    /// Run the hotkey handler event loop until a shutdown signal arrives.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // Single persistent blocking forwarder. Dropping event_rx makes the
        // next blocking_send fail, which ends the loop.
        let handle = tokio::task::spawn_blocking(move || {
            while let Ok(event) = receiver.recv() {
                if event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                _ = shutdown_rx.changed() => {
                    info!("Hotkey handler shutting down");
                    break;
                }
                Some(event) = event_rx.recv() => {
                    // Each press also fires a Released event.
                    if event.id == self.hotkey_id && event.state == HotKeyState::Pressed {
                        if let Err(e) = self.handle_hotkey_press().await {
                            warn!(error = ?e, "Hotkey press dropped");
                        }
                    }
                }
            }
        }

        drop(event_rx);

        // The forwarder may sit in recv() until the next hotkey event; it is
        // cleaned up on process exit regardless.
        match tokio::time::timeout(Duration::from_secs(1), handle).await {
            Ok(Ok(())) => debug!("Hotkey event forwarder stopped cleanly"),
            Ok(Err(e)) => warn!(error = ?e, "Hotkey event forwarder task panicked"),
            Err(_) => debug!(
                "Hotkey event forwarder did not stop within timeout, \
                   will be cleaned up on exit"
            ),
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn handle_hotkey_press(&self) -> AppResult<()> {
        let state = *self.session_state.borrow();

        let Some(command) = command_for_press(state) else {
            debug!("Recognition in flight, hotkey ignored");
            return Ok(());
        };

        info!(command = ?command, "Hotkey pressed");

        self.command_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send hotkey command: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })
    }
}

/// Command a hotkey press issues in `state`.
pub fn command_for_press(state: SessionState) -> Option<SessionCommand> {
    match state {
        SessionState::Idle => Some(SessionCommand::Start),
        SessionState::Listening { .. } => Some(SessionCommand::Cancel),
        SessionState::AwaitingResult { .. } => None,
    }
}
