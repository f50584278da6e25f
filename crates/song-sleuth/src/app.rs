use crate::{AppError, AppResult, Effect, Notifier, Presentation, TrayAction, TrayCommand, TrayMenuIds};

use song_sleuth_core::{SessionCommand, SessionState, UiEvent};

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use tao::event_loop::EventLoopProxy;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::menu::MenuEvent;

/// Presentation shell.
///
/// Runs on the async runtime thread next to the session controller. Tray
/// mutations go back to the main thread through `tray_proxy` because
/// `TrayIcon` is `!Send` and must remain on the UI thread.
pub struct App {
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) session_tx: mpsc::Sender<SessionCommand>,
    pub(crate) ui_events: broadcast::Receiver<UiEvent>,
    pub(crate) session_state_tx: watch::Sender<SessionState>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu_ids: TrayMenuIds,
    pub(crate) notifier: Notifier,
    pub(crate) presentation: Presentation,
}

impl App {
    /// Run the shell until Exit is chosen or the controller goes away.
    ///
    /// On exit the controller is told to shut down (which flushes history)
    /// and the hotkey handler is signalled.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Song Sleuth starting");

        self.send_tray(self.presentation.menu_state());

        // MenuEvent::receiver() is a blocking crossbeam receiver; one
        // persistent blocking task forwards it. Dropping tray_event_rx makes
        // the next blocking_send fail, which ends the task.
        let (tray_event_tx, mut tray_event_rx) = mpsc::channel(32);
        let tray_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_event_tx.blocking_send(event).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(event) = tray_event_rx.recv() => {
                    match self.menu_ids.action_for(&event.id) {
                        Some(TrayAction::Exit) => {
                            info!("Exit requested from tray menu");
                            break;
                        }
                        Some(action) => {
                            if let Err(e) = self.handle_tray_action(action).await {
                                error!(error = ?e, action = ?action, "Failed to handle tray action");
                            }
                        }
                        None => debug!(menu_id = ?event.id, "Unknown menu event"),
                    }
                }

                result = self.ui_events.recv() => {
                    match result {
                        Ok(event) => self.present(&event),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "UI events lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            info!("Session controller stopped");
                            break;
                        }
                    }
                }
            }
        }

        if let Err(e) = self.session_tx.send(SessionCommand::Shutdown).await {
            // Controller already gone: nothing left to flush.
            debug!(error = %e, "Session controller already stopped");
        }
        let _ = self.shutdown_tx.send(true);

        drop(tray_event_rx);

        match tokio::time::timeout(Duration::from_secs(1), tray_handle).await {
            Ok(Ok(())) => debug!("Tray event forwarder stopped cleanly"),
            Ok(Err(e)) => error!(error = ?e, "Tray event forwarder task panicked"),
            Err(_) => debug!(
                "Tray event forwarder did not stop within timeout, \
                     will be cleaned up on exit"
            ),
        }

        info!("Song Sleuth shell stopped");

        Ok(())
    }

    /// Apply one UI event to the tray, notifications and hotkey state.
    fn present(&mut self, event: &UiEvent) {
        if let UiEvent::SessionStateChanged(state) = event {
            self.session_state_tx.send_replace(*state);
        }

        for effect in self.presentation.apply(event) {
            match effect {
                Effect::Tray(command) => self.send_tray(command),
                Effect::Notify(content) => self.notifier.show(content),
            }
        }
    }

    #[instrument(skip(self))]
    async fn handle_tray_action(&mut self, action: TrayAction) -> AppResult<()> {
        let command = match action {
            TrayAction::Listen => SessionCommand::Start,
            TrayAction::Cancel => SessionCommand::Cancel,
            TrayAction::ClearHistory => {
                let menu_state = self.presentation.forget_latest();
                self.send_tray(menu_state);
                SessionCommand::ClearHistory
            }
            TrayAction::OpenLastSong => {
                match self.presentation.latest() {
                    Some(song) => {
                        let link = song.song_link.clone();
                        open::that(&link)?;
                        info!(song_link = %link, "Opened last song");
                    }
                    None => debug!("No song to open"),
                }
                return Ok(());
            }
            TrayAction::Exit => SessionCommand::Shutdown,
        };

        self.session_tx
            .send(command)
            .await
            .map_err(|e| AppError::ChannelSendFailed {
                message: format!("Failed to send {:?}: {}", action, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    fn send_tray(&self, command: TrayCommand) {
        if let Err(e) = self.tray_proxy.send_event(command) {
            debug!(error = %e, "Tray event loop closed");
        }
    }
}
