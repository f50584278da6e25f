use crate::TrayIconState;

/// Commands sent from the async runtime to the main UI thread.
///
/// The main thread owns `TrayManager` (because `TrayIcon` and menu items are
/// `!Send`), so all tray mutations and process lifecycle events flow through
/// this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    /// Update the tray icon to a new state.
    SetState(TrayIconState),
    /// Enable or disable menu entries to match what can be done right now.
    SetMenuState {
        /// No session is running.
        can_listen: bool,
        /// A capture is running.
        can_cancel: bool,
        /// There is a song to open.
        has_latest: bool,
    },
    /// Shut down the application. The main thread will exit the event loop.
    Shutdown,
}
