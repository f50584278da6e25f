//! System tray icon with state-based updates.
//!
//! The icon mirrors the session (idle, listening with signal strength,
//! recognizing) and the context menu drives it: Listen, Cancel, Open last
//! song, Clear history, Exit.

use crate::{AppError, AppResult, TrayIconState};

use song_sleuth_core::PeakCategory;

use std::panic::Location;

use error_location::ErrorLocation;
use tracing::{debug, info, instrument};
use tray_icon::menu::{IsMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem};
use tray_icon::{Icon, TrayIcon, TrayIconBuilder};

/// What a tray menu entry asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayAction {
    /// Start a recognition session.
    Listen,
    /// Abandon the running capture.
    Cancel,
    /// Open the most recent song's link.
    OpenLastSong,
    /// Forget every recognized song.
    ClearHistory,
    /// Quit.
    Exit,
}

/// Menu entry IDs, `Send` so the async side can match menu events.
#[derive(Debug, Clone)]
pub struct TrayMenuIds {
    pub(crate) listen: MenuId,
    pub(crate) cancel: MenuId,
    pub(crate) open_last_song: MenuId,
    pub(crate) clear_history: MenuId,
    pub(crate) exit: MenuId,
}

impl TrayMenuIds {
    /// Action for a clicked menu entry; `None` for foreign IDs.
    pub fn action_for(&self, id: &MenuId) -> Option<TrayAction> {
        if *id == self.listen {
            Some(TrayAction::Listen)
        } else if *id == self.cancel {
            Some(TrayAction::Cancel)
        } else if *id == self.open_last_song {
            Some(TrayAction::OpenLastSong)
        } else if *id == self.clear_history {
            Some(TrayAction::ClearHistory)
        } else if *id == self.exit {
            Some(TrayAction::Exit)
        } else {
            None
        }
    }
}

/// System tray icon manager.
pub struct TrayManager {
    tray_icon: TrayIcon,
    listen_item: MenuItem,
    cancel_item: MenuItem,
    open_last_song_item: MenuItem,
    clear_history_item: MenuItem,
    menu_ids: TrayMenuIds,
}

impl TrayManager {
    /// Create a new tray manager in the idle state.
    #[track_caller]
    #[instrument]
    pub fn new() -> AppResult<Self> {
        let menu = Menu::new();

        let listen_item = MenuItem::new("Listen", true, None);
        let cancel_item = MenuItem::new("Cancel", false, None);
        let open_last_song_item = MenuItem::new("Open last song", false, None);
        let clear_history_item = MenuItem::new("Clear history", false, None);
        let exit_item = MenuItem::new("Exit", true, None);

        let menu_ids = TrayMenuIds {
            listen: listen_item.id().clone(),
            cancel: cancel_item.id().clone(),
            open_last_song: open_last_song_item.id().clone(),
            clear_history: clear_history_item.id().clone(),
            exit: exit_item.id().clone(),
        };

        let separator = PredefinedMenuItem::separator();
        let items: [(&dyn IsMenuItem, &str); 6] = [
            (&listen_item, "listen"),
            (&cancel_item, "cancel"),
            (&open_last_song_item, "open last song"),
            (&clear_history_item, "clear history"),
            (&separator, "separator"),
            (&exit_item, "exit"),
        ];

        for (item, name) in items {
            menu.append(item).map_err(|e| AppError::TrayError {
                reason: format!("Failed to add {} menu: {}", name, e),
                location: ErrorLocation::from(Location::caller()),
            })?;
        }

        let state = TrayIconState::Idle;
        let icon = Self::load_icon(state)?;

        let tray_icon = TrayIconBuilder::new()
            .with_tooltip(state.tooltip())
            .with_menu(Box::new(menu))
            .with_icon(icon)
            .build()
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to create tray icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!("System tray icon initialized");

        Ok(Self {
            tray_icon,
            listen_item,
            cancel_item,
            open_last_song_item,
            clear_history_item,
            menu_ids,
        })
    }

    /// Update the tray icon state with new icon and tooltip.
    #[track_caller]
    #[instrument(skip(self))]
    pub fn update_state(&mut self, state: TrayIconState) -> AppResult<()> {
        let icon = Self::load_icon(state)?;

        self.tray_icon
            .set_icon(Some(icon))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update icon: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        self.tray_icon
            .set_tooltip(Some(state.tooltip()))
            .map_err(|e| AppError::TrayError {
                reason: format!("Failed to update tooltip: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        Ok(())
    }

    /// Enable the menu entries that apply right now.
    pub fn update_menu(&self, can_listen: bool, can_cancel: bool, has_latest: bool) {
        self.listen_item.set_enabled(can_listen);
        self.cancel_item.set_enabled(can_cancel);
        self.open_last_song_item.set_enabled(has_latest);
        self.clear_history_item.set_enabled(has_latest);

        debug!(can_listen, can_cancel, has_latest, "Tray menu updated");
    }

    /// Load icon from compile-time embedded PNG bytes.
    ///
    /// Icons are embedded via include_bytes! so they work regardless of
    /// install location.
    #[track_caller]
    fn load_icon(state: TrayIconState) -> AppResult<Icon> {
        let png_bytes: &[u8] = match state {
            TrayIconState::Idle => include_bytes!("../resources/icons/idle.png"),
            TrayIconState::Listening(PeakCategory::High) => {
                include_bytes!("../resources/icons/listening-high.png")
            }
            TrayIconState::Listening(PeakCategory::Medium) => {
                include_bytes!("../resources/icons/listening-medium.png")
            }
            TrayIconState::Listening(PeakCategory::Low) => {
                include_bytes!("../resources/icons/listening-low.png")
            }
            TrayIconState::Listening(PeakCategory::Muted) => {
                include_bytes!("../resources/icons/muted.png")
            }
            TrayIconState::AwaitingResult => include_bytes!("../resources/icons/awaiting.png"),
        };

        let img = image::load_from_memory(png_bytes).map_err(|e| AppError::TrayError {
            reason: format!("Failed to decode embedded icon: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })?;

        let rgba = img.into_rgba8();
        let (width, height) = (rgba.width(), rgba.height());

        Icon::from_rgba(rgba.into_raw(), width, height).map_err(|e| AppError::TrayError {
            reason: format!("Failed to create icon from RGBA: {}", e),
            location: ErrorLocation::from(Location::caller()),
        })
    }

    /// IDs of the menu entries.
    pub fn menu_ids(&self) -> &TrayMenuIds {
        &self.menu_ids
    }
}
