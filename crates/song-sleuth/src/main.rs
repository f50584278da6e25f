//! Song Sleuth: identify the song playing around you from the system tray.

mod app;
mod config;
mod error;
mod hotkey_handler;
mod notifier;
mod presentation;
mod settings_store;
mod tray_command;
mod tray_icon_state;
mod tray_manager;

pub(crate) use {
    app::App,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    notifier::{NotificationContent, Notifier},
    presentation::{Effect, Presentation},
    settings_store::{HISTORY_FILE_NAME, TomlSettingsStore},
    tray_command::TrayCommand,
    tray_icon_state::TrayIconState,
    tray_manager::{TrayAction, TrayManager, TrayMenuIds},
};

use crate::config::Config;

use song_sleuth_core::{
    AuddClient, Collaborators, ControllerOptions, CpalRecorder, HttpImageFetcher,
    SessionCommand, SessionController, SessionState,
};

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder, EventLoopProxy},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Commands buffered for the session controller. Peak readings from the
/// capture worker are dropped rather than queued once this fills.
const SESSION_COMMAND_CAPACITY: usize = 64;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("song_sleuth=debug,song_sleuth_core=debug")),
        )
        .init();

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new() {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Dropping it unregisters the hotkey, so it lives in the closure.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::SetState(state) => {
                        if let Err(e) = tray_manager.update_state(state) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
                    TrayCommand::SetMenuState {
                        can_listen,
                        can_cancel,
                        has_latest,
                    } => tray_manager.update_menu(can_listen, can_cancel, has_latest),
                    TrayCommand::Shutdown => {
                        *control_flow = ControlFlow::ExitWithCode(0);
                    }
                }
                return;
            }
            Event::NewEvents(tao::event::StartCause::Init) => {
                let config = match Config::load() {
                    Ok(c) => c,
                    Err(e) => {
                        error!("Failed to load config: {:?}", e);
                        std::process::exit(1);
                    }
                };

                #[cfg(target_os = "macos")]
                unsafe {
                    use core_foundation::runloop::{CFRunLoopGetMain, CFRunLoopWakeUp};
                    CFRunLoopWakeUp(CFRunLoopGetMain());
                }

                // Registered on the main thread: tao's event loop pumps the
                // Windows messages needed for WM_HOTKEY delivery.
                let (manager, hotkey_id) = match HotkeyHandler::register_hotkey() {
                    Ok(pair) => pair,
                    Err(e) => {
                        error!("Failed to register hotkey: {:?}", e);
                        std::process::exit(1);
                    }
                };
                hotkey_manager = Some(manager);

                let tray_proxy = tray_proxy.clone();
                let menu_ids = tray_manager.menu_ids().clone();

                // The tokio runtime runs on its own thread; the tray and the
                // hotkey manager stay here.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(run_services(config, hotkey_id, menu_ids, tray_proxy.clone()));

                    // History is flushed by now; let the main thread exit.
                    let _ = tray_proxy.send_event(TrayCommand::Shutdown);
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}

/// Build the controller and shell, then run them with the hotkey handler
/// until the shell exits and the controller has flushed.
async fn run_services(
    config: Config,
    hotkey_id: u32,
    menu_ids: TrayMenuIds,
    tray_proxy: EventLoopProxy<TrayCommand>,
) {
    let (session_tx, session_rx) = mpsc::channel(SESSION_COMMAND_CAPACITY);
    let (session_state_tx, session_state_rx) = watch::channel(SessionState::Idle);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let controller = match build_controller(&config, session_tx.clone()) {
        Ok(controller) => controller,
        Err(e) => {
            error!(error = ?e, "Failed to start session controller");
            return;
        }
    };

    let hotkey_handler = HotkeyHandler::new(hotkey_id, session_state_rx, session_tx.clone());

    let app = App {
        tray_proxy,
        session_tx,
        ui_events: controller.subscribe(),
        session_state_tx,
        shutdown_tx,
        menu_ids,
        notifier: Notifier::new(config.behavior.notifications),
        presentation: Presentation::new(controller.memory_list().latest().cloned()),
    };

    tokio::join!(
        async {
            if let Err(e) = hotkey_handler.run(shutdown_rx).await {
                error!(error = ?e, "Hotkey handler error");
            }
        },
        async {
            if let Err(e) = app.run().await {
                error!(error = ?e, "App error");
            }
        },
        async {
            if let Err(e) = controller.run(session_rx).await {
                error!(error = ?e, "Session controller error");
            }
        }
    );

    info!("Song Sleuth shut down successfully");
}

fn build_controller(
    config: &Config,
    session_tx: mpsc::Sender<SessionCommand>,
) -> AppResult<SessionController> {
    let settings = TomlSettingsStore::new(
        Config::data_dir()?.join(HISTORY_FILE_NAME),
        config.recognition.token.clone(),
    );
    let artifact_dir = std::env::temp_dir();

    info!(
        history_path = ?settings.history_path(),
        artifact_dir = ?artifact_dir,
        recognition = ?config.recognition,
        "Building session controller"
    );

    let collaborators = Collaborators {
        audio: Box::new(CpalRecorder::new(
            artifact_dir,
            config.audio.record_duration(),
            session_tx.clone(),
        )?),
        recognizer: Arc::new(AuddClient::new(config.recognition.endpoint.clone())?),
        image_fetcher: Arc::new(HttpImageFetcher::new()?),
        settings: Box::new(settings),
    };

    let options = ControllerOptions {
        recognition_timeout: config.recognition.timeout(),
        image_cache_dir: Config::cover_cache_dir()?,
    };

    Ok(SessionController::init(collaborators, options, session_tx)?)
}
