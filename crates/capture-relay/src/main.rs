//! Capture Relay: desktop screen recording driven from a tray icon and a
//! global hotkey.

mod app;
mod app_command;
mod artifact_sink;
mod capture_engine;
mod config;
mod error;
mod hotkey_handler;
mod source_picker;
mod tray_command;
mod tray_manager;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    artifact_sink::DirectoryArtifactSink,
    capture_engine::ProcessEngineFactory,
    error::{AppError, Result as AppResult},
    hotkey_handler::HotkeyHandler,
    source_picker::ConfiguredSourcePicker,
    tray_command::TrayCommand,
    tray_manager::{TrayManager, TrayMenuIds},
};

use crate::config::Config;

use capture_relay_core::{LocalWorkerHost, MemorySessionStore, SessionCoordinator};

use std::sync::Arc;

use global_hotkey::GlobalHotKeyManager;
use tao::{
    event::Event,
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;

/// Application entry point.
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("capture_relay=debug,capture_relay_core=debug")
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

    // Dropping the manager unregisters the hotkey.
    let mut hotkey_manager: Option<GlobalHotKeyManager> = None;

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(cmd) => {
                match cmd {
                    TrayCommand::Refresh { indicator, message } => {
                        if let Err(e) = tray_manager.refresh(indicator, &message) {
                            error!(error = ?e, "Failed to update tray icon");
                        }
                    }
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

                // Register on the main thread; tao's event loop pumps the
                // messages hotkey delivery depends on.
                let (manager, hotkey_id) =
                    match HotkeyHandler::register_hotkey(&config.hotkey.accelerator) {
                        Ok(pair) => pair,
                        Err(e) => {
                            error!("Failed to register hotkey: {:?}", e);
                            std::process::exit(1);
                        }
                    };
                hotkey_manager = Some(manager);

                let tray_proxy = tray_proxy.clone();
                let menu_ids = tray_manager.menu_ids().clone();

                // Tokio runtime on its own thread. TrayManager and
                // hotkey_manager stay on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let (command_tx, command_rx) = mpsc::channel(32);
                        let (shutdown_tx, shutdown_rx) = watch::channel(false);

                        let recordings_dir = config.output.directory.clone();
                        let engines = ProcessEngineFactory::new(
                            config.capture.clone(),
                            recordings_dir.clone(),
                        );
                        let sink = DirectoryArtifactSink::new(
                            recordings_dir.clone(),
                            config.output.file_prefix.clone(),
                        );
                        let (host, worker_rx) = LocalWorkerHost::new(
                            Arc::new(engines),
                            Arc::new(sink),
                            config.host_settings(),
                        );
                        let coordinator = Arc::new(SessionCoordinator::new(
                            Arc::new(MemorySessionStore::new()),
                            Arc::new(host),
                            Arc::new(ConfiguredSourcePicker::new(
                                config.capture.default_source.clone(),
                            )),
                            config.coordinator_settings(),
                        ));

                        let hotkey_handler = HotkeyHandler::new(hotkey_id, command_tx.clone());

                        let app = App {
                            coordinator,
                            tray_proxy,
                            command_tx,
                            command_rx,
                            worker_rx,
                            shutdown_tx,
                            menu_ids,
                            recordings_dir,
                            max_duration: config.max_duration(),
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
                            }
                        );
                    });
                });
            }
            _ => {}
        }

        // Keep hotkey_manager alive in the closure for the app's lifetime.
        let _ = &hotkey_manager;
    });
}
