use crate::{AppCommand, AppResult, TrayCommand, TrayMenuIds};

use capture_relay_core::{
    IndicatorState, Message, SessionCoordinator, SessionState, StartOutcome, Trigger,
};

use std::{path::PathBuf, sync::Arc, time::Duration};

use tao::event_loop::EventLoopProxy;
use tokio::sync::{broadcast, mpsc, watch};
use tracing::{debug, error, info, instrument, warn};
use tray_icon::{MouseButton, MouseButtonState, TrayIconEvent, menu::MenuEvent};

/// Main application state.
///
/// Runs on the async runtime thread. Communicates tray icon updates
/// back to the main thread via `tray_proxy` because `TrayIcon` is `!Send`
/// and must remain on the UI thread.
pub struct App {
    pub(crate) coordinator: Arc<SessionCoordinator>,
    pub(crate) tray_proxy: EventLoopProxy<TrayCommand>,
    pub(crate) command_tx: mpsc::Sender<AppCommand>,
    pub(crate) command_rx: mpsc::Receiver<AppCommand>,
    pub(crate) worker_rx: mpsc::Receiver<Message>,
    pub(crate) shutdown_tx: watch::Sender<bool>,
    pub(crate) menu_ids: TrayMenuIds,
    pub(crate) recordings_dir: PathBuf,
    pub(crate) max_duration: Option<Duration>,
}

/// Tray input forwarded from the blocking crossbeam receivers.
enum TrayInput {
    Menu(MenuEvent),
    Icon(TrayIconEvent),
}

impl App {
    /// Run the main application event loop.
    #[instrument(skip(self))]
    pub(crate) async fn run(mut self) -> AppResult<()> {
        info!("Capture Relay starting");

        self.coordinator.on_startup().await;
        let mut status_rx = self.coordinator.subscribe();
        let mut indicator = IndicatorState::from(self.coordinator.state().await);

        // MenuEvent and TrayIconEvent receivers are blocking crossbeam
        // receivers. Each forwarder exits on the first blocking_send after
        // tray_input_rx drops.
        let (tray_input_tx, mut tray_input_rx) = mpsc::channel(32);
        let menu_tx = tray_input_tx.clone();
        let menu_handle = tokio::task::spawn_blocking(move || {
            let receiver = MenuEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if menu_tx.blocking_send(TrayInput::Menu(event)).is_err() {
                    break;
                }
            }
        });
        let icon_handle = tokio::task::spawn_blocking(move || {
            let receiver = TrayIconEvent::receiver();
            while let Ok(event) = receiver.recv() {
                if tray_input_tx.blocking_send(TrayInput::Icon(event)).is_err() {
                    break;
                }
            }
        });

        loop {
            tokio::select! {
                Some(input) = tray_input_rx.recv() => match input {
                    TrayInput::Menu(event) => self.handle_menu_event(event).await,
                    TrayInput::Icon(event) => self.handle_icon_event(event, indicator),
                },

                Some(message) = self.worker_rx.recv() => {
                    self.coordinator
                        .handle_message(message, Trigger::NativeStopSharing)
                        .await;
                }

                status = status_rx.recv() => match status {
                    Ok(event) => {
                        indicator = IndicatorState::from(event.state);
                        self.refresh_tray(indicator, event.message);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        let state = self.coordinator.state().await;
                        warn!(skipped, state = %state, "Status observer lagged, resyncing");
                        indicator = IndicatorState::from(state);
                        self.refresh_tray(indicator, state.to_string());
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Status channel closed, shutting down");
                        break;
                    }
                },

                Some(cmd) = self.command_rx.recv() => {
                    if cmd == AppCommand::Shutdown {
                        info!("Shutdown requested");
                        break;
                    }
                    self.dispatch(cmd);
                }

                else => {
                    info!("All channels closed, shutting down");
                    break;
                }
            }
        }

        drop(tray_input_rx);

        for (name, handle) in [("menu", menu_handle), ("icon", icon_handle)] {
            match tokio::time::timeout(Duration::from_secs(1), handle).await {
                Ok(Ok(())) => debug!(forwarder = name, "Tray event forwarder stopped cleanly"),
                Ok(Err(e)) => {
                    error!(forwarder = name, error = ?e, "Tray event forwarder task panicked")
                }
                Err(_) => debug!(
                    forwarder = name,
                    "Tray event forwarder did not stop within timeout, \
                         will be cleaned up on exit"
                ),
            }
        }

        let _ = self.shutdown_tx.send(true);
        info!("Capture Relay shut down successfully");

        Ok(())
    }

    /// Run a coordinator operation off the event loop.
    ///
    /// The picker can stay open indefinitely, so a start must not block
    /// stops arriving from other surfaces.
    fn dispatch(&self, cmd: AppCommand) {
        let coordinator = Arc::clone(&self.coordinator);
        let max_duration = self.max_duration;

        tokio::spawn(async move {
            match cmd {
                AppCommand::Toggle { trigger } => {
                    let was_idle = coordinator.state().await == SessionState::Idle;
                    coordinator.handle_toggle(trigger).await;
                    if was_idle {
                        arm_auto_stop(&coordinator, max_duration).await;
                    }
                }
                AppCommand::Start { trigger } => {
                    if coordinator.handle_start(trigger).await == StartOutcome::Started {
                        arm_auto_stop(&coordinator, max_duration).await;
                    }
                }
                AppCommand::Stop { trigger } => coordinator.handle_stop(trigger).await,
                AppCommand::Shutdown => {}
            }
        });
    }

    /// Left clicks while the popup is disabled are an unconditional stop.
    fn handle_icon_event(&self, event: TrayIconEvent, indicator: IndicatorState) {
        if let TrayIconEvent::Click {
            button: MouseButton::Left,
            button_state: MouseButtonState::Up,
            ..
        } = event
        {
            if indicator.popup_enabled {
                debug!("Icon click while idle opens the menu");
            } else {
                self.dispatch(AppCommand::Stop {
                    trigger: Trigger::ActionIcon,
                });
            }
        }
    }

    /// Handle tray menu events.
    #[instrument(skip(self))]
    async fn handle_menu_event(&self, event: MenuEvent) {
        let event_id = &event.id;

        if *event_id == self.menu_ids.start {
            self.dispatch(AppCommand::Start {
                trigger: Trigger::Popup,
            });
        } else if *event_id == self.menu_ids.stop {
            self.dispatch(AppCommand::Stop {
                trigger: Trigger::Popup,
            });
        } else if *event_id == self.menu_ids.open_folder {
            if let Err(e) = tokio::fs::create_dir_all(&self.recordings_dir).await {
                warn!(error = %e, "Failed to create recordings folder");
            }
            match open::that(&self.recordings_dir) {
                Ok(()) => info!(path = ?self.recordings_dir, "Opened recordings folder"),
                Err(e) => warn!(error = %e, "Failed to open recordings folder"),
            }
        } else if *event_id == self.menu_ids.exit {
            info!("Exit requested from tray menu");
            if self.tray_proxy.send_event(TrayCommand::Shutdown).is_err() {
                debug!("Event loop already closed");
            }
            if let Err(e) = self.command_tx.send(AppCommand::Shutdown).await {
                error!(error = ?e, "Failed to send shutdown command");
            }
        }
    }

    fn refresh_tray(&self, indicator: IndicatorState, message: String) {
        let command = TrayCommand::Refresh { indicator, message };
        if self.tray_proxy.send_event(command).is_err() {
            debug!("Event loop closed, dropping tray refresh");
        }
    }
}

/// Stop the session that just started once `max_duration` elapses. A later
/// session is never stopped by an earlier session's timer.
async fn arm_auto_stop(coordinator: &Arc<SessionCoordinator>, max_duration: Option<Duration>) {
    let Some(limit) = max_duration else {
        return;
    };
    let snapshot = coordinator.snapshot().await;
    let recording = snapshot.state == SessionState::Recording;
    let Some(session_id) = snapshot.session_id.filter(|_| recording) else {
        return;
    };

    info!(session_id = %session_id, limit_secs = limit.as_secs(), "Auto-stop armed");
    let coordinator = Arc::clone(coordinator);
    tokio::spawn(async move {
        tokio::time::sleep(limit).await;
        coordinator.stop_if_current(session_id, Trigger::AutoStop).await;
    });
}
