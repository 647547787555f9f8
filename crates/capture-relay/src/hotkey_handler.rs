//! Global hotkey handler.
//!
//! Registers the configured accelerator and forwards each press to the main
//! application as a toggle. The coordinator decides whether that starts or
//! stops a session.

use crate::{AppCommand, AppError, AppResult};

use capture_relay_core::Trigger;

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use global_hotkey::{GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState, hotkey::HotKey};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, instrument, warn};

/// Forwards presses of the registered hotkey as [`AppCommand::Toggle`].
pub struct HotkeyHandler {
    hotkey_id: u32,
    command_tx: mpsc::Sender<AppCommand>,
}

impl HotkeyHandler {
    /// Parse an accelerator such as `ctrl+shift+KeyR`.
    #[track_caller]
    pub fn parse_accelerator(accelerator: &str) -> AppResult<HotKey> {
        accelerator
            .parse::<HotKey>()
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Invalid accelerator {:?}: {}", accelerator, e),
                location: ErrorLocation::from(Location::caller()),
            })
    }

    /// Register `accelerator` as the global hotkey.
    ///
    /// Must be called on a thread with a message pump (e.g. the main thread
    /// running a `tao`/`winit` event loop) so that `WM_HOTKEY` messages are
    /// dispatched on Windows. The returned [`GlobalHotKeyManager`] must be
    /// kept alive on that thread for the hotkey to remain registered.
    #[track_caller]
    #[instrument]
    pub fn register_hotkey(accelerator: &str) -> AppResult<(GlobalHotKeyManager, u32)> {
        let hotkey = Self::parse_accelerator(accelerator)?;

        let manager =
            GlobalHotKeyManager::new().map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to create manager: {}", e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        manager
            .register(hotkey)
            .map_err(|e| AppError::HotkeyRegistrationFailed {
                reason: format!("Failed to register {}: {}", accelerator, e),
                location: ErrorLocation::from(Location::caller()),
            })?;

        info!(hotkey = accelerator, "Global hotkey registered");

        Ok((manager, hotkey.id()))
    }

    /// Create a handler for a previously registered hotkey.
    ///
    /// The `hotkey_id` should come from [`register_hotkey`](Self::register_hotkey).
    pub fn new(hotkey_id: u32, command_tx: mpsc::Sender<AppCommand>) -> Self {
        Self {
            hotkey_id,
            command_tx,
        }
    }

    /// Run the hotkey handler event loop until shutdown is signalled.
    #[instrument(skip(self))]
    pub async fn run(&self, mut shutdown_rx: watch::Receiver<bool>) -> AppResult<()> {
        let receiver = GlobalHotKeyEvent::receiver().clone();
        let (event_tx, mut event_rx) = mpsc::channel(32);

        // GlobalHotKeyEvent::receiver() is a blocking crossbeam receiver.
        // The forwarder exits on the first blocking_send after event_rx drops.
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
                    if let Some(command) = self.command_for(&event) {
                        self.command_tx.send(command).await.map_err(|e| {
                            AppError::ChannelSendFailed {
                                message: format!("Failed to send Toggle: {}", e),
                                location: ErrorLocation::from(Location::caller()),
                            }
                        })?;
                    }
                }
            }
        }

        drop(event_rx);

        // The forwarder may be parked in recv() until the next key event.
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

    /// Presses of our hotkey become toggles. Releases and other hotkeys are ignored.
    pub(crate) fn command_for(&self, event: &GlobalHotKeyEvent) -> Option<AppCommand> {
        (event.id == self.hotkey_id && event.state == HotKeyState::Pressed).then_some(
            AppCommand::Toggle {
                trigger: Trigger::Hotkey,
            },
        )
    }
}
