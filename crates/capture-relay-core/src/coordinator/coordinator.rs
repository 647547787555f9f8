//! Session coordinator: the single owner of [`SessionState`].
//!
//! Every trigger (hotkey, icon click, popup, overlay, worker notification)
//! lands on one of three operations: [`handle_toggle`], [`handle_start`] or
//! [`handle_stop`]. The persisted `isRecording` flag is written only here,
//! always while the session lock is held so it cannot disagree with the
//! state another caller observes.
//!
//! [`handle_toggle`]: SessionCoordinator::handle_toggle
//! [`handle_start`]: SessionCoordinator::handle_start
//! [`handle_stop`]: SessionCoordinator::handle_stop

use crate::{
    capture::{CaptureFlow, SelectionOutcome, SourcePicker, StartHandshake},
    coordinator::{CoordinatorSettings, SessionSnapshot, StartOutcome},
    protocol::{Command, Message},
    session::{Session, SessionState, Trigger},
    status::{StatusBroadcaster, StatusEvent, messages},
    store::SessionStore,
    worker::{MessageDispatcher, WorkerContextManager, WorkerPlatform},
};

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// Owns the recording session and drives it from every trigger source.
pub struct SessionCoordinator {
    session: Mutex<Session>,
    store: Arc<dyn SessionStore>,
    workers: Arc<WorkerContextManager>,
    dispatcher: Arc<MessageDispatcher>,
    capture_flow: CaptureFlow,
    broadcaster: StatusBroadcaster,
}

impl SessionCoordinator {
    /// Assemble a coordinator and its worker plumbing.
    pub fn new(
        store: Arc<dyn SessionStore>,
        platform: Arc<dyn WorkerPlatform>,
        picker: Arc<dyn SourcePicker>,
        settings: CoordinatorSettings,
    ) -> Self {
        let workers = Arc::new(WorkerContextManager::new(platform, settings.settle));
        let dispatcher = Arc::new(MessageDispatcher::new(
            Arc::clone(&workers),
            settings.retry,
        ));
        let capture_flow = CaptureFlow::new(picker, Arc::clone(&dispatcher), settings.start_grace);

        Self {
            session: Mutex::new(Session::new()),
            store,
            workers,
            dispatcher,
            capture_flow,
            broadcaster: StatusBroadcaster::new(settings.status_capacity),
        }
    }

    /// Subscribe to status events.
    pub fn subscribe(&self) -> broadcast::Receiver<StatusEvent> {
        self.broadcaster.subscribe()
    }

    /// Current state.
    pub async fn state(&self) -> SessionState {
        self.session.lock().await.state()
    }

    /// Full status for a `STATUS_QUERY`.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let session = self.session.lock().await;
        SessionSnapshot {
            state: session.state(),
            source_ref: session.source_ref().cloned(),
            session_id: session.session_id(),
            is_recording: self.read_flag().await,
            worker_present: self.workers.exists().await,
        }
    }

    /// Reset the persisted flag when the coordinator process starts.
    #[instrument(skip(self))]
    pub async fn on_startup(&self) {
        let _session = self.session.lock().await;
        self.write_flag(false).await;
        info!("Session flag reset at startup");
    }

    /// Start when idle, stop otherwise, after reconciling the persisted flag.
    #[instrument(skip(self))]
    pub async fn handle_toggle(&self, trigger: Trigger) {
        let state = self.reconcile().await;

        if state == SessionState::Idle {
            let outcome = self.handle_start(trigger).await;
            debug!(outcome = ?outcome, "Toggle resolved to start");
        } else {
            self.handle_stop(trigger).await;
        }
    }

    /// Begin a session: pick a source, hand it to the worker, and flip to
    /// `Recording` once the worker acknowledges. A no-op unless idle.
    #[instrument(skip(self))]
    pub async fn handle_start(&self, trigger: Trigger) -> StartOutcome {
        self.reconcile().await;

        let session_id = {
            let mut session = self.session.lock().await;
            match session.begin_preparing() {
                Some(id) => {
                    self.broadcaster
                        .transition(SessionState::Preparing, messages::SELECTING_SOURCE);
                    id
                }
                None => {
                    debug!(state = %session.state(), "Start ignored, session already active");
                    return StartOutcome::AlreadyActive;
                }
            }
        };
        info!(session_id = %session_id, trigger = ?trigger, "Session preparing");

        let source = match self.capture_flow.initiate().await {
            SelectionOutcome::Selected(source) => source,
            SelectionOutcome::Cancelled => {
                return self
                    .abandon_start(session_id, StartOutcome::Cancelled, messages::CANCELLED)
                    .await;
            }
            SelectionOutcome::Failed(reason) => {
                let message = format!("{}: {}", messages::START_FAILED, reason);
                return self
                    .abandon_start(session_id, StartOutcome::Failed(reason), &message)
                    .await;
            }
        };

        {
            let mut session = self.session.lock().await;
            if !session.is_pending(session_id) {
                info!(session_id = %session_id, "Source chosen after the session was stopped");
                return StartOutcome::Superseded;
            }
            session.attach_source(source.clone());
        }

        match self.capture_flow.start_capture(&source).await {
            StartHandshake::Acknowledged(reply) => {
                let mut session = self.session.lock().await;
                if !session.is_pending(session_id) {
                    drop(session);
                    info!(session_id = %session_id, "Start acknowledged after the session was stopped");
                    self.stop_worker().await;
                    return StartOutcome::Superseded;
                }

                session.mark_recording();
                self.write_flag(true).await;
                self.broadcaster
                    .transition(SessionState::Recording, messages::RECORDING_STARTED);
                info!(session_id = %session_id, reply = ?reply, source = %source, "Recording started");
                StartOutcome::Started
            }
            StartHandshake::Failed(e) => {
                error!(session_id = %session_id, error = %e, "Failed to start recording");
                let reason = e.to_string();
                let message = format!("{}: {}", messages::START_FAILED, reason);
                self.abandon_start(session_id, StartOutcome::Failed(reason), &message)
                    .await
            }
        }
    }

    /// Unconditional stop. Always ends in `Idle` with the flag cleared, even
    /// if the worker is gone or never answers. A session started by someone
    /// else while `Stop` was being delivered is left running.
    #[instrument(skip(self))]
    pub async fn handle_stop(&self, trigger: Trigger) {
        self.stop_session(trigger, true).await;
    }

    /// The worker ended capture on its own. Same as [`handle_stop`](Self::handle_stop)
    /// without sending `Stop` back.
    #[instrument(skip(self))]
    pub async fn on_worker_reported_stop(&self) {
        self.stop_session(Trigger::NativeStopSharing, false).await;
    }

    /// Stop only if `session_id` is still the recording session.
    #[instrument(skip(self))]
    pub async fn stop_if_current(&self, session_id: Uuid, trigger: Trigger) {
        let current = self.session.lock().await.is_recording_session(session_id);
        if current {
            self.handle_stop(trigger).await;
        } else {
            debug!(session_id = %session_id, "Stop skipped, session no longer current");
        }
    }

    /// Route a message from a UI surface or the worker.
    ///
    /// `STATUS_QUERY` is answered with the current [`SessionSnapshot`]; every
    /// other message returns `None`.
    #[instrument(skip(self))]
    pub async fn handle_message(
        &self,
        message: Message,
        trigger: Trigger,
    ) -> Option<SessionSnapshot> {
        match message {
            Message::StartRecording { .. } => {
                let outcome = self.handle_start(trigger).await;
                debug!(outcome = ?outcome, "Start request handled");
            }
            Message::StopRecording => self.handle_stop(trigger).await,
            Message::RecordingStopped => self.on_worker_reported_stop().await,
            Message::StatusUpdate { message } => {
                let state = self.state().await;
                self.broadcaster.notice(state, message);
            }
            Message::StatusQuery => {
                let snapshot = self.snapshot().await;
                debug!(snapshot = ?snapshot, "Status queried");
                return Some(snapshot);
            }
        }
        None
    }

    /// Check the persisted flag against live worker existence and repair
    /// any disagreement. Returns the state afterwards.
    async fn reconcile(&self) -> SessionState {
        let mut session = self.session.lock().await;
        let flag = self.read_flag().await;
        if !flag {
            return session.state();
        }

        let worker_present = self.workers.exists().await;
        match (worker_present, session.state()) {
            (false, state) => {
                warn!(state = %state, "Session flag set but no worker context exists, resetting");
                self.write_flag(false).await;
                if state == SessionState::Recording {
                    session.reset();
                    self.broadcaster.transition(SessionState::Idle, messages::IDLE);
                }
            }
            (true, SessionState::Idle) => {
                let id = session.adopt_recording();
                info!(session_id = %id, "Adopted recording already running in the worker");
                self.broadcaster
                    .transition(SessionState::Recording, messages::RECORDING_IN_PROGRESS);
            }
            (true, _) => {}
        }

        session.state()
    }

    async fn abandon_start(
        &self,
        session_id: Uuid,
        outcome: StartOutcome,
        message: &str,
    ) -> StartOutcome {
        let mut session = self.session.lock().await;
        if !session.is_pending(session_id) {
            return StartOutcome::Superseded;
        }

        session.reset();
        self.write_flag(false).await;
        self.broadcaster.transition(SessionState::Idle, message);
        outcome
    }

    async fn stop_session(&self, trigger: Trigger, notify_worker: bool) {
        let stopping_id = {
            let mut session = self.session.lock().await;
            if matches!(
                session.state(),
                SessionState::Preparing | SessionState::Recording
            ) {
                session.mark_stopping();
                self.broadcaster
                    .transition(SessionState::Stopping, messages::STOPPING);
            }
            session.session_id()
        };

        if notify_worker {
            self.stop_worker().await;
        }

        let mut session = self.session.lock().await;
        let previous = session.state();
        // The lock was released around the worker call, so another stop may
        // have finished and a new start begun. That session is not ours.
        if matches!(previous, SessionState::Preparing | SessionState::Recording)
            && session.session_id() != stopping_id
        {
            info!(
                trigger = ?trigger,
                session_id = ?session.session_id(),
                "Newer session started while stop was in flight, leaving it alone"
            );
            return;
        }
        let flag_was_set = self.read_flag().await;

        session.reset();
        self.write_flag(false).await;

        if previous != SessionState::Idle || flag_was_set {
            self.broadcaster.transition(SessionState::Idle, messages::IDLE);
        }
        info!(trigger = ?trigger, previous = %previous, "Session stopped");
    }

    /// Best-effort `Stop` to an existing worker. Never creates one.
    async fn stop_worker(&self) {
        if !self.workers.exists().await {
            debug!("No worker context, nothing to stop");
            return;
        }

        if let Err(e) = self.dispatcher.dispatch(&Command::Stop).await {
            warn!(error = %e, "Stop not delivered to worker, continuing");
        }
    }

    async fn read_flag(&self) -> bool {
        match self.store.is_recording().await {
            Ok(flag) => flag,
            Err(e) => {
                warn!(error = %e, "Session flag unreadable, treating as not recording");
                false
            }
        }
    }

    async fn write_flag(&self, recording: bool) {
        if let Err(e) = self.store.set_recording(recording).await {
            error!(error = %e, recording, "Failed to persist session flag");
        }
    }
}
