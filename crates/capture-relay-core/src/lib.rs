//! Capture-relay core library.
//!
//! Coordinates a screen-recording session across a coordinator and a hidden
//! worker context that performs the capture. The worker can start late, die
//! silently, or see duplicate commands; the coordinator keeps the visible
//! state (icon, badge, popup availability) from drifting away from what is
//! really happening.
//!
//! # Example
//!
//! ```no_run
//! use capture_relay_core::{
//!     CoordinatorSettings, LocalWorkerHost, MemorySessionStore, SessionCoordinator, Trigger,
//!     WorkerHostSettings,
//! };
//! # use capture_relay_core::{ArtifactSink, EngineFactory, SourcePicker};
//! use std::sync::Arc;
//!
//! # async fn run(
//! #     engines: Arc<dyn EngineFactory>,
//! #     sink: Arc<dyn ArtifactSink>,
//! #     picker: Arc<dyn SourcePicker>,
//! # ) {
//! let (host, mut worker_rx) = LocalWorkerHost::new(engines, sink, WorkerHostSettings::default());
//! let coordinator = SessionCoordinator::new(
//!     Arc::new(MemorySessionStore::new()),
//!     Arc::new(host),
//!     picker,
//!     CoordinatorSettings::default(),
//! );
//!
//! coordinator.on_startup().await;
//! coordinator.handle_toggle(Trigger::Hotkey).await;
//!
//! while let Some(message) = worker_rx.recv().await {
//!     coordinator.handle_message(message, Trigger::NativeStopSharing).await;
//! }
//! # }
//! ```

mod capture;
mod coordinator;
mod error;
mod protocol;
mod session;
mod status;
mod store;
mod worker;

pub use {
    capture::{
        Artifact, ArtifactSink, CaptureEngine, CaptureFlow, EngineEvent, EngineFactory,
        SelectionOutcome, SourcePicker, StartHandshake, TargetHint,
    },
    coordinator::{CoordinatorSettings, SessionCoordinator, SessionSnapshot, StartOutcome},
    error::{RelayError, Result as CoreResult},
    protocol::{Command, CommandKind, Message, WorkerReply},
    session::{Session, SessionState, SourceRef, Trigger},
    status::{EventOrigin, IconVariant, IndicatorState, StatusBroadcaster, StatusEvent, messages},
    store::{IS_RECORDING_KEY, MemorySessionStore, SessionStore},
    worker::{
        CaptureWorker, EnsureOutcome, LocalWorkerHost, MessageDispatcher, NO_RECEIVER_ERROR,
        RetryBudget, RetryPolicy, SINGLE_CONTEXT_ERROR, SendFailure, WorkerContextManager,
        WorkerHostSettings, WorkerPlatform,
    },
};

#[cfg(test)]
mod tests;
