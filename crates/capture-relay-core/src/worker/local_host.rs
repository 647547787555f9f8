//! In-process worker host.
//!
//! Plays the platform's part for the desktop build: the worker context is a
//! tokio task, created on request, that attaches its listener only after a
//! start-up delay. Like the browser platform it refuses a second context
//! while one exists or is being created.

use crate::{
    CoreResult, RelayError,
    capture::{ArtifactSink, EngineFactory},
    protocol::{Message, WorkerReply},
    worker::{CaptureWorker, SINGLE_CONTEXT_ERROR, SendFailure, WorkerPlatform},
};

use std::{panic::Location, sync::Arc, time::Duration};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};

/// One serialized message plus the slot for the listener's reply.
pub(crate) struct Envelope {
    pub(crate) payload: String,
    pub(crate) reply: oneshot::Sender<WorkerReply>,
}

/// Tunables for [`LocalWorkerHost`].
#[derive(Debug, Clone, Copy)]
pub struct WorkerHostSettings {
    /// Time between context creation and its listener attaching.
    pub listener_delay: Duration,
    /// Pending messages per context.
    pub inbox_capacity: usize,
}

impl Default for WorkerHostSettings {
    fn default() -> Self {
        Self {
            listener_delay: Duration::from_millis(100),
            inbox_capacity: 16,
        }
    }
}

enum Slot {
    Absent,
    Starting,
    Listening(mpsc::Sender<Envelope>),
}

struct HostInner {
    slot: Slot,
    generation: u64,
    task: Option<JoinHandle<()>>,
}

/// Worker platform backed by a tokio task.
pub struct LocalWorkerHost {
    inner: Arc<Mutex<HostInner>>,
    engines: Arc<dyn EngineFactory>,
    sink: Arc<dyn ArtifactSink>,
    outbound: mpsc::Sender<Message>,
    settings: WorkerHostSettings,
}

impl LocalWorkerHost {
    /// Create a host. The returned receiver yields unsolicited worker
    /// messages (`RECORDING_STOPPED`, `STATUS_UPDATE`).
    pub fn new(
        engines: Arc<dyn EngineFactory>,
        sink: Arc<dyn ArtifactSink>,
        settings: WorkerHostSettings,
    ) -> (Self, mpsc::Receiver<Message>) {
        let (outbound, worker_rx) = mpsc::channel(32);
        let host = Self {
            inner: Arc::new(Mutex::new(HostInner {
                slot: Slot::Absent,
                generation: 0,
                task: None,
            })),
            engines,
            sink,
            outbound,
            settings,
        };
        (host, worker_rx)
    }

    /// Whether the current context has attached its listener.
    pub async fn is_listening(&self) -> bool {
        matches!(self.inner.lock().await.slot, Slot::Listening(_))
    }

    /// Destroy the context without telling anyone, as a crash or forced
    /// reload would.
    #[instrument(skip(self))]
    pub async fn teardown(&self) {
        let mut inner = self.inner.lock().await;
        inner.slot = Slot::Absent;
        inner.generation += 1;
        if let Some(task) = inner.task.take() {
            task.abort();
        }
        info!("Worker context torn down");
    }
}

#[async_trait]
impl WorkerPlatform for LocalWorkerHost {
    async fn has_context(&self) -> bool {
        !matches!(self.inner.lock().await.slot, Slot::Absent)
    }

    async fn create_context(&self) -> CoreResult<()> {
        let mut inner = self.inner.lock().await;
        if !matches!(inner.slot, Slot::Absent) {
            return Err(RelayError::WorkerCreationFailed {
                reason: format!("{}.", SINGLE_CONTEXT_ERROR),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        inner.generation += 1;
        inner.slot = Slot::Starting;
        let generation = inner.generation;

        let shared = Arc::clone(&self.inner);
        let engines = Arc::clone(&self.engines);
        let sink = Arc::clone(&self.sink);
        let outbound = self.outbound.clone();
        let settings = self.settings;

        inner.task = Some(tokio::spawn(async move {
            tokio::time::sleep(settings.listener_delay).await;

            let (events_tx, events_rx) = mpsc::channel(16);
            let worker = CaptureWorker::new(engines.create(events_tx), events_rx, sink, outbound);
            let (inbox_tx, inbox_rx) = mpsc::channel(settings.inbox_capacity.max(1));

            {
                let mut inner = shared.lock().await;
                if inner.generation != generation {
                    debug!(generation, "Context replaced before its listener attached");
                    return;
                }
                inner.slot = Slot::Listening(inbox_tx);
            }

            worker.run(inbox_rx).await;

            let mut inner = shared.lock().await;
            if inner.generation == generation {
                inner.slot = Slot::Absent;
            }
        }));

        debug!(generation, "Worker context requested");
        Ok(())
    }

    async fn send(&self, message: &Message) -> Result<WorkerReply, SendFailure> {
        let inbox = match &self.inner.lock().await.slot {
            Slot::Listening(inbox) => inbox.clone(),
            Slot::Absent | Slot::Starting => return Err(SendFailure::NoReceiver),
        };

        let payload = message
            .to_json()
            .map_err(|e| SendFailure::Other(e.to_string()))?;
        let (reply_tx, reply_rx) = oneshot::channel();

        if inbox
            .send(Envelope {
                payload,
                reply: reply_tx,
            })
            .await
            .is_err()
        {
            warn!(kind = message.kind(), "Worker inbox closed");
            return Err(SendFailure::NoReceiver);
        }

        reply_rx.await.map_err(|_| SendFailure::NoReceiver)
    }
}
