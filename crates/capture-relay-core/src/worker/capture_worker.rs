//! Command handling inside the worker context.
//!
//! Every command kind is idempotent: a duplicate `Start` while capturing
//! changes nothing and a `Stop` with nothing running just replies `stopped`.

use crate::{
    capture::{Artifact, ArtifactSink, CaptureEngine, EngineEvent},
    protocol::{Command, Message, WorkerReply},
    status::messages,
    worker::Envelope,
};

use std::sync::Arc;

use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    /// Source prepared; capture begins at `deadline`.
    Armed { deadline: Instant },
    Capturing,
    /// Stop requested, waiting for the engine to hand back the artifact.
    Finishing,
}

/// Hosts a [`CaptureEngine`] and answers coordinator commands.
pub struct CaptureWorker {
    engine: Box<dyn CaptureEngine>,
    engine_events: mpsc::Receiver<EngineEvent>,
    sink: Arc<dyn ArtifactSink>,
    outbound: mpsc::Sender<Message>,
    phase: Phase,
    stop_requested: bool,
}

impl CaptureWorker {
    /// `outbound` carries unsolicited messages back to the coordinator.
    pub fn new(
        engine: Box<dyn CaptureEngine>,
        engine_events: mpsc::Receiver<EngineEvent>,
        sink: Arc<dyn ArtifactSink>,
        outbound: mpsc::Sender<Message>,
    ) -> Self {
        Self {
            engine,
            engine_events,
            sink,
            outbound,
            phase: Phase::Idle,
            stop_requested: false,
        }
    }

    /// Whether the worker holds a prepared or active capture.
    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Armed { .. } | Phase::Capturing)
    }

    /// Serve commands from `inbox` until it closes.
    pub(crate) async fn run(mut self, mut inbox: mpsc::Receiver<Envelope>) {
        info!("Worker listener attached");

        loop {
            let deadline = match self.phase {
                Phase::Armed { deadline } => Some(deadline),
                _ => None,
            };

            tokio::select! {
                envelope = inbox.recv() => match envelope {
                    Some(envelope) => self.serve(envelope).await,
                    None => break,
                },
                Some(event) = self.engine_events.recv() => {
                    self.handle_engine_event(event).await;
                }
                _ = sleep_until_armed(deadline), if deadline.is_some() => {
                    self.begin_capture().await;
                }
            }
        }

        if self.is_active() {
            self.engine.release().await;
        }
        info!("Worker listener detached");
    }

    async fn serve(&mut self, envelope: Envelope) {
        let reply = match Message::from_json(&envelope.payload) {
            Ok(message) => match message.as_command() {
                Some(command) => self.handle(command).await,
                None => WorkerReply::Rejected {
                    reason: format!("{} is not a worker command", message.kind()),
                },
            },
            Err(e) => WorkerReply::Rejected {
                reason: e.to_string(),
            },
        };

        if envelope.reply.send(reply).is_err() {
            debug!("Sender stopped waiting for the reply");
        }
    }

    /// Apply one command and produce the listener's reply.
    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub async fn handle(&mut self, command: Command) -> WorkerReply {
        match command {
            Command::Start { source_ref, grace } => match self.phase {
                Phase::Armed { .. } | Phase::Capturing => {
                    debug!("Start ignored, already recording");
                    WorkerReply::AlreadyRecording
                }
                Phase::Finishing => WorkerReply::Rejected {
                    reason: "previous recording is still being finalized".to_string(),
                },
                Phase::Idle => match self.engine.prepare(&source_ref).await {
                    Ok(()) => {
                        self.phase = Phase::Armed {
                            deadline: Instant::now() + grace,
                        };
                        self.stop_requested = false;
                        info!(source = %source_ref, grace_ms = grace.as_millis(), "Capture armed");
                        WorkerReply::Starting
                    }
                    Err(e) => {
                        error!(error = %e, "Capture prepare failed");
                        WorkerReply::Rejected {
                            reason: e.to_string(),
                        }
                    }
                },
            },
            Command::Stop => {
                match self.phase {
                    Phase::Idle | Phase::Finishing => {}
                    Phase::Armed { .. } => {
                        self.engine.release().await;
                        self.phase = Phase::Idle;
                        info!("Armed capture released before it started");
                    }
                    Phase::Capturing => {
                        self.stop_requested = true;
                        self.stop_engine().await;
                    }
                }
                WorkerReply::Stopped
            }
            Command::StatusQuery => {
                if self.is_active() {
                    WorkerReply::Recording
                } else {
                    WorkerReply::Idle
                }
            }
        }
    }

    /// React to a notification from the engine.
    #[instrument(skip(self), fields(phase = ?self.phase))]
    pub async fn handle_engine_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::StreamEnded => match self.phase {
                Phase::Capturing => {
                    info!("Captured stream ended by the platform");
                    self.stop_requested = false;
                    self.stop_engine().await;
                }
                Phase::Armed { .. } => {
                    self.engine.release().await;
                    self.phase = Phase::Idle;
                    self.post(Message::RecordingStopped).await;
                }
                Phase::Idle | Phase::Finishing => {}
            },
            EngineEvent::RecordingStopped { artifact } => {
                self.phase = Phase::Idle;
                if !std::mem::take(&mut self.stop_requested) {
                    self.post(Message::RecordingStopped).await;
                }
                self.deliver(artifact).await;
            }
        }
    }

    async fn begin_capture(&mut self) {
        match self.engine.start().await {
            Ok(()) => {
                self.phase = Phase::Capturing;
                info!("Capture running");
                self.post(Message::status("Recording...")).await;
            }
            Err(e) => {
                error!(error = %e, "Capture start failed");
                self.engine.release().await;
                self.phase = Phase::Idle;
                self.post(Message::status(format!("{}: {}", messages::START_FAILED, e)))
                    .await;
                self.post(Message::RecordingStopped).await;
            }
        }
    }

    async fn stop_engine(&mut self) {
        match self.engine.stop().await {
            Ok(()) => self.phase = Phase::Finishing,
            Err(e) => {
                error!(error = %e, "Capture stop failed");
                self.phase = Phase::Idle;
                if !std::mem::take(&mut self.stop_requested) {
                    self.post(Message::RecordingStopped).await;
                }
            }
        }
    }

    async fn deliver(&self, artifact: Option<Artifact>) {
        let artifact = match artifact {
            Some(artifact) if !artifact.is_empty() => artifact,
            _ => {
                self.post(Message::status("Nothing to save")).await;
                return;
            }
        };

        match self.sink.persist(artifact).await {
            Ok(path) => {
                info!(path = ?path, "Recording saved");
                self.post(Message::status("Video saved")).await;
            }
            Err(e) => {
                error!(error = %e, "Recording could not be saved");
                self.post(Message::status("Save failed")).await;
            }
        }
    }

    async fn post(&self, message: Message) {
        if self.outbound.send(message).await.is_err() {
            warn!("Coordinator channel closed, dropping worker message");
        }
    }
}

async fn sleep_until_armed(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(deadline).await;
    }
}
