//! Scripted collaborators shared by the unit tests.

use crate::{
    Artifact, ArtifactSink, CaptureEngine, CoordinatorSettings, CoreResult, EngineEvent,
    EngineFactory, MemorySessionStore, Message, RelayError, RetryPolicy, SendFailure,
    SessionCoordinator, SourcePicker, SourceRef, StatusEvent, TargetHint, WorkerPlatform,
    WorkerReply,
};

use std::{
    collections::VecDeque,
    panic::Location,
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::sync::{Notify, broadcast, mpsc};

#[derive(Default)]
struct PlatformState {
    context: bool,
    create_calls: u32,
    create_error: Option<String>,
    send_failures: VecDeque<SendFailure>,
    start_reply: Option<WorkerReply>,
    attempts: Vec<Message>,
}

/// Worker platform whose behaviour each test scripts up front.
#[derive(Default)]
pub(crate) struct FakePlatform {
    state: Mutex<PlatformState>,
    start_gate: Option<Arc<Notify>>,
}

impl FakePlatform {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_context() -> Self {
        let platform = Self::new();
        platform.lock().context = true;
        platform
    }

    /// A live context that holds every `START_RECORDING` reply until
    /// `gate` is notified.
    pub(crate) fn gated(gate: Arc<Notify>) -> Self {
        Self {
            state: Mutex::new(PlatformState {
                context: true,
                ..PlatformState::default()
            }),
            start_gate: Some(gate),
        }
    }

    pub(crate) fn fail_sends(&self, count: usize, failure: SendFailure) {
        let mut state = self.lock();
        for _ in 0..count {
            state.send_failures.push_back(failure.clone());
        }
    }

    pub(crate) fn fail_creation(&self, reason: &str) {
        self.lock().create_error = Some(reason.to_string());
    }

    pub(crate) fn reply_to_start(&self, reply: WorkerReply) {
        self.lock().start_reply = Some(reply);
    }

    /// The context vanishes without anyone being told.
    pub(crate) fn remove_context(&self) {
        self.lock().context = false;
    }

    pub(crate) fn create_calls(&self) -> u32 {
        self.lock().create_calls
    }

    /// Kinds of every send attempt, failed ones included.
    pub(crate) fn sent_kinds(&self) -> Vec<&'static str> {
        self.lock().attempts.iter().map(Message::kind).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl WorkerPlatform for FakePlatform {
    async fn has_context(&self) -> bool {
        self.lock().context
    }

    async fn create_context(&self) -> CoreResult<()> {
        let mut state = self.lock();
        state.create_calls += 1;
        if let Some(reason) = state.create_error.clone() {
            return Err(RelayError::WorkerCreationFailed {
                reason,
                location: ErrorLocation::from(Location::caller()),
            });
        }
        state.context = true;
        Ok(())
    }

    async fn send(&self, message: &Message) -> Result<WorkerReply, SendFailure> {
        let reply = {
            let mut state = self.lock();
            state.attempts.push(message.clone());
            if let Some(failure) = state.send_failures.pop_front() {
                return Err(failure);
            }
            match message {
                Message::StartRecording { .. } => {
                    state.start_reply.clone().unwrap_or(WorkerReply::Starting)
                }
                Message::StopRecording => WorkerReply::Stopped,
                _ => WorkerReply::Idle,
            }
        };

        if let (Some(gate), Message::StartRecording { .. }) = (&self.start_gate, message) {
            gate.notified().await;
        }
        Ok(reply)
    }
}

/// What the next `pick` call does.
#[derive(Debug, Clone)]
pub(crate) enum Pick {
    Select(&'static str),
    Cancel,
    Fail(&'static str),
}

/// Source picker answering from a script.
pub(crate) struct ScriptedPicker {
    script: Mutex<VecDeque<Pick>>,
    gate: Option<Arc<Notify>>,
    picks: Mutex<u32>,
}

impl ScriptedPicker {
    pub(crate) fn new(script: impl IntoIterator<Item = Pick>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            gate: None,
            picks: Mutex::new(0),
        }
    }

    /// Keep the picker "open" until `gate` is notified.
    pub(crate) fn gated(script: impl IntoIterator<Item = Pick>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(script)
        }
    }

    pub(crate) fn picks(&self) -> u32 {
        *self.picks.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SourcePicker for ScriptedPicker {
    async fn default_target(&self) -> Option<TargetHint> {
        Some(TargetHint("active-tab".to_string()))
    }

    async fn pick(&self, _target: Option<TargetHint>) -> CoreResult<Option<SourceRef>> {
        *self.picks.lock().unwrap_or_else(|e| e.into_inner()) += 1;
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or(Pick::Cancel);

        match next {
            Pick::Select(token) => Ok(Some(SourceRef::new(token))),
            Pick::Cancel => Ok(None),
            Pick::Fail(reason) => Err(RelayError::PickerFailed {
                reason: reason.to_string(),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}

#[derive(Default)]
pub(crate) struct EngineLog {
    pub(crate) calls: Vec<&'static str>,
    pub(crate) events: Option<mpsc::Sender<EngineEvent>>,
}

/// Capture engine that records calls and finishes stops immediately.
pub(crate) struct FakeEngine {
    log: Arc<Mutex<EngineLog>>,
    events: mpsc::Sender<EngineEvent>,
    fail_prepare: bool,
    fail_start: bool,
    artifact_size: u64,
}

#[async_trait]
impl CaptureEngine for FakeEngine {
    async fn prepare(&mut self, source: &SourceRef) -> CoreResult<()> {
        self.record("prepare");
        if self.fail_prepare {
            return Err(RelayError::CaptureFailed {
                reason: format!("permission denied for {}", source),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    async fn start(&mut self) -> CoreResult<()> {
        self.record("start");
        if self.fail_start {
            return Err(RelayError::CaptureFailed {
                reason: "encoder unavailable".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }

    async fn stop(&mut self) -> CoreResult<()> {
        self.record("stop");
        let artifact = Artifact {
            path: PathBuf::from("/tmp/capture.part"),
            mime_type: "video/webm;codecs=vp9,opus".to_string(),
            size_bytes: self.artifact_size,
        };
        let _ = self
            .events
            .send(EngineEvent::RecordingStopped {
                artifact: Some(artifact),
            })
            .await;
        Ok(())
    }

    async fn release(&mut self) {
        self.record("release");
    }
}

impl FakeEngine {
    fn record(&self, call: &'static str) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .calls
            .push(call);
    }
}

/// Factory handing out [`FakeEngine`]s that share one call log.
#[derive(Clone)]
pub(crate) struct FakeEngineFactory {
    pub(crate) log: Arc<Mutex<EngineLog>>,
    pub(crate) fail_prepare: bool,
    pub(crate) fail_start: bool,
    pub(crate) artifact_size: u64,
}

impl FakeEngineFactory {
    pub(crate) fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(EngineLog::default())),
            fail_prepare: false,
            fail_start: false,
            artifact_size: 1024,
        }
    }

    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).calls.clone()
    }

    /// Simulate the user pressing the platform's "stop sharing" control.
    pub(crate) async fn end_stream(&self) {
        let events = self
            .log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .events
            .clone();
        if let Some(events) = events {
            let _ = events.send(EngineEvent::StreamEnded).await;
        }
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self, events: mpsc::Sender<EngineEvent>) -> Box<dyn CaptureEngine> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).events = Some(events.clone());
        Box::new(FakeEngine {
            log: Arc::clone(&self.log),
            events,
            fail_prepare: self.fail_prepare,
            fail_start: self.fail_start,
            artifact_size: self.artifact_size,
        })
    }
}

/// Sink remembering every artifact it was given.
#[derive(Default)]
pub(crate) struct RecordingSink {
    pub(crate) persisted: Mutex<Vec<Artifact>>,
}

impl RecordingSink {
    pub(crate) fn count(&self) -> usize {
        self.persisted.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl ArtifactSink for RecordingSink {
    async fn persist(&self, artifact: Artifact) -> CoreResult<PathBuf> {
        let path = PathBuf::from("/recordings").join(format!("capture.{}", artifact.extension()));
        self.persisted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(artifact);
        Ok(path)
    }
}

pub(crate) fn test_settings() -> CoordinatorSettings {
    CoordinatorSettings {
        start_grace: Duration::from_millis(50),
        settle: Duration::from_millis(10),
        retry: RetryPolicy {
            retries: 2,
            interval: Duration::from_millis(10),
        },
        status_capacity: 64,
    }
}

/// A coordinator wired to fakes, plus handles on each fake.
pub(crate) struct Harness {
    pub(crate) coordinator: Arc<SessionCoordinator>,
    pub(crate) store: Arc<MemorySessionStore>,
    pub(crate) platform: Arc<FakePlatform>,
    pub(crate) picker: Arc<ScriptedPicker>,
    pub(crate) events: broadcast::Receiver<StatusEvent>,
}

impl Harness {
    pub(crate) fn new(
        platform: FakePlatform,
        picker: ScriptedPicker,
        store: MemorySessionStore,
    ) -> Self {
        let store = Arc::new(store);
        let platform = Arc::new(platform);
        let picker = Arc::new(picker);
        let coordinator = Arc::new(SessionCoordinator::new(
            store.clone(),
            platform.clone(),
            picker.clone(),
            test_settings(),
        ));
        let events = coordinator.subscribe();

        Self {
            coordinator,
            store,
            platform,
            picker,
            events,
        }
    }

    /// Everything broadcast since the last drain.
    pub(crate) fn drain_events(&mut self) -> Vec<StatusEvent> {
        let mut drained = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            drained.push(event);
        }
        drained
    }

    pub(crate) async fn flag(&self) -> bool {
        use crate::SessionStore;
        self.store.is_recording().await.unwrap_or(true)
    }
}
