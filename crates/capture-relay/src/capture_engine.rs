//! External-process capture engine.
//!
//! Runs a configured recorder (ffmpeg, wf-recorder, screencapture, ...) per
//! session. The process writes to a staging file; a graceful stop writes `q`
//! to its stdin and waits for it to finalize the container.

use crate::config::CaptureConfig;

use capture_relay_core::{
    Artifact, CaptureEngine, CoreResult, EngineEvent, EngineFactory, RelayError, SourceRef,
};

use std::{
    panic::Location,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Arc,
    time::Duration,
};

use async_trait::async_trait;
use error_location::ErrorLocation;
use tokio::{
    io::AsyncWriteExt,
    process::{Child, Command},
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How long a recorder gets to exit after being asked to quit.
const STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// Builds [`ProcessCaptureEngine`]s writing into `staging_dir`.
pub struct ProcessEngineFactory {
    config: Arc<CaptureConfig>,
    staging_dir: PathBuf,
}

impl ProcessEngineFactory {
    /// Create a factory for the given capture settings.
    pub fn new(config: CaptureConfig, staging_dir: PathBuf) -> Self {
        Self {
            config: Arc::new(config),
            staging_dir,
        }
    }
}

impl EngineFactory for ProcessEngineFactory {
    fn create(&self, events: mpsc::Sender<EngineEvent>) -> Box<dyn CaptureEngine> {
        Box::new(ProcessCaptureEngine {
            config: Arc::clone(&self.config),
            staging_dir: self.staging_dir.clone(),
            events,
            prepared: None,
            running: None,
        })
    }
}

struct Prepared {
    source: SourceRef,
    output: PathBuf,
}

struct Running {
    stop_tx: Option<oneshot::Sender<()>>,
    supervisor: JoinHandle<()>,
}

/// Capture engine backed by one recorder process per session.
pub struct ProcessCaptureEngine {
    config: Arc<CaptureConfig>,
    staging_dir: PathBuf,
    events: mpsc::Sender<EngineEvent>,
    prepared: Option<Prepared>,
    running: Option<Running>,
}

#[async_trait]
impl CaptureEngine for ProcessCaptureEngine {
    #[instrument(skip(self))]
    async fn prepare(&mut self, source: &SourceRef) -> CoreResult<()> {
        if self.config.program.trim().is_empty() {
            return Err(capture_failed("no capture program configured"));
        }
        if source.as_str().trim().is_empty() {
            return Err(capture_failed("empty capture source"));
        }

        tokio::fs::create_dir_all(&self.staging_dir)
            .await
            .map_err(|e| capture_failed(format!("staging directory unavailable: {}", e)))?;

        let extension = if self.config.mime_type.contains("mp4") {
            "mp4"
        } else {
            "webm"
        };
        let output = self
            .staging_dir
            .join(format!(".capture-{}.{}", Uuid::new_v4(), extension));

        debug!(output = ?output, "Capture prepared");
        self.prepared = Some(Prepared {
            source: source.clone(),
            output,
        });
        Ok(())
    }

    #[instrument(skip(self))]
    async fn start(&mut self) -> CoreResult<()> {
        let prepared = self
            .prepared
            .take()
            .ok_or_else(|| capture_failed("start without a prepared source"))?;

        let args = expand_args(&self.config.args, &prepared.source, &prepared.output);
        let child = Command::new(&self.config.program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                capture_failed(format!("failed to launch {}: {}", self.config.program, e))
            })?;

        info!(program = %self.config.program, pid = ?child.id(), "Recorder launched");

        let (stop_tx, stop_rx) = oneshot::channel();
        let supervisor = tokio::spawn(supervise(
            child,
            stop_rx,
            self.events.clone(),
            prepared.output,
            self.config.mime_type.clone(),
        ));

        self.running = Some(Running {
            stop_tx: Some(stop_tx),
            supervisor,
        });
        Ok(())
    }

    #[instrument(skip(self))]
    async fn stop(&mut self) -> CoreResult<()> {
        match self.running.as_mut().and_then(|running| running.stop_tx.take()) {
            Some(stop_tx) => {
                if stop_tx.send(()).is_err() {
                    return Err(capture_failed("recorder supervisor is gone"));
                }
                Ok(())
            }
            None => Err(capture_failed("no recording in progress")),
        }
    }

    async fn release(&mut self) {
        self.prepared = None;
        if let Some(running) = self.running.take() {
            running.supervisor.abort();
            debug!("Recorder released");
        }
    }
}

impl Drop for ProcessCaptureEngine {
    // Aborting the supervisor drops the child, which kills the recorder.
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            running.supervisor.abort();
        }
    }
}

/// Substitute `{source}` and `{output}` in each argument.
pub(crate) fn expand_args(args: &[String], source: &SourceRef, output: &Path) -> Vec<String> {
    let output = output.to_string_lossy();
    args.iter()
        .map(|arg| {
            arg.replace("{source}", source.as_str())
                .replace("{output}", &output)
        })
        .collect()
}

/// Own the recorder until it exits, then report the artifact.
async fn supervise(
    mut child: Child,
    mut stop_rx: oneshot::Receiver<()>,
    events: mpsc::Sender<EngineEvent>,
    output: PathBuf,
    mime_type: String,
) {
    let exited_on_its_own = tokio::select! {
        status = child.wait() => {
            info!(status = ?status, "Recorder exited on its own");
            true
        }
        _ = &mut stop_rx => false,
    };

    if exited_on_its_own {
        if events.send(EngineEvent::StreamEnded).await.is_err() {
            return;
        }
        // The worker answers StreamEnded with stop().
        let _ = stop_rx.await;
    } else {
        request_exit(&mut child).await;
    }

    let artifact = collect_artifact(output, mime_type).await;
    if events
        .send(EngineEvent::RecordingStopped { artifact })
        .await
        .is_err()
    {
        warn!("Worker gone before the recording was handed over");
    }
}

async fn request_exit(child: &mut Child) {
    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(b"q\n").await {
            debug!(error = %e, "Recorder stdin already closed");
        }
    }

    match tokio::time::timeout(STOP_TIMEOUT, child.wait()).await {
        Ok(status) => debug!(status = ?status, "Recorder finished"),
        Err(_) => {
            warn!(
                timeout_secs = STOP_TIMEOUT.as_secs(),
                "Recorder ignored quit, killing it"
            );
            if let Err(e) = child.kill().await {
                warn!(error = %e, "Failed to kill recorder");
            }
        }
    }
}

async fn collect_artifact(output: PathBuf, mime_type: String) -> Option<Artifact> {
    let metadata = tokio::fs::metadata(&output).await.ok()?;
    Some(Artifact {
        path: output,
        mime_type,
        size_bytes: metadata.len(),
    })
}

#[track_caller]
fn capture_failed(reason: impl Into<String>) -> RelayError {
    RelayError::CaptureFailed {
        reason: reason.into(),
        location: ErrorLocation::from(Location::caller()),
    }
}
