//! Capture-side collaborators and the start-handshake orchestrator.

mod artifact;
mod engine;
mod flow;
mod picker;
mod sink;

pub use {
    artifact::Artifact,
    engine::{CaptureEngine, EngineEvent, EngineFactory},
    flow::{CaptureFlow, SelectionOutcome, StartHandshake},
    picker::{SourcePicker, TargetHint},
    sink::ArtifactSink,
};
