mod memory_store;
mod session_store;

pub use {memory_store::MemorySessionStore, session_store::SessionStore};

/// Key under which the recording flag is persisted.
pub const IS_RECORDING_KEY: &str = "isRecording";
