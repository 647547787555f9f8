use crate::{CoreResult, store::IS_RECORDING_KEY, store::SessionStore};

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::trace;

/// In-process store whose lifetime is the process, i.e. one "browser session".
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    values: Mutex<HashMap<&'static str, bool>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds a flag value, as a rehydrated
    /// coordinator would find it.
    pub fn with_flag(recording: bool) -> Self {
        let mut values = HashMap::new();
        values.insert(IS_RECORDING_KEY, recording);
        Self {
            values: Mutex::new(values),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn is_recording(&self) -> CoreResult<bool> {
        let values = self.values.lock().await;
        Ok(values.get(IS_RECORDING_KEY).copied().unwrap_or(false))
    }

    async fn set_recording(&self, recording: bool) -> CoreResult<()> {
        self.values.lock().await.insert(IS_RECORDING_KEY, recording);
        trace!(key = IS_RECORDING_KEY, value = recording, "Session flag written");
        Ok(())
    }
}
