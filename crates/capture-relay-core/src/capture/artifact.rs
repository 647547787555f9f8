use std::path::PathBuf;

/// A finished recording handed from the capture engine to the artifact sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Where the engine left the encoded data.
    pub path: PathBuf,
    /// Container MIME type, e.g. `video/webm;codecs=vp9,opus`.
    pub mime_type: String,
    /// Encoded size.
    pub size_bytes: u64,
}

impl Artifact {
    /// File extension matching the container.
    pub fn extension(&self) -> &'static str {
        if self.mime_type.contains("mp4") {
            "mp4"
        } else {
            "webm"
        }
    }

    /// Whether the engine produced any data.
    pub fn is_empty(&self) -> bool {
        self.size_bytes == 0
    }
}
