/// How a start request ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// The worker acknowledged; the session is recording.
    Started,
    /// A session was already in progress. Nothing changed.
    AlreadyActive,
    /// The user dismissed the source picker.
    Cancelled,
    /// Source selection or the start handshake failed.
    Failed(String),
    /// A stop arrived while the start was pending; the late result was discarded.
    Superseded,
}
