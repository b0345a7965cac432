use std::path::PathBuf;
use std::time::Instant;

use crate::{AgentSnapshot, TimerId, UploadEnvelope, UploadFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the chat input.
    InputChanged(String),
    /// User submitted the current chat input.
    ChatSubmitted { at: Instant },
    /// User picked a file to upload.
    UploadRequested { path: PathBuf },
    /// The upload relay answered.
    UploadFinished {
        result: Result<UploadEnvelope, UploadFailure>,
        at: Instant,
    },
    /// The agent pushed a new state snapshot.
    SnapshotReceived { snapshot: AgentSnapshot, at: Instant },
    /// The running flag or active node changed.
    RunStatusChanged {
        running: bool,
        active_node: Option<String>,
        at: Instant,
    },
    /// A status timer scheduled through an effect elapsed.
    StatusTimerFired { timer_id: TimerId, at: Instant },
    /// Streamed assistant text.
    AssistantText { message_id: String, delta: String },
    /// The run ended with an error.
    RunFailed { message: String, at: Instant },
}
