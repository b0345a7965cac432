use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type TimerId = u64;

/// Run-level and state updates decoded from the agent feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    RunStatus {
        running: bool,
        active_node: Option<String>,
    },
    /// Full agent state after applying the latest snapshot or delta.
    Snapshot(Value),
    AssistantText {
        message_id: String,
        delta: String,
    },
    RunError {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    Feed(FeedEvent),
    /// The run request itself failed before or while streaming.
    RunFailed(RunError),
    UploadCompleted(Result<UploadRecord, UploadError>),
    TimerElapsed { timer_id: TimerId },
}

/// A transcript entry forwarded to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunMessage {
    pub id: String,
    pub role: String,
    pub content: String,
}

/// Body of an AG-UI run request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunRequest {
    pub thread_id: String,
    pub run_id: String,
    pub state: Value,
    pub messages: Vec<RunMessage>,
    pub tools: Vec<Value>,
    pub context: Vec<Value>,
    pub forwarded_props: Value,
}

impl RunRequest {
    pub fn new(thread_id: impl Into<String>, run_id: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            run_id: run_id.into(),
            state: Value::Object(Default::default()),
            messages: Vec::new(),
            tools: Vec::new(),
            context: Vec::new(),
            forwarded_props: Value::Object(Default::default()),
        }
    }
}

/// What the upload relay reports for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadRecord {
    pub file_id: String,
    pub filename: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("could not read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },
    #[error("{0}")]
    InvalidFile(String),
    #[error("upload service unreachable: {0}")]
    Network(String),
    #[error("upload timed out")]
    Timeout,
    #[error("{message}")]
    HttpStatus { status: u16, message: String },
    #[error("unexpected upload response: {0}")]
    InvalidResponse(String),
}

impl UploadError {
    pub fn status(&self) -> Option<u16> {
        match self {
            UploadError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunError {
    #[error("invalid agent endpoint: {0}")]
    InvalidUrl(String),
    #[error("agent unreachable: {0}")]
    Network(String),
    #[error("agent request timed out")]
    Timeout,
    #[error("agent returned http status {0}")]
    HttpStatus(u16),
}

/// Where an event stream came from, for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedSource {
    Live,
    Replay,
}

impl fmt::Display for FeedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedSource::Live => write!(f, "live"),
            FeedSource::Replay => write!(f, "replay"),
        }
    }
}
