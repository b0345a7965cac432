//! AG-UI event stream decoding.
//!
//! The agent streams server-sent events whose `data:` payloads are JSON
//! objects tagged by `type`. [`SseDecoder`] cuts the byte stream into payloads
//! and [`FeedTracker`] folds the events into [`FeedEvent`]s for the client.

use agent_logging::{agent_debug, agent_warn};
use serde::Deserialize;
use serde_json::Value;

use crate::patch::{apply_patch, PatchOp};
use crate::{FeedEvent, FeedSource};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgUiEvent {
    RunStarted {
        #[serde(default, rename = "runId")]
        run_id: Option<String>,
    },
    RunFinished {
        #[serde(default, rename = "runId")]
        run_id: Option<String>,
    },
    RunError {
        #[serde(default)]
        message: String,
    },
    StepStarted {
        #[serde(rename = "stepName")]
        step_name: String,
    },
    StepFinished {
        #[serde(rename = "stepName")]
        step_name: String,
    },
    StateSnapshot {
        snapshot: Value,
    },
    StateDelta {
        delta: Vec<PatchOp>,
    },
    TextMessageStart {
        #[serde(rename = "messageId")]
        message_id: String,
    },
    TextMessageContent {
        #[serde(rename = "messageId")]
        message_id: String,
        delta: String,
    },
    TextMessageEnd {
        #[serde(rename = "messageId")]
        message_id: String,
    },
    #[serde(other)]
    Other,
}

/// Splits a server-sent-event byte stream into `data` payloads.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every payload completed by it.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                payloads.extend(self.flush());
            } else if let Some(data) = line.strip_prefix("data:") {
                self.data.push(data.trim_start().to_string());
            }
            // Comments, `event:`, `id:` and `retry:` lines carry nothing we use.
        }
        payloads
    }

    /// Returns a trailing payload left when the stream closed without a blank line.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buffer);
        let rest = String::from_utf8_lossy(&rest);
        if let Some(data) = rest.trim_end_matches(['\n', '\r']).strip_prefix("data:") {
            self.data.push(data.trim_start().to_string());
        }
        self.flush()
    }

    fn flush(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

pub fn parse_event(payload: &str) -> Result<AgUiEvent, serde_json::Error> {
    serde_json::from_str(payload)
}

/// Folds AG-UI events into client-facing feed events, keeping the agent state
/// so that deltas can be applied.
#[derive(Debug)]
pub struct FeedTracker {
    source: FeedSource,
    state: Value,
    running: bool,
    active_node: Option<String>,
    reported_status: bool,
}

impl FeedTracker {
    pub fn new(source: FeedSource) -> Self {
        Self::with_state(source, Value::Object(Default::default()))
    }

    /// Starts from the state the run was submitted with.
    pub fn with_state(source: FeedSource, state: Value) -> Self {
        Self {
            source,
            state,
            running: false,
            active_node: None,
            reported_status: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn apply(&mut self, event: AgUiEvent) -> Vec<FeedEvent> {
        match event {
            AgUiEvent::RunStarted { run_id } => {
                agent_debug!("[{}] run started {:?}", self.source, run_id);
                self.set_run_status(true, None)
            }
            AgUiEvent::RunFinished { run_id } => {
                agent_debug!("[{}] run finished {:?}", self.source, run_id);
                self.set_run_status(false, None)
            }
            AgUiEvent::RunError { message } => {
                agent_warn!("[{}] run error: {}", self.source, message);
                let mut events = vec![FeedEvent::RunError { message }];
                events.extend(self.set_run_status(false, None));
                events
            }
            AgUiEvent::StepStarted { step_name } => self.set_run_status(true, Some(step_name)),
            AgUiEvent::StepFinished { step_name } => {
                if self.active_node.as_deref() == Some(step_name.as_str()) {
                    self.set_run_status(self.running, None)
                } else {
                    Vec::new()
                }
            }
            AgUiEvent::StateSnapshot { snapshot } => {
                self.state = snapshot;
                vec![FeedEvent::Snapshot(self.state.clone())]
            }
            AgUiEvent::StateDelta { delta } => match apply_patch(&mut self.state, &delta) {
                Ok(()) => vec![FeedEvent::Snapshot(self.state.clone())],
                Err(err) => {
                    agent_warn!("[{}] dropping state delta: {}", self.source, err);
                    Vec::new()
                }
            },
            AgUiEvent::TextMessageContent { message_id, delta } => {
                vec![FeedEvent::AssistantText { message_id, delta }]
            }
            AgUiEvent::TextMessageStart { .. } | AgUiEvent::TextMessageEnd { .. } => Vec::new(),
            AgUiEvent::Other => Vec::new(),
        }
    }

    /// Reports the run as stopped when the stream ends while the agent still
    /// looked busy, or when the stream never reported run status at all.
    pub fn close(&mut self) -> Vec<FeedEvent> {
        if self.running || self.active_node.is_some() {
            agent_warn!("[{}] stream closed while run was active", self.source);
            self.set_run_status(false, None)
        } else if !self.reported_status {
            self.reported_status = true;
            vec![FeedEvent::RunStatus {
                running: false,
                active_node: None,
            }]
        } else {
            Vec::new()
        }
    }

    fn set_run_status(&mut self, running: bool, active_node: Option<String>) -> Vec<FeedEvent> {
        if self.running == running && self.active_node == active_node {
            return Vec::new();
        }
        self.running = running;
        self.active_node = active_node.clone();
        self.reported_status = true;
        vec![FeedEvent::RunStatus {
            running,
            active_node,
        }]
    }
}
