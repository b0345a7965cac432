use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use agent_bridge::{
    BridgeEvent, BridgeHandle, ClientConfig, EventSink, FeedEvent, RunMessage, RunRequest,
    UploadError, UploadRecord,
};
use agent_logging::{agent_debug, agent_info, agent_warn};
use status_core::{
    AgentSnapshot, ChatMessage, Effect, Msg, Role, UploadEnvelope, UploadFailure,
};

use super::app::AppEvent;

/// Executes core effects on the bridge and feeds bridge events back as [`Msg`]s.
pub struct EffectRunner {
    bridge: BridgeHandle,
    thread_id: String,
}

impl EffectRunner {
    pub fn new(config: ClientConfig, event_tx: mpsc::Sender<AppEvent>) -> Self {
        let thread_id = config.thread_id.clone();
        let sink = Arc::new(MsgSink { tx: event_tx });
        Self {
            bridge: BridgeHandle::new(config, sink),
            thread_id,
        }
    }

    pub fn run(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartRun {
                    turn,
                    messages,
                    state,
                } => {
                    agent_info!("StartRun turn={} messages={}", turn, messages.len());
                    self.bridge
                        .start_run(run_request(&self.thread_id, turn, &messages, &state));
                }
                Effect::StartUpload { path } => {
                    agent_info!("StartUpload path={}", path.display());
                    self.bridge.upload(path);
                }
                Effect::ScheduleStatusTimer { timer_id, delay } => {
                    agent_debug!("ScheduleStatusTimer id={} delay={:?}", timer_id, delay);
                    self.bridge.schedule_timer(timer_id, delay);
                }
                Effect::CancelStatusTimer { timer_id } => {
                    agent_debug!("CancelStatusTimer id={}", timer_id);
                    self.bridge.cancel_timer(timer_id);
                }
            }
        }
    }

    pub fn replay(&self, path: PathBuf, interval: Duration) {
        agent_info!("replaying {}", path.display());
        self.bridge.replay(path, interval);
    }
}

struct MsgSink {
    tx: mpsc::Sender<AppEvent>,
}

impl EventSink for MsgSink {
    fn emit(&self, event: BridgeEvent) {
        let _ = self.tx.send(AppEvent::Core(to_msg(event, Instant::now())));
    }
}

fn run_request(
    thread_id: &str,
    turn: u64,
    messages: &[ChatMessage],
    state: &AgentSnapshot,
) -> RunRequest {
    let mut request = RunRequest::new(thread_id, format!("run-{turn}"));
    request.state = state.to_value();
    request.messages = messages
        .iter()
        .map(|message| RunMessage {
            id: message.id.clone(),
            role: match message.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            }
            .to_string(),
            content: message.content.clone(),
        })
        .collect();
    request
}

fn to_msg(event: BridgeEvent, at: Instant) -> Msg {
    match event {
        BridgeEvent::Feed(FeedEvent::RunStatus {
            running,
            active_node,
        }) => Msg::RunStatusChanged {
            running,
            active_node,
            at,
        },
        BridgeEvent::Feed(FeedEvent::Snapshot(value)) => Msg::SnapshotReceived {
            snapshot: AgentSnapshot::from_value(value),
            at,
        },
        BridgeEvent::Feed(FeedEvent::AssistantText { message_id, delta }) => {
            Msg::AssistantText { message_id, delta }
        }
        BridgeEvent::Feed(FeedEvent::RunError { message }) => Msg::RunFailed { message, at },
        BridgeEvent::RunFailed(err) => {
            agent_warn!("run failed: {}", err);
            Msg::RunFailed {
                message: err.to_string(),
                at,
            }
        }
        BridgeEvent::UploadCompleted(result) => Msg::UploadFinished {
            result: result.map(envelope_from).map_err(failure_from),
            at,
        },
        BridgeEvent::TimerElapsed { timer_id } => Msg::StatusTimerFired { timer_id, at },
    }
}

fn envelope_from(record: UploadRecord) -> UploadEnvelope {
    UploadEnvelope {
        file_id: record.file_id,
        filename: record.filename,
        content_type: record.content_type,
        size_bytes: record.size,
    }
}

fn failure_from(err: UploadError) -> UploadFailure {
    UploadFailure::new(err.status(), err.to_string())
}
