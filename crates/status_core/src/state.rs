use std::time::Instant;

use agent_logging::agent_info;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::{normalize, NormalizedView};
use crate::reconcile::{CommitOutcome, StatusReconciler};
use crate::status::{derive_candidate, RunStatus, StatusLabel};
use crate::view_model::{AppViewModel, PipelineRowView, TranscriptLineView};
use crate::{upload, AgentSnapshot, Effect};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A transcript entry as sent to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    input: String,
    turn: u64,
    transcript: Vec<ChatMessage>,
    next_message_id: u64,
    snapshot: AgentSnapshot,
    normalized: NormalizedView,
    run: RunStatus,
    reconciler: StatusReconciler,
    uploading: bool,
    upload_error: Option<String>,
    run_error: Option<String>,
    notice: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        let mut errors = self.normalized.file_errors.clone();
        if let Some(run_error) = &self.run_error {
            errors.push(run_error.clone());
        }

        AppViewModel {
            status: self.reconciler.committed().to_string(),
            running: self.run.running,
            turn: self.turn,
            summary: self.normalized.summary.clone(),
            key_points: self.normalized.key_points.clone(),
            translated_text: self.normalized.translated_text.clone(),
            word_count: self.normalized.word_count,
            pipeline: pipeline_rows(&self.normalized),
            errors,
            transcript: self
                .transcript
                .iter()
                .map(|message| TranscriptLineView {
                    role: message.role,
                    text: upload::decode(&message.content).into_owned(),
                })
                .collect(),
            uploading: self.uploading,
            upload_error: self.upload_error.clone(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    pub fn status(&self) -> &StatusLabel {
        self.reconciler.committed()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    /// True from a turn's submission until the agent reports the run stopped.
    pub fn is_running(&self) -> bool {
        self.run.running
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_input(&mut self, text: String) {
        self.input = text;
    }

    pub(crate) fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
        self.mark_dirty();
    }

    pub(crate) fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    pub(crate) fn push_message(&mut self, role: Role, content: String) {
        self.next_message_id += 1;
        self.transcript.push(ChatMessage {
            id: format!("msg-{}", self.next_message_id),
            role,
            content,
        });
        self.mark_dirty();
    }

    pub(crate) fn append_assistant_text(&mut self, message_id: String, delta: &str) {
        match self
            .transcript
            .iter_mut()
            .rev()
            .find(|message| message.role == Role::Assistant && message.id == message_id)
        {
            Some(message) => message.content.push_str(delta),
            None => self.transcript.push(ChatMessage {
                id: message_id,
                role: Role::Assistant,
                content: delta.to_string(),
            }),
        }
        self.mark_dirty();
    }

    /// Starts a new turn and returns the run effect. The previous turn's
    /// agent phrase and node are dropped so the status moves forward to
    /// "Thinking" instead of lingering on a terminal label.
    pub(crate) fn begin_turn(&mut self, at: Instant) -> Vec<Effect> {
        self.turn += 1;
        agent_info!("starting turn {}", self.turn);

        self.run = RunStatus {
            running: true,
            active_node: None,
        };
        self.snapshot.llm_status = crate::RawField::Absent;
        self.normalized.llm_status = None;
        self.run_error = None;
        self.notice = None;
        self.mark_dirty();

        let mut effects = self.reconcile(at);
        effects.push(Effect::StartRun {
            turn: self.turn,
            messages: self.transcript.clone(),
            state: self.snapshot.clone(),
        });
        effects
    }

    pub(crate) fn apply_snapshot(&mut self, snapshot: AgentSnapshot, at: Instant) -> Vec<Effect> {
        self.normalized = normalize(&snapshot);
        self.snapshot = snapshot;
        self.mark_dirty();
        self.reconcile(at)
    }

    pub(crate) fn apply_run_status(
        &mut self,
        running: bool,
        active_node: Option<String>,
        at: Instant,
    ) -> Vec<Effect> {
        let next = RunStatus {
            running,
            active_node,
        };
        if next != self.run {
            self.run = next;
            self.mark_dirty();
        }
        self.reconcile(at)
    }

    pub(crate) fn apply_run_failure(&mut self, message: String, at: Instant) -> Vec<Effect> {
        self.run_error = Some(message);
        self.mark_dirty();
        self.apply_run_status(false, None, at)
    }

    pub(crate) fn start_upload(&mut self) -> bool {
        if self.uploading {
            self.upload_error = Some("An upload is already in progress".to_string());
            self.mark_dirty();
            return false;
        }
        self.uploading = true;
        self.upload_error = None;
        self.mark_dirty();
        true
    }

    pub(crate) fn finish_upload(&mut self, error: Option<String>) {
        self.uploading = false;
        self.upload_error = error;
        self.mark_dirty();
    }

    pub(crate) fn fire_status_timer(&mut self, timer_id: crate::TimerId, at: Instant) {
        let candidate = derive_candidate(&self.normalized, &self.run);
        let before = self.reconciler.committed().clone();
        self.reconciler.fire(timer_id, candidate, at);
        if &before != self.reconciler.committed() {
            self.mark_dirty();
        }
    }

    /// Re-derives the candidate label and runs it through the dwell rule.
    fn reconcile(&mut self, at: Instant) -> Vec<Effect> {
        let candidate = derive_candidate(&self.normalized, &self.run);
        let before = self.reconciler.committed().clone();

        let effects = match self.reconciler.commit(candidate, at) {
            CommitOutcome::Committed { cancelled, .. } => cancelled
                .map(|timer_id| Effect::CancelStatusTimer { timer_id })
                .into_iter()
                .collect(),
            CommitOutcome::Deferred {
                timer_id,
                delay,
                cancelled,
            } => {
                let mut effects = Vec::with_capacity(2);
                if let Some(cancelled) = cancelled {
                    effects.push(Effect::CancelStatusTimer {
                        timer_id: cancelled,
                    });
                }
                effects.push(Effect::ScheduleStatusTimer { timer_id, delay });
                effects
            }
            CommitOutcome::Stale => Vec::new(),
        };

        if &before != self.reconciler.committed() {
            self.mark_dirty();
        }
        effects
    }
}

fn pipeline_rows(view: &NormalizedView) -> Vec<PipelineRowView> {
    [
        ("Quality", &view.file_quality),
        ("Preprocessing", &view.preprocess_data),
        ("Extraction", &view.extracted_data),
        ("Grounding", &view.grounded_data),
    ]
    .into_iter()
    .filter_map(|(title, value)| {
        value.as_ref().map(|value| PipelineRowView {
            title,
            detail: describe(value),
        })
    })
    .collect()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}: {}", describe(value)))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(items) => format!(
            "[{}]",
            items.iter().map(describe).collect::<Vec<_>>().join("; ")
        ),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
