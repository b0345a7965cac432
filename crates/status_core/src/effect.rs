use std::path::PathBuf;
use std::time::Duration;

use crate::{AgentSnapshot, ChatMessage, TimerId};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Start an agent run for a new turn.
    StartRun {
        turn: u64,
        messages: Vec<ChatMessage>,
        state: AgentSnapshot,
    },
    StartUpload { path: PathBuf },
    ScheduleStatusTimer { timer_id: TimerId, delay: Duration },
    CancelStatusTimer { timer_id: TimerId },
}
