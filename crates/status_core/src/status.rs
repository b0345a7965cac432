use std::fmt;

use crate::normalize::NormalizedView;

/// Pipeline stage announced by the agent through its active node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Summarizing,
    Translating,
    Counting,
    Assessing,
    Enhancing,
    Preprocessing,
    Extracting,
    Grounding,
}

impl Stage {
    /// Maps a graph node name to its stage. Unknown nodes have no stage.
    pub fn from_node(node: &str) -> Option<Self> {
        let stage = match node {
            "summarizer" => Stage::Summarizing,
            "translate" | "translator" => Stage::Translating,
            "counter" => Stage::Counting,
            "file_quality" => Stage::Assessing,
            "file_enhance" => Stage::Enhancing,
            "file_preprocess" => Stage::Preprocessing,
            "file_extract" => Stage::Extracting,
            "file_ground" | "grounder" => Stage::Grounding,
            _ => return None,
        };
        Some(stage)
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::Summarizing => "Summarizing",
            Stage::Translating => "Translating",
            Stage::Counting => "Counting",
            Stage::Assessing => "Assessing",
            Stage::Enhancing => "Enhancing",
            Stage::Preprocessing => "Preprocessing",
            Stage::Extracting => "Extracting",
            Stage::Grounding => "Grounding",
        }
    }
}

/// The word shown in the status pill.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusLabel {
    /// Phrase announced by the agent itself.
    Agent(String),
    Stage(Stage),
    Completed,
    Thinking,
    #[default]
    Idle,
}

impl StatusLabel {
    pub fn as_str(&self) -> &str {
        match self {
            StatusLabel::Agent(text) => text,
            StatusLabel::Stage(stage) => stage.label(),
            StatusLabel::Completed => "Completed",
            StatusLabel::Thinking => "Thinking",
            StatusLabel::Idle => "Idle",
        }
    }
}

impl fmt::Display for StatusLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level signals that arrive alongside snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunStatus {
    pub running: bool,
    pub active_node: Option<String>,
}

/// Picks the candidate label; the first matching rule wins.
pub fn derive_candidate(view: &NormalizedView, run: &RunStatus) -> StatusLabel {
    if let Some(status) = view.llm_status.as_deref() {
        if !status.trim().is_empty() {
            return StatusLabel::Agent(status.to_string());
        }
    }

    if let Some(stage) = run.active_node.as_deref().and_then(Stage::from_node) {
        return StatusLabel::Stage(stage);
    }

    if !run.running && view.word_count.is_some() {
        return StatusLabel::Completed;
    }

    if run.running {
        // Unmapped nodes and the gap between two nodes both land here.
        return StatusLabel::Thinking;
    }

    StatusLabel::Idle
}
