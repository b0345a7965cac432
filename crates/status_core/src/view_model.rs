use crate::Role;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub status: String,
    pub running: bool,
    pub turn: u64,
    pub summary: Option<String>,
    pub key_points: Vec<String>,
    pub translated_text: Option<String>,
    pub word_count: Option<u64>,
    pub pipeline: Vec<PipelineRowView>,
    pub errors: Vec<String>,
    pub transcript: Vec<TranscriptLineView>,
    pub uploading: bool,
    pub upload_error: Option<String>,
    /// Why the last submission was held back.
    pub notice: Option<String>,
    pub dirty: bool,
}

/// One document-pipeline result, flattened for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineRowView {
    pub title: &'static str,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLineView {
    pub role: Role,
    pub text: String,
}
