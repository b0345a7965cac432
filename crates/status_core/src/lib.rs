//! Status core: pure snapshot normalization, status reconciliation and the
//! client state machine.
mod effect;
mod msg;
mod normalize;
mod reconcile;
mod snapshot;
mod state;
mod status;
pub mod upload;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use normalize::{normalize, NormalizedView};
pub use reconcile::{CommitOutcome, StatusReconciler, TimerId, MIN_DWELL};
pub use snapshot::{
    as_count, as_text, AgentSnapshot, Projection, RawField, SUMMARY, TRANSLATED_TEXT, WORD_COUNT,
};
pub use state::{AppState, ChatMessage, Role};
pub use status::{derive_candidate, RunStatus, Stage, StatusLabel};
pub use upload::{UploadEnvelope, UploadFailure, FILE_UPLOAD_PREFIX};
pub use update::update;
pub use view_model::{AppViewModel, PipelineRowView, TranscriptLineView};
