//! Agent bridge: AG-UI runs, uploads, replay and timers.
mod agui;
mod config;
mod engine;
mod patch;
mod replay;
mod run;
mod types;
mod upload;

pub use agui::{parse_event, AgUiEvent, FeedTracker, SseDecoder};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use engine::BridgeHandle;
pub use patch::{apply_patch, PatchError, PatchOp};
pub use replay::{parse_recording, replay_file, ReplayError};
pub use run::{ChannelEventSink, EventSink, ReqwestRunClient, RunClient};
pub use types::{
    BridgeEvent, FeedEvent, FeedSource, RunError, RunMessage, RunRequest, TimerId, UploadError,
    UploadRecord,
};
pub use upload::{content_type_for, ReqwestUploader, Uploader};
