pub const APP_TITLE: &str = "Agent client";

pub const LABEL_SUMMARY: &str = "Summary";
pub const LABEL_KEY_POINTS: &str = "Key points";
pub const LABEL_TRANSLATION: &str = "Translation";
pub const LABEL_WORD_COUNT: &str = "Word count";
pub const LABEL_PIPELINE: &str = "Document";
pub const LABEL_ERRORS: &str = "Errors";
pub const LABEL_UPLOAD: &str = "Upload";
pub const LABEL_NOTICE: &str = "Note";

pub const SPEAKER_USER: &str = "you";
pub const SPEAKER_AGENT: &str = "agent";

pub const UPLOADING_TEXT: &str = "uploading...";
