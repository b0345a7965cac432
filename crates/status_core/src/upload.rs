//! Carries uploaded-file identity through the plain-text chat transcript.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Marks a chat message whose body is an encoded [`UploadEnvelope`].
pub const FILE_UPLOAD_PREFIX: &str = "FILE_UPLOAD::";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEnvelope {
    pub file_id: String,
    pub filename: String,
    pub content_type: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
}

/// Only the parts of an envelope needed for display; everything is optional
/// so older or partial payloads still render.
#[derive(Debug, Deserialize)]
struct EnvelopeDisplay {
    filename: Option<String>,
    content_type: Option<String>,
}

/// Encodes the envelope as the text of a synthetic user message.
pub fn encode(envelope: &UploadEnvelope) -> String {
    let payload = serde_json::json!({
        "file_id": envelope.file_id,
        "filename": envelope.filename,
        "content_type": envelope.content_type,
        "size": envelope.size_bytes,
    });
    format!("{FILE_UPLOAD_PREFIX}{payload}")
}

/// Turns transcript text into display text. Text without the sentinel is
/// returned unchanged; the raw payload is never shown.
pub fn decode(text: &str) -> Cow<'_, str> {
    let Some(payload) = text.strip_prefix(FILE_UPLOAD_PREFIX) else {
        return Cow::Borrowed(text);
    };

    match serde_json::from_str::<EnvelopeDisplay>(payload.trim()) {
        Ok(display) => {
            let filename = display.filename.as_deref().unwrap_or("uploaded file");
            match display.content_type.as_deref() {
                Some(content_type) => {
                    Cow::Owned(format!("Uploaded file: {filename} ({content_type})"))
                }
                None => Cow::Owned(format!("Uploaded file: {filename}")),
            }
        }
        Err(_) => Cow::Borrowed("Uploaded file"),
    }
}

/// Why an upload did not produce an envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFailure {
    /// HTTP status when the relay answered; `None` for transport or local errors.
    pub status: Option<u16>,
    pub message: String,
}

impl UploadFailure {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Upload failed ({status}): {}", self.message),
            None => write!(f, "Upload failed: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope() -> UploadEnvelope {
        UploadEnvelope {
            file_id: "a".to_string(),
            filename: "x.pdf".to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 100,
        }
    }

    #[test]
    fn encoded_envelope_decodes_to_display_text() {
        let text = encode(&envelope());
        assert!(text.starts_with(FILE_UPLOAD_PREFIX));
        let display = decode(&text);
        assert!(display.contains("x.pdf"));
        assert!(display.contains("application/pdf"));
        assert!(!display.contains(FILE_UPLOAD_PREFIX));
    }

    #[test]
    fn plain_text_is_untouched() {
        assert!(matches!(decode("plain text"), Cow::Borrowed("plain text")));
    }

    #[test]
    fn malformed_payload_degrades_to_generic_label() {
        assert_eq!(decode("FILE_UPLOAD::{not json"), "Uploaded file");
        assert_eq!(decode("FILE_UPLOAD::\"just a string\""), "Uploaded file");
    }

    #[test]
    fn missing_fields_fall_back() {
        assert_eq!(decode("FILE_UPLOAD:: {}"), "Uploaded file: uploaded file");
        assert_eq!(
            decode(r#"FILE_UPLOAD::{"filename":"scan.png"}"#),
            "Uploaded file: scan.png"
        );
    }

    #[test]
    fn failure_display_includes_status_when_known() {
        assert_eq!(
            UploadFailure::new(Some(502), "bad gateway").to_string(),
            "Upload failed (502): bad gateway"
        );
        assert_eq!(
            UploadFailure::new(None, "connection refused").to_string(),
            "Upload failed: connection refused"
        );
    }
}
