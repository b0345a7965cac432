use std::path::Path;

use agent_logging::{agent_info, agent_warn};
use serde_json::Value;

use crate::{ClientConfig, UploadError, UploadRecord};

/// File types the document pipeline accepts, keyed by extension.
const CONTENT_TYPES: [(&str, &str); 8] = [
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("tif", "image/tiff"),
    ("tiff", "image/tiff"),
    ("pdf", "application/pdf"),
];

/// Guesses a content type from the file extension.
pub fn content_type_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    extension
        .and_then(|ext| {
            CONTENT_TYPES
                .iter()
                .find(|(known, _)| *known == ext)
                .map(|(_, content_type)| *content_type)
        })
        .unwrap_or("application/octet-stream")
}

#[async_trait::async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<UploadRecord, UploadError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestUploader {
    config: ClientConfig,
}

impl ReqwestUploader {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    fn build_client(&self) -> Result<reqwest::Client, UploadError> {
        reqwest::Client::builder()
            .connect_timeout(self.config.connect_timeout)
            .timeout(self.config.upload_timeout)
            .build()
            .map_err(|err| UploadError::Network(err.to_string()))
    }
}

#[async_trait::async_trait]
impl Uploader for ReqwestUploader {
    async fn upload(&self, path: &Path) -> Result<UploadRecord, UploadError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| UploadError::Read {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("uploaded-file")
            .to_string();
        let content_type = content_type_for(path);
        agent_info!(
            "uploading {} ({}, {} bytes)",
            filename,
            content_type,
            bytes.len()
        );

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename)
            .mime_str(content_type)
            .map_err(|err| UploadError::InvalidFile(err.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let client = self.build_client()?;
        let response = client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let message = error_message(&body)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
            agent_warn!("upload rejected with {}: {}", status, message);
            return Err(UploadError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str::<UploadRecord>(&body)
            .map_err(|err| UploadError::InvalidResponse(err.to_string()))
    }
}

/// Pulls a short message out of an error body: `{"error": ..}` from the
/// relay or `{"detail": ..}` from the backend.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "detail", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(ToOwned::to_owned)
}

fn map_reqwest_error(err: reqwest::Error) -> UploadError {
    if err.is_timeout() {
        return UploadError::Timeout;
    }
    UploadError::Network(err.to_string())
}
