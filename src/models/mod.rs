use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use utoipa::ToSchema;

pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    /// Stored name: `{unix_millis}-{original name}`
    pub filename: String,
}

impl UploadResponse {
    pub fn stored(filename: String) -> Self {
        Self {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            filename,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status event sent over the notification socket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    UploadStart { filename: String },
    UploadComplete { filename: String },
    UploadError { filename: String, error: String },
}

impl UploadEvent {
    pub fn filename(&self) -> &str {
        match self {
            UploadEvent::UploadStart { filename }
            | UploadEvent::UploadComplete { filename }
            | UploadEvent::UploadError { filename, .. } => filename,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UploadEvent::UploadStart { .. } => "upload_start",
            UploadEvent::UploadComplete { .. } => "upload_complete",
            UploadEvent::UploadError { .. } => "upload_error",
        }
    }
}

/// A statement written to the upload directory
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub size: u64,
}
