//! Client-side upload flow: announce, POST, then report the outcome.

use crate::models::{UploadEvent, UploadResponse};
use crate::services::notifier::Notifier;
use crate::utils::validation::{PDF_MIME_TYPE, has_pdf_extension};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum UploadClientError {
    #[error("Only PDF files are accepted: {0}")]
    NotAPdf(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error("Unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub struct UploadClient {
    http: reqwest::Client,
    endpoint: Url,
    notifier: Option<Arc<dyn Notifier>>,
}

impl UploadClient {
    /// `server` is the base URL of the upload server, e.g. `http://127.0.0.1:3000`
    pub fn new(server: &str) -> Result<Self, UploadClientError> {
        let endpoint = Url::parse(server)?.join("/api/upload")?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            notifier: None,
        })
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Uploads one local file. Paths without a `.pdf` extension are refused
    /// before anything is sent, matching the drop zone's filter.
    pub async fn upload_path(&self, path: &Path) -> Result<UploadResponse, UploadClientError> {
        if !has_pdf_extension(path) {
            return Err(UploadClientError::NotAPdf(path.to_path_buf()));
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| UploadClientError::NotAPdf(path.to_path_buf()))?;

        let body = tokio::fs::read(path)
            .await
            .map_err(|source| UploadClientError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        self.upload_bytes(&filename, body).await
    }

    /// Sends `upload_start`, posts the bytes, then sends exactly one of
    /// `upload_complete` or `upload_error`.
    pub async fn upload_bytes(
        &self,
        filename: &str,
        body: Vec<u8>,
    ) -> Result<UploadResponse, UploadClientError> {
        self.notify(UploadEvent::UploadStart {
            filename: filename.to_string(),
        })
        .await;

        match self.post(filename, body).await {
            Ok(response) => {
                info!("✅ Uploaded {} as {}", filename, response.filename);
                self.notify(UploadEvent::UploadComplete {
                    filename: filename.to_string(),
                })
                .await;
                Ok(response)
            }
            Err(e) => {
                warn!("❌ Upload of {} failed: {}", filename, e);
                self.notify(UploadEvent::UploadError {
                    filename: filename.to_string(),
                    error: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    async fn post(&self, filename: &str, body: Vec<u8>) -> Result<UploadResponse, UploadClientError> {
        let part = Part::bytes(body)
            .file_name(filename.to_string())
            .mime_str(PDF_MIME_TYPE)?;
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let data: serde_json::Value = response.json().await?;

        if !status.is_success() {
            let message = data
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("Upload failed")
                .to_string();
            return Err(UploadClientError::Rejected { status, message });
        }

        Ok(serde_json::from_value(data)?)
    }

    async fn notify(&self, event: UploadEvent) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.send(&event).await {
                warn!("Could not send {} notification: {}", event.kind(), e);
            }
        }
    }
}
