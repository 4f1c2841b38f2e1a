#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::Request;
use statement_upload::config::UploadConfig;
use statement_upload::models::StoredFile;
use statement_upload::services::storage::{LocalStorageService, StorageService};
use statement_upload::{AppState, create_app};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncRead;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

pub const SAMPLE_PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<< /Type /Catalog >>\nendobj\ntrailer\n%%EOF\n";

/// One multipart part; `filename` and `content_type` are omitted from the headers when `None`.
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub body: &'a [u8],
}

pub fn file_part<'a>(filename: &'a str, content_type: &'a str, body: &'a [u8]) -> Part<'a> {
    Part {
        name: "file",
        filename: Some(filename),
        content_type: Some(content_type),
        body,
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            out.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(part.body);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    out
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn local_state(upload_dir: &Path) -> AppState {
    let config = UploadConfig::development(upload_dir);
    AppState::new(Arc::new(LocalStorageService::new(upload_dir)), config)
}

/// Storage whose every write fails, as a full or read-only disk would.
pub struct FailingStorage;

#[async_trait]
impl StorageService for FailingStorage {
    async fn save_stream<'a>(
        &self,
        _filename: &str,
        _reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> anyhow::Result<StoredFile> {
        Err(anyhow::anyhow!("No space left on device"))
    }

    async fn is_writable(&self) -> bool {
        false
    }
}

pub fn failing_state() -> AppState {
    AppState::new(
        Arc::new(FailingStorage),
        UploadConfig::development("/nonexistent"),
    )
}

/// Serves the app on an ephemeral port and returns its address.
pub async fn spawn_server(state: AppState) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, create_app(state)).await.unwrap();
    });
    addr
}

/// Files currently in `dir`; a missing directory counts as empty.
pub fn stored_files(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Waits until `n` sockets are subscribed to the hub, so events sent next are not missed.
pub async fn wait_for_peers(hub: &statement_upload::services::hub::NotificationHub, n: usize) {
    tokio::time::timeout(std::time::Duration::from_secs(5), async {
        while hub.subscriber_count() < n {
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("notification peers did not attach in time");
}
