//! Fire-and-forget WebSocket client for upload status events.
//!
//! Mirrors the browser-side `WebSocketClient`: `connect`, `send`, `close`.
//! There is no reconnect, no ordering guarantee beyond the socket's own and
//! no acknowledgement. Inbound frames are read and discarded.

use crate::models::UploadEvent;
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use std::sync::Mutex as StdMutex;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification socket is not connected")]
    NotConnected,

    #[error("invalid notification url '{0}'")]
    InvalidUrl(String),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Anything that can carry upload status events somewhere
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, event: &UploadEvent) -> Result<(), NotifyError>;
}

pub struct NotificationClient {
    url: String,
    sink: Mutex<Option<WsSink>>,
    reader: StdMutex<Option<JoinHandle<()>>>,
}

impl NotificationClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            sink: Mutex::new(None),
            reader: StdMutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub async fn connect(&self) -> Result<(), NotifyError> {
        let parsed = Url::parse(&self.url).map_err(|_| NotifyError::InvalidUrl(self.url.clone()))?;
        if !matches!(parsed.scheme(), "ws" | "wss") {
            return Err(NotifyError::InvalidUrl(self.url.clone()));
        }

        let (stream, _) = connect_async(self.url.as_str()).await?;
        let (sink, mut inbound) = stream.split();

        let url = self.url.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = inbound.next().await {
                match frame {
                    Ok(Message::Close(_)) => break,
                    Ok(other) => debug!("Ignoring inbound frame from {}: {:?}", url, other),
                    Err(e) => {
                        debug!("Notification socket {} read error: {}", url, e);
                        break;
                    }
                }
            }
        });

        *self.sink.lock().await = Some(sink);
        if let Ok(mut slot) = self.reader.lock() {
            if let Some(previous) = slot.replace(reader) {
                previous.abort();
            }
        }

        info!("🔌 Notification socket connected to {}", self.url);
        Ok(())
    }

    pub async fn is_connected(&self) -> bool {
        self.sink.lock().await.is_some()
    }

    pub async fn close(&self) -> Result<(), NotifyError> {
        let sink = self.sink.lock().await.take();

        let result = match sink {
            Some(mut sink) => {
                // Peer may already be gone
                let _ = sink.send(Message::Close(None)).await;
                sink.close().await.map_err(NotifyError::from)
            }
            None => Ok(()),
        };

        if let Ok(mut slot) = self.reader.lock() {
            if let Some(reader) = slot.take() {
                reader.abort();
            }
        }

        result
    }
}

#[async_trait]
impl Notifier for NotificationClient {
    async fn send(&self, event: &UploadEvent) -> Result<(), NotifyError> {
        let mut guard = self.sink.lock().await;
        let sink = guard.as_mut().ok_or(NotifyError::NotConnected)?;

        let json = serde_json::to_string(event)?;
        if let Err(e) = sink.send(Message::Text(json)).await {
            warn!("Notification socket {} dropped: {}", self.url, e);
            *guard = None;
            return Err(e.into());
        }
        Ok(())
    }
}

impl Drop for NotificationClient {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.reader.lock() {
            if let Some(reader) = slot.take() {
                reader.abort();
            }
        }
    }
}
