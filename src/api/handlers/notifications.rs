//! WebSocket entrypoint for upload status events.
//!
//! Upgrades HTTP to WS, relays inbound events to the other peers and
//! forwards their events back out.

use crate::AppState;
use crate::models::UploadEvent;
use crate::services::hub::NotificationHub;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| handle_connection(socket, hub))
}

async fn handle_connection(socket: WebSocket, hub: NotificationHub) {
    let peer = Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();
    let mut events = hub.subscribe();

    info!("🔌 Notification peer {} connected", peer);

    let mut send_task = tokio::spawn(async move {
        loop {
            let relayed = match events.recv().await {
                Ok(relayed) => relayed,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Notification peer {} lagged, skipped {} events", peer, skipped);
                    continue;
                }
                Err(RecvError::Closed) => break,
            };

            if relayed.origin == peer {
                continue;
            }

            let json = match serde_json::to_string(&relayed.event) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Failed to encode {}: {}", relayed.event.kind(), e);
                    continue;
                }
            };

            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<UploadEvent>(&text) {
                    Ok(event) => {
                        info!("📣 {} {} from {}", event.kind(), event.filename(), peer);
                        hub.publish(peer, event);
                    }
                    Err(e) => warn!("Dropping invalid notification from {}: {}", peer, e),
                },
                Message::Close(_) => break,
                other => debug!("Ignoring frame from {}: {:?}", peer, other),
            }
        }
    });

    // If either task exits, abort the other.
    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    }

    info!("🔌 Notification peer {} disconnected", peer);
}
