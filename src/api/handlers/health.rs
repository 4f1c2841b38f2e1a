use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub storage: String,
    pub notification_peers: usize,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let storage_status = if state.storage.is_writable().await {
        "writable"
    } else {
        "unavailable"
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        storage: storage_status.to_string(),
        notification_peers: state.hub.subscriber_count(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
