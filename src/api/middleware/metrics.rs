use super::request_id::REQUEST_ID_HEADER;
use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::info;

/// Emits one structured `request_completed` record per request under the `metrics` target.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = next.run(req).await;

    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    info!(
        target: "metrics",
        method = %method,
        path = %path,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        request_id = %request_id,
        "request_completed"
    );

    response
}
