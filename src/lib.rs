pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::config::UploadConfig;
use crate::services::hub::NotificationHub;
use crate::services::storage::StorageService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::upload::upload_file,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::UploadResponse,
            models::ErrorResponse,
            models::UploadEvent,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "upload", description = "Statement upload"),
        (name = "system", description = "Service health")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn StorageService>,
    pub hub: NotificationHub,
    pub config: UploadConfig,
}

impl AppState {
    pub fn new(storage: Arc<dyn StorageService>, config: UploadConfig) -> Self {
        Self {
            storage,
            hub: NotificationHub::new(config.notify_channel_capacity),
            config,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    // The browser page may be served from a different origin than the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::page::upload_page))
        .route("/health", get(api::handlers::health::health_check))
        .route("/ws", get(api::handlers::notifications::ws_handler))
        .route(
            "/api/upload",
            post(api::handlers::upload::upload_file)
                .layer(DefaultBodyLimit::max(state.config.upload_body_limit())),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        .layer(cors)
        .with_state(state)
}
