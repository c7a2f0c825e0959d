//! HTTP API: routing, handlers, errors, and admin authentication

mod auth;
mod errors;
pub mod handlers;

pub use auth::{AdminCredential, ADMIN_PASSWORD_HEADER};
pub use errors::ApiError;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use handlers::AppState;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Build the application router. Shared between `main` and the test harness.
///
/// API paths:
///   GET  /health              - liveness probe
///   GET  /api/images          - captcha image listing (public)
///   POST /api/upload          - multipart upload (admin)
///   POST /api/delete          - delete-by-URL (admin)
///   GET  /api/config          - reveal-page copy (public)
///   POST /api/config          - save reveal-page copy (admin)
///   GET  /blobs/{pathname}    - public object serving
pub fn router(state: Arc<AppState>, max_upload_size: u64) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/images", get(handlers::list_images))
        .route("/api/upload", post(handlers::upload_file))
        .route("/api/delete", post(handlers::delete_blob))
        .route(
            "/api/config",
            get(handlers::get_site_config).post(handlers::save_site_config),
        )
        .route("/blobs/*pathname", get(handlers::serve_blob))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        // Uploads are fully buffered; bound them before the decoder runs.
        .layer(DefaultBodyLimit::max(max_upload_size as usize))
        .with_state(state)
}
