//! HTTP surface: JSON API plus the HTML dashboard.

mod dashboard;
mod dto;
mod error;
mod handlers;

pub use error::ApiError;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::state::AppState;

/// Largest accepted request body.
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/api/routes", get(handlers::routes))
        .route("/api/report", post(handlers::report))
        .route("/api/profile", post(handlers::profile))
        .route("/api/statistics", get(handlers::statistics))
        .route("/api/upload-csv", post(handlers::upload_csv))
        .route("/api/process-data", get(handlers::process_data))
        .route("/api/export-data", get(handlers::export_data))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}
