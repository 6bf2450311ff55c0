//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes for uploading, listing and deleting posts
//! - Error-to-response mapping
//! - Response types

pub mod error;
pub mod routes;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sea_orm::DatabaseConnection;
use snapfeed_core::storage::BlobStore;
use snapfeed_shared::UploadConfig;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Remote blob store for uploaded media.
    pub storage: Arc<dyn BlobStore>,
    /// Upload pipeline settings.
    pub upload: Arc<UploadConfig>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.upload.max_body_bytes;

    Router::new()
        .merge(routes::api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
