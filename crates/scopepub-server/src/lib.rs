//! Scopepub HTTP API Server
//!
//! Thin HTTP adapter over the scopepub registry: decodes publish requests,
//! runs the publish workflow, logs the outcome and maps it to a response.

use axum::{Router, extract::DefaultBodyLimit, response::Json, routing::get};
use scopepub_registry::{FileStorage, Publisher, StorageKeyLookup};
use serde_json::{Value, json};
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod models;
pub mod routes;

use config::ServerConfig;
use error::{ApiError, Result};

/// Publisher backed by the filesystem, with key records in the same tree
pub type FilePublisher = Publisher<FileStorage, StorageKeyLookup<FileStorage>>;

/// Main application state
#[derive(Clone)]
pub struct AppState {
    pub publisher: Arc<FilePublisher>,
    pub config: ServerConfig,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let storage = Arc::new(FileStorage::new(&config.data_path));
        Self {
            publisher: Arc::new(Publisher::with_storage(storage)),
            config,
        }
    }
}

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.max_body_bytes;

    Router::new()
        // Health check
        .route("/health", get(health_check))
        .merge(routes::publish::router())
        .fallback(not_found)
        .method_not_allowed_fallback(not_found)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> Result<Json<Value>> {
    Ok(Json(json!({
        "status": "healthy",
        "service": "scopepub-server",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": time::OffsetDateTime::now_utc().format(&Rfc3339).ok(),
    })))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}
