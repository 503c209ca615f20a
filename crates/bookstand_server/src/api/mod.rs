//! REST API for the Bookstand daemon.
//!
//! Provides HTTP endpoints for:
//! - Catalog CRUD and author filtering
//! - Catalog statistics
//! - CSV export/import
//! - Backup snapshot and retention management

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use bookstand_core::Library;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};

/// Shared state for API handlers.
pub struct ApiState {
    /// The single library instance; the mutex serializes requests, matching
    /// the single-user, one-call-at-a-time model.
    pub library: Mutex<Library>,
    /// Snapshot retention applied after mutations and manual backups.
    pub keep_backups: usize,
}

impl ApiState {
    pub fn new(library: Library, keep_backups: usize) -> Self {
        Self {
            library: Mutex::new(library),
            keep_backups,
        }
    }
}

/// Build the API router with all routes.
pub fn router(state: Arc<ApiState>) -> Router {
    // Allow any origin so a local static frontend can call the API.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/status", get(handlers::status::health))
        .route(
            "/api/v1/books",
            get(handlers::books::list_books).post(handlers::books::create_book),
        )
        .route(
            "/api/v1/books/:id",
            get(handlers::books::get_book)
                .put(handlers::books::update_book)
                .delete(handlers::books::delete_book),
        )
        .route("/api/v1/stats", get(handlers::books::stats))
        .route("/api/v1/exports", post(handlers::maintenance::export_books))
        .route("/api/v1/imports", post(handlers::maintenance::import_books))
        .route(
            "/api/v1/backups",
            get(handlers::maintenance::list_backups).post(handlers::maintenance::create_backup),
        )
        .layer(cors)
        .with_state(state)
}

/// Start the API server.
pub async fn serve(state: Arc<ApiState>, bind_addr: &str) -> anyhow::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    log::info!("event=api_listen module=server status=ok bind={bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
