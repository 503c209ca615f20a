//! Status and health check handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::handlers::error_response;
use crate::api::ApiState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Core crate version.
    pub version: String,
    /// Number of records in the catalog.
    pub total_books: u64,
}

/// Health check endpoint.
pub async fn health(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<HealthResponse>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let stats = library.stats().map_err(error_response)?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: bookstand_core::core_version().to_string(),
        total_books: stats.total_count,
    }))
}
