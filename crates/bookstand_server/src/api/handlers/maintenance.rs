//! Export, import and backup handlers.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use bookstand_core::ImportRowError;
use serde::Serialize;

use crate::api::handlers::{backup_after_write, error_response};
use crate::api::ApiState;

/// Export receipt (serializable).
#[derive(Serialize)]
pub struct ExportResponse {
    /// Path of the written CSV file.
    pub file: String,
    /// Number of exported records.
    pub rows: usize,
}

/// Import summary (serializable).
#[derive(Serialize)]
pub struct ImportResponse {
    /// Number of records inserted.
    pub imported: usize,
    /// Rejected rows with their input line numbers.
    pub errors: Vec<ImportRowError>,
}

/// Backup trigger result (serializable).
#[derive(Serialize)]
pub struct BackupResponse {
    /// Filename of the created snapshot.
    pub snapshot: String,
}

/// One snapshot listing entry (serializable).
#[derive(Serialize)]
pub struct BackupListEntry {
    pub name: String,
    /// Embedded snapshot timestamp, rendered human-readable.
    pub created_at: String,
    pub size_bytes: u64,
}

/// Write all records to a timestamped CSV file in the exports directory.
pub async fn export_books(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<ExportResponse>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let receipt = library.export_books().map_err(error_response)?;
    Ok(Json(ExportResponse {
        file: receipt.path.display().to_string(),
        rows: receipt.rows,
    }))
}

/// Import records from a CSV text body.
pub async fn import_books(
    State(state): State<Arc<ApiState>>,
    body: String,
) -> Result<Json<ImportResponse>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let outcome = library.import_books(&body).map_err(error_response)?;
    if !outcome.imported.is_empty() {
        backup_after_write(&library, state.keep_backups);
    }

    Ok(Json(ImportResponse {
        imported: outcome.imported.len(),
        errors: outcome.errors,
    }))
}

/// Trigger a snapshot followed by retention pruning.
pub async fn create_backup(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BackupResponse>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let snapshot = library.backup(state.keep_backups).map_err(error_response)?;
    Ok(Json(BackupResponse {
        snapshot: snapshot.as_str().to_string(),
    }))
}

/// List available snapshots, newest first.
pub async fn list_backups(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<BackupListEntry>>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let snapshots = library.list_backups().map_err(error_response)?;
    let entries = snapshots
        .into_iter()
        .map(|info| BackupListEntry {
            created_at: info.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            name: info.name,
            size_bytes: info.size_bytes,
        })
        .collect();

    Ok(Json(entries))
}
