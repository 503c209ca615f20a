//! HTTP handlers translating requests into library calls.

pub mod books;
pub mod maintenance;
pub mod status;

use axum::http::StatusCode;
use bookstand_core::{ExportError, Library, LibraryError, RepoError};

/// Maps core errors onto user-facing status codes.
pub(crate) fn error_response(err: LibraryError) -> (StatusCode, String) {
    let status = match &err {
        LibraryError::Repo(RepoError::NotFound(_)) => StatusCode::NOT_FOUND,
        LibraryError::Repo(RepoError::Validation(_)) => StatusCode::BAD_REQUEST,
        LibraryError::Export(ExportError::Csv(_) | ExportError::MissingColumn(_)) => {
            StatusCode::BAD_REQUEST
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        log::error!("event=api_error module=server status=error error={err}");
    }
    (status, err.to_string())
}

/// Snapshot-and-prune after a committed write.
///
/// The mutation already succeeded, so a backup failure is logged instead of
/// turning the response into an error.
pub(crate) fn backup_after_write(library: &Library, keep: usize) {
    if let Err(err) = library.backup(keep) {
        log::warn!("event=backup_after_write module=server status=error error={err}");
    }
}
