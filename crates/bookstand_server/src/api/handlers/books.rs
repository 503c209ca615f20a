//! Catalog CRUD and statistics handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use bookstand_core::{Book, BookId, BookListQuery, BookPatch, CatalogStats, NewBook};
use serde::Deserialize;

use crate::api::handlers::{backup_after_write, error_response};
use crate::api::ApiState;

/// Query parameters for the list endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    /// Case-insensitive substring filter on author.
    pub author: Option<String>,
}

/// List all books, optionally filtered by author substring.
pub async fn list_books(
    State(state): State<Arc<ApiState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Book>>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let query = BookListQuery {
        author_contains: params.author,
        ..BookListQuery::default()
    };
    let books = library.list_books(&query).map_err(error_response)?;

    Ok(Json(books))
}

/// Create a new book.
pub async fn create_book(
    State(state): State<Arc<ApiState>>,
    Json(draft): Json<NewBook>,
) -> Result<(StatusCode, Json<Book>), (StatusCode, String)> {
    let library = state.library.lock().await;

    let book = library.create_book(&draft).map_err(error_response)?;
    backup_after_write(&library, state.keep_backups);

    Ok((StatusCode::CREATED, Json(book)))
}

/// Get a specific book.
pub async fn get_book(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<BookId>,
) -> Result<Json<Book>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let book = library.get_book(id).map_err(error_response)?;
    Ok(Json(book))
}

/// Apply a partial update to a book.
pub async fn update_book(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<BookId>,
    Json(patch): Json<BookPatch>,
) -> Result<Json<Book>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let book = library.update_book(id, &patch).map_err(error_response)?;
    backup_after_write(&library, state.keep_backups);

    Ok(Json(book))
}

/// Delete a book.
pub async fn delete_book(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<BookId>,
) -> Result<StatusCode, (StatusCode, String)> {
    let library = state.library.lock().await;

    library.delete_book(id).map_err(error_response)?;
    backup_after_write(&library, state.keep_backups);

    Ok(StatusCode::NO_CONTENT)
}

/// Catalog-wide statistics.
pub async fn stats(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<CatalogStats>, (StatusCode, String)> {
    let library = state.library.lock().await;

    let stats = library.stats().map_err(error_response)?;
    Ok(Json(stats))
}
