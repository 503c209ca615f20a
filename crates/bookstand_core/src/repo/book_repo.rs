//! Book repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and aggregate APIs over the `books` table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate caller input before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Listing is ordered by `id` ascending; insertion order and id order
//!   coincide because ids are monotonic.

use crate::db::DbError;
use crate::model::book::{Book, BookId, BookPatch, BookValidationError, NewBook};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const BOOK_SELECT_SQL: &str = "SELECT
    id,
    title,
    author,
    price,
    created_at,
    updated_at
FROM books";

pub type RepoResult<T> = Result<T, RepoError>;

/// Generic repository error for book persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(BookValidationError),
    Db(DbError),
    NotFound(BookId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "book not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<BookValidationError> for RepoError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing books.
#[derive(Debug, Clone, Default)]
pub struct BookListQuery {
    /// Case-insensitive substring filter on `author`.
    pub author_contains: Option<String>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Aggregate view of the whole catalog.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CatalogStats {
    pub total_count: u64,
    pub distinct_author_count: u64,
    /// Sum of `price` across all records.
    pub total_value: f64,
    /// Mean price; `0.0` for an empty catalog.
    pub average_price: f64,
}

/// Repository interface for book CRUD and aggregate operations.
pub trait BookRepository {
    /// Validates and inserts one record, returning the stored row.
    fn create_book(&self, draft: &NewBook) -> RepoResult<Book>;
    /// Gets one record by id.
    fn get_book(&self, id: BookId) -> RepoResult<Book>;
    /// Lists records using filter and pagination options.
    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>>;
    /// Applies the supplied fields only; refreshes `updated_at`.
    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<Book>;
    /// Hard-deletes one record by id.
    fn delete_book(&self, id: BookId) -> RepoResult<()>;
    /// Returns catalog-wide aggregates.
    fn stats(&self) -> RepoResult<CatalogStats>;
}

/// SQLite-backed book repository.
pub struct SqliteBookRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteBookRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl BookRepository for SqliteBookRepository<'_> {
    fn create_book(&self, draft: &NewBook) -> RepoResult<Book> {
        let draft = draft.normalized()?;

        self.conn.execute(
            "INSERT INTO books (title, author, price, created_at, updated_at)
             VALUES (
                ?1,
                ?2,
                ?3,
                (strftime('%s', 'now') * 1000),
                (strftime('%s', 'now') * 1000)
             );",
            params![draft.title, draft.author, draft.price],
        )?;

        self.get_book(self.conn.last_insert_rowid())
    }

    fn get_book(&self, id: BookId) -> RepoResult<Book> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => parse_book_row(row),
            None => Err(RepoError::NotFound(id)),
        }
    }

    fn list_books(&self, query: &BookListQuery) -> RepoResult<Vec<Book>> {
        let mut sql = format!("{BOOK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(fragment) = query.author_contains.as_deref() {
            // SQLite LIKE is case-insensitive for ASCII; wildcards in the
            // fragment are escaped so the match stays a literal substring.
            sql.push_str(" AND author LIKE ? ESCAPE '\\'");
            bind_values.push(Value::Text(like_contains_pattern(fragment)));
        }

        sql.push_str(" ORDER BY id ASC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
            if query.offset > 0 {
                sql.push_str(" OFFSET ?");
                bind_values.push(Value::Integer(i64::from(query.offset)));
            }
        } else if query.offset > 0 {
            sql.push_str(" LIMIT -1 OFFSET ?");
            bind_values.push(Value::Integer(i64::from(query.offset)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut books = Vec::new();

        while let Some(row) = rows.next()? {
            books.push(parse_book_row(row)?);
        }

        Ok(books)
    }

    fn update_book(&self, id: BookId, patch: &BookPatch) -> RepoResult<Book> {
        let patch = patch.normalized()?;

        let mut assignments = vec!["updated_at = (strftime('%s', 'now') * 1000)".to_string()];
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(title) = patch.title {
            assignments.push("title = ?".to_string());
            bind_values.push(Value::Text(title));
        }
        if let Some(author) = patch.author {
            assignments.push("author = ?".to_string());
            bind_values.push(Value::Text(author));
        }
        if let Some(price) = patch.price {
            assignments.push("price = ?".to_string());
            bind_values.push(Value::Real(price));
        }

        let sql = format!("UPDATE books SET {} WHERE id = ?;", assignments.join(", "));
        bind_values.push(Value::Integer(id));

        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.get_book(id)
    }

    fn delete_book(&self, id: BookId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM books WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn stats(&self) -> RepoResult<CatalogStats> {
        let (total_count, distinct_author_count, total_value, average_price) =
            self.conn.query_row(
                "SELECT
                    COUNT(*),
                    COUNT(DISTINCT author),
                    COALESCE(SUM(price), 0.0),
                    COALESCE(AVG(price), 0.0)
                 FROM books;",
                [],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                    ))
                },
            )?;

        Ok(CatalogStats {
            total_count: total_count as u64,
            distinct_author_count: distinct_author_count as u64,
            total_value,
            average_price,
        })
    }
}

/// Builds a `%fragment%` LIKE pattern with `%`, `_` and `\` escaped.
fn like_contains_pattern(fragment: &str) -> String {
    let mut pattern = String::with_capacity(fragment.len() + 2);
    pattern.push('%');
    for ch in fragment.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn parse_book_row(row: &Row<'_>) -> RepoResult<Book> {
    let book = Book {
        id: row.get("id")?,
        title: row.get("title")?,
        author: row.get("author")?,
        price: row.get("price")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    };

    if book.title.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty title in books.title for id {}",
            book.id
        )));
    }
    if book.author.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "empty author in books.author for id {}",
            book.id
        )));
    }
    if !book.price.is_finite() || book.price < 0.0 {
        return Err(RepoError::InvalidData(format!(
            "invalid price `{}` in books.price for id {}",
            book.price, book.id
        )));
    }

    Ok(book)
}
