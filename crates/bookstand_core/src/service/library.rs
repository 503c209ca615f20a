//! Library facade: one explicitly constructed store instance.
//!
//! # Responsibility
//! - Own the connection lifecycle (open on startup, close on shutdown).
//! - Expose CRUD, stats, backup, export and import behind one error type.
//!
//! # Invariants
//! - The on-disk layout exists before the database is opened.
//! - Service APIs never bypass repository validation contracts.

use crate::backup::{BackupError, BackupRotator, SnapshotId, SnapshotInfo};
use crate::clock::SystemClock;
use crate::db::{open_db, DbError};
use crate::export::{
    import_csv, render_csv, write_export, ExportError, ExportReceipt, ImportOutcome,
};
use crate::model::book::{Book, BookId, BookPatch, NewBook};
use crate::paths::LibraryPaths;
use crate::repo::book_repo::{
    BookListQuery, BookRepository, CatalogStats, RepoError, SqliteBookRepository,
};
use log::info;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

/// Unified error surface for library use-cases.
#[derive(Debug)]
pub enum LibraryError {
    /// The on-disk layout could not be created.
    Layout { path: PathBuf, source: io::Error },
    Db(DbError),
    Repo(RepoError),
    Backup(BackupError),
    Export(ExportError),
}

impl Display for LibraryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Layout { path, source } => {
                write!(f, "failed to create layout at `{}`: {source}", path.display())
            }
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Backup(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LibraryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Layout { source, .. } => Some(source),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Backup(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<DbError> for LibraryError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for LibraryError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BackupError> for LibraryError {
    fn from(value: BackupError) -> Self {
        Self::Backup(value)
    }
}

impl From<ExportError> for LibraryError {
    fn from(value: ExportError) -> Self {
        Self::Export(value)
    }
}

/// One open library instance bound to an on-disk layout.
pub struct Library {
    conn: Connection,
    paths: LibraryPaths,
}

impl Library {
    /// Ensures the layout and opens the migrated database.
    pub fn open(paths: LibraryPaths) -> Result<Self, LibraryError> {
        paths.ensure_layout().map_err(|source| LibraryError::Layout {
            path: paths.base().to_path_buf(),
            source,
        })?;

        let conn = open_db(paths.db_path())?;
        info!(
            "event=library_open module=service status=ok base={}",
            paths.base().display()
        );
        Ok(Self { conn, paths })
    }

    pub fn paths(&self) -> &LibraryPaths {
        &self.paths
    }

    pub fn create_book(&self, draft: &NewBook) -> Result<Book, LibraryError> {
        Ok(self.repo().create_book(draft)?)
    }

    pub fn get_book(&self, id: BookId) -> Result<Book, LibraryError> {
        Ok(self.repo().get_book(id)?)
    }

    pub fn list_books(&self, query: &BookListQuery) -> Result<Vec<Book>, LibraryError> {
        Ok(self.repo().list_books(query)?)
    }

    pub fn update_book(&self, id: BookId, patch: &BookPatch) -> Result<Book, LibraryError> {
        Ok(self.repo().update_book(id, patch)?)
    }

    pub fn delete_book(&self, id: BookId) -> Result<(), LibraryError> {
        Ok(self.repo().delete_book(id)?)
    }

    pub fn stats(&self) -> Result<CatalogStats, LibraryError> {
        Ok(self.repo().stats()?)
    }

    /// Takes a snapshot, then prunes the backlog down to `keep`.
    pub fn backup(&self, keep: usize) -> Result<SnapshotId, LibraryError> {
        let rotator = self.rotator();
        let id = rotator.snapshot()?;
        rotator.prune(keep)?;
        Ok(id)
    }

    pub fn list_backups(&self) -> Result<Vec<SnapshotInfo>, LibraryError> {
        Ok(self.rotator().list_snapshots()?)
    }

    /// Writes all records to a timestamp-named CSV file in the exports dir.
    pub fn export_books(&self) -> Result<ExportReceipt, LibraryError> {
        let books = self.repo().list_books(&BookListQuery::default())?;
        Ok(write_export(&books, &self.paths.exports_dir(), &SystemClock)?)
    }

    /// Renders all records as CSV text without touching the filesystem.
    pub fn export_csv_text(&self) -> Result<String, LibraryError> {
        let books = self.repo().list_books(&BookListQuery::default())?;
        Ok(render_csv(&books)?)
    }

    /// Imports records from CSV text; bad rows become line errors.
    pub fn import_books(&self, text: &str) -> Result<ImportOutcome, LibraryError> {
        Ok(import_csv(&self.repo(), text)?)
    }

    /// Closes the underlying connection, surfacing shutdown failures.
    pub fn close(self) -> Result<(), LibraryError> {
        self.conn
            .close()
            .map_err(|(_conn, err)| LibraryError::Db(DbError::Sqlite(err)))?;
        info!("event=library_close module=service status=ok");
        Ok(())
    }

    fn repo(&self) -> SqliteBookRepository<'_> {
        SqliteBookRepository::new(&self.conn)
    }

    fn rotator(&self) -> BackupRotator {
        BackupRotator::new(self.paths.db_path(), self.paths.backups_dir())
    }
}
