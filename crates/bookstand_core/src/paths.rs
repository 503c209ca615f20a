//! On-disk layout for one library instance.
//!
//! # Responsibility
//! - Resolve the data, backup, export and log directories under one base.
//! - Create the layout idempotently before the store opens.
//!
//! # Invariants
//! - The database file always lives at `<base>/data/books.db`.
//! - `ensure_layout` never deletes or truncates existing content.

use log::info;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const DATA_DIR: &str = "data";
const BACKUPS_DIR: &str = "backups";
const EXPORTS_DIR: &str = "exports";
const LOGS_DIR: &str = "logs";
const DB_FILE: &str = "books.db";

/// Directory layout rooted at a single base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    base: PathBuf,
}

impl LibraryPaths {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base.join(DATA_DIR)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir().join(DB_FILE)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.base.join(BACKUPS_DIR)
    }

    pub fn exports_dir(&self) -> PathBuf {
        self.base.join(EXPORTS_DIR)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join(LOGS_DIR)
    }

    /// Creates every directory in the layout. Safe to call repeatedly.
    pub fn ensure_layout(&self) -> io::Result<()> {
        for dir in [
            self.data_dir(),
            self.backups_dir(),
            self.exports_dir(),
            self.logs_dir(),
        ] {
            fs::create_dir_all(&dir)?;
        }

        info!(
            "event=layout_ready module=paths status=ok base={}",
            self.base.display()
        );
        Ok(())
    }
}
