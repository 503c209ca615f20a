//! Snapshot creation and retention pruning for the database file.
//!
//! # Responsibility
//! - Produce byte copies of the backing file under timestamp-named files.
//! - Order snapshots deterministically and delete everything past the
//!   retention count.
//!
//! # Invariants
//! - Snapshots are written to a `.part` sibling and renamed into place, so
//!   an interrupted copy never appears under a snapshot name.
//! - Files in the backup directory that do not parse as snapshots are
//!   never deleted.

use crate::clock::{Clock, SystemClock};
use chrono::NaiveDateTime;
use log::{error, info};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default number of snapshots kept by `prune`.
pub const DEFAULT_RETENTION: usize = 5;

const SNAPSHOT_PREFIX: &str = "backup_books_";
const SNAPSHOT_SUFFIX: &str = ".db";
const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const PARTIAL_SUFFIX: &str = ".part";

pub type BackupResult<T> = Result<T, BackupError>;

/// Failure while creating, listing or deleting snapshots.
#[derive(Debug)]
pub enum BackupError {
    /// The backing database file does not exist.
    MissingDatabase(PathBuf),
    /// Filesystem failure at the given path.
    Io { path: PathBuf, source: io::Error },
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingDatabase(path) => {
                write!(f, "database file not found: {}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "snapshot I/O failure at `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingDatabase(_) => None,
            Self::Io { source, .. } => Some(source),
        }
    }
}

/// Name of one completed snapshot file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotId(String);

impl SnapshotId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SnapshotId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot metadata collected from the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Snapshot filename.
    pub name: String,
    /// Timestamp embedded in the filename (UTC).
    pub timestamp: NaiveDateTime,
    pub size_bytes: u64,
}

/// Copies the database file into a backup directory and prunes old copies.
pub struct BackupRotator<C: Clock = SystemClock> {
    db_path: PathBuf,
    backup_dir: PathBuf,
    clock: C,
}

impl BackupRotator<SystemClock> {
    pub fn new(db_path: impl Into<PathBuf>, backup_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(db_path, backup_dir, SystemClock)
    }
}

impl<C: Clock> BackupRotator<C> {
    pub fn with_clock(
        db_path: impl Into<PathBuf>,
        backup_dir: impl Into<PathBuf>,
        clock: C,
    ) -> Self {
        Self {
            db_path: db_path.into(),
            backup_dir: backup_dir.into(),
            clock,
        }
    }

    /// Copies the backing file to a new timestamp-named snapshot.
    ///
    /// The copy lands in a `.part` file first and is renamed into place, so
    /// a failed copy leaves no file under the snapshot name.
    pub fn snapshot(&self) -> BackupResult<SnapshotId> {
        if !self.db_path.exists() {
            return Err(BackupError::MissingDatabase(self.db_path.clone()));
        }

        let name = format!(
            "{SNAPSHOT_PREFIX}{}{SNAPSHOT_SUFFIX}",
            self.clock.now().format(SNAPSHOT_TIMESTAMP_FORMAT)
        );
        let final_path = self.backup_dir.join(&name);
        let partial_path = self.backup_dir.join(format!("{name}{PARTIAL_SUFFIX}"));

        if let Err(source) = fs::copy(&self.db_path, &partial_path) {
            let _ = fs::remove_file(&partial_path);
            error!("event=backup_snapshot module=backup status=error name={name} error={source}");
            return Err(BackupError::Io {
                path: partial_path,
                source,
            });
        }

        if let Err(source) = fs::rename(&partial_path, &final_path) {
            let _ = fs::remove_file(&partial_path);
            error!("event=backup_snapshot module=backup status=error name={name} error={source}");
            return Err(BackupError::Io {
                path: final_path,
                source,
            });
        }

        info!("event=backup_snapshot module=backup status=ok name={name}");
        Ok(SnapshotId(name))
    }

    /// Lists completed snapshots, newest first.
    ///
    /// Non-snapshot files in the backup directory are skipped.
    pub fn list_snapshots(&self) -> BackupResult<Vec<SnapshotInfo>> {
        let entries = fs::read_dir(&self.backup_dir).map_err(|source| BackupError::Io {
            path: self.backup_dir.clone(),
            source,
        })?;

        let mut snapshots = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| BackupError::Io {
                path: self.backup_dir.clone(),
                source,
            })?;
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            let Some(timestamp) = parse_snapshot_name(&name) else {
                continue;
            };
            let size_bytes = entry
                .metadata()
                .map_err(|source| BackupError::Io {
                    path: self.backup_dir.join(&name),
                    source,
                })?
                .len();

            snapshots.push(SnapshotInfo {
                name,
                timestamp,
                size_bytes,
            });
        }

        snapshots.sort_by(newest_first);
        Ok(snapshots)
    }

    /// Deletes every snapshot past the newest `keep`, returning their names.
    ///
    /// Running `prune` again without new snapshots is a no-op.
    pub fn prune(&self, keep: usize) -> BackupResult<Vec<String>> {
        let victims = plan_retention(self.list_snapshots()?, keep);

        let mut removed = Vec::with_capacity(victims.len());
        for victim in victims {
            let path = self.backup_dir.join(&victim.name);
            fs::remove_file(&path).map_err(|source| BackupError::Io { path, source })?;
            removed.push(victim.name);
        }

        if !removed.is_empty() {
            info!(
                "event=backup_prune module=backup status=ok kept={keep} removed={}",
                removed.len()
            );
        }
        Ok(removed)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }
}

/// Selects the snapshots to delete: everything past the newest `keep`.
///
/// Ordering is by embedded timestamp descending; equal timestamps fall back
/// to lexical filename order so the plan is deterministic.
pub fn plan_retention(mut snapshots: Vec<SnapshotInfo>, keep: usize) -> Vec<SnapshotInfo> {
    snapshots.sort_by(newest_first);
    if snapshots.len() <= keep {
        return Vec::new();
    }
    snapshots.split_off(keep)
}

fn newest_first(a: &SnapshotInfo, b: &SnapshotInfo) -> Ordering {
    b.timestamp
        .cmp(&a.timestamp)
        .then_with(|| a.name.cmp(&b.name))
}

fn parse_snapshot_name(name: &str) -> Option<NaiveDateTime> {
    let stem = name
        .strip_prefix(SNAPSHOT_PREFIX)?
        .strip_suffix(SNAPSHOT_SUFFIX)?;
    NaiveDateTime::parse_from_str(stem, SNAPSHOT_TIMESTAMP_FORMAT).ok()
}
