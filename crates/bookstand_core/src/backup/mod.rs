//! Database snapshot and retention management.
//!
//! # Responsibility
//! - Copy the backing database file to timestamp-named snapshot files.
//! - Enforce a keep-newest-N retention policy over the snapshot directory.
//!
//! # Invariants
//! - A snapshot is never visible under its final name until fully written.
//! - Retention planning is pure; only `prune` touches the filesystem.

mod rotator;

pub use rotator::{
    plan_retention, BackupError, BackupResult, BackupRotator, SnapshotId, SnapshotInfo,
    DEFAULT_RETENTION,
};
