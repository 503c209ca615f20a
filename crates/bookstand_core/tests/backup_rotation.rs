use bookstand_core::{BackupError, BackupRotator, Clock};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::fs;
use std::path::Path;

/// Manually advanced clock so snapshot names are deterministic.
struct ManualClock(Cell<DateTime<Utc>>);

impl ManualClock {
    fn starting_at(at: DateTime<Utc>) -> Self {
        Self(Cell::new(at))
    }

    fn advance_secs(&self, secs: i64) {
        self.0.set(self.0.get() + Duration::seconds(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.0.get()
    }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap()
}

fn seed_database(dir: &Path) -> std::path::PathBuf {
    let db_path = dir.join("books.db");
    fs::write(&db_path, b"catalog bytes").unwrap();
    db_path
}

fn snapshot_names(backup_dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(backup_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

#[test]
fn snapshot_creates_timestamped_copy() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = seed_database(dir.path());
    let backup_dir = dir.path().join("backups");
    fs::create_dir(&backup_dir).unwrap();

    let clock = ManualClock::starting_at(start_time());
    let rotator = BackupRotator::with_clock(&db_path, &backup_dir, &clock);

    let id = rotator.snapshot().unwrap();
    assert_eq!(id.as_str(), "backup_books_20260101T120000.db");

    let copied = fs::read(backup_dir.join(id.as_str())).unwrap();
    assert_eq!(copied, b"catalog bytes");

    // The partial file must not survive a successful snapshot.
    assert_eq!(snapshot_names(&backup_dir), vec![id.as_str().to_string()]);
}

#[test]
fn snapshot_without_database_fails() {
    let dir = tempfile::tempdir().unwrap();
    let backup_dir = dir.path().join("backups");
    fs::create_dir(&backup_dir).unwrap();

    let rotator = BackupRotator::new(dir.path().join("missing.db"), &backup_dir);

    let err = rotator.snapshot().unwrap_err();
    assert!(matches!(err, BackupError::MissingDatabase(_)));
    assert!(snapshot_names(&backup_dir).is_empty());
}

#[test]
fn seven_snapshots_prune_down_to_the_five_newest() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = seed_database(dir.path());
    let backup_dir = dir.path().join("backups");
    fs::create_dir(&backup_dir).unwrap();

    let clock = ManualClock::starting_at(start_time());
    let rotator = BackupRotator::with_clock(&db_path, &backup_dir, &clock);

    let mut created = Vec::new();
    for _ in 0..7 {
        created.push(rotator.snapshot().unwrap().as_str().to_string());
        clock.advance_secs(1);
    }

    let removed = rotator.prune(5).unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(removed, created[..2].to_vec());

    let mut expected_kept = created[2..].to_vec();
    expected_kept.sort();
    assert_eq!(snapshot_names(&backup_dir), expected_kept);
}

#[test]
fn prune_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = seed_database(dir.path());
    let backup_dir = dir.path().join("backups");
    fs::create_dir(&backup_dir).unwrap();

    let clock = ManualClock::starting_at(start_time());
    let rotator = BackupRotator::with_clock(&db_path, &backup_dir, &clock);

    for _ in 0..3 {
        rotator.snapshot().unwrap();
        clock.advance_secs(1);
    }

    assert_eq!(rotator.prune(2).unwrap().len(), 1);
    assert_eq!(rotator.prune(2).unwrap().len(), 0);
    assert_eq!(snapshot_names(&backup_dir).len(), 2);
}

#[test]
fn prune_never_touches_foreign_files() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = seed_database(dir.path());
    let backup_dir = dir.path().join("backups");
    fs::create_dir(&backup_dir).unwrap();
    fs::write(backup_dir.join("notes.txt"), b"keep me").unwrap();
    fs::write(backup_dir.join("backup_books_garbage.db"), b"also keep").unwrap();

    let clock = ManualClock::starting_at(start_time());
    let rotator = BackupRotator::with_clock(&db_path, &backup_dir, &clock);

    rotator.snapshot().unwrap();
    clock.advance_secs(1);
    rotator.snapshot().unwrap();

    rotator.prune(1).unwrap();

    let names = snapshot_names(&backup_dir);
    assert!(names.contains(&"notes.txt".to_string()));
    assert!(names.contains(&"backup_books_garbage.db".to_string()));
    assert!(names.contains(&"backup_books_20260101T120001.db".to_string()));
    assert_eq!(names.len(), 3);
}

#[test]
fn list_snapshots_is_newest_first() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = seed_database(dir.path());
    let backup_dir = dir.path().join("backups");
    fs::create_dir(&backup_dir).unwrap();

    let clock = ManualClock::starting_at(start_time());
    let rotator = BackupRotator::with_clock(&db_path, &backup_dir, &clock);

    for _ in 0..3 {
        rotator.snapshot().unwrap();
        clock.advance_secs(60);
    }

    let snapshots = rotator.list_snapshots().unwrap();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(snapshots[0].name, "backup_books_20260101T120200.db");
    assert_eq!(snapshots[2].name, "backup_books_20260101T120000.db");
    assert!(snapshots.iter().all(|info| info.size_bytes > 0));
}
