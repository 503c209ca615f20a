use bookstand_core::{
    BookListQuery, BookPatch, Library, LibraryError, LibraryPaths, NewBook, RepoError,
};

#[test]
fn open_creates_the_layout_and_close_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LibraryPaths::new(dir.path().join("store"));

    let library = Library::open(paths.clone()).unwrap();
    assert!(paths.data_dir().is_dir());
    assert!(paths.backups_dir().is_dir());
    assert!(paths.exports_dir().is_dir());
    assert!(paths.logs_dir().is_dir());
    assert!(paths.db_path().is_file());

    library.close().unwrap();
}

#[test]
fn records_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let paths = LibraryPaths::new(dir.path().join("store"));

    let library = Library::open(paths.clone()).unwrap();
    let created = library
        .create_book(&NewBook::new("Dune", "Frank Herbert", 12.5))
        .unwrap();
    library.close().unwrap();

    let reopened = Library::open(paths).unwrap();
    let loaded = reopened.get_book(created.id).unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn crud_and_stats_flow_through_the_facade() {
    let dir = tempfile::tempdir().unwrap();
    let library = Library::open(LibraryPaths::new(dir.path().join("store"))).unwrap();

    let created = library
        .create_book(&NewBook::new("Dune", "Frank Herbert", 12.5))
        .unwrap();
    library
        .create_book(&NewBook::new("Hyperion", "Dan Simmons", 9.0))
        .unwrap();

    let updated = library
        .update_book(
            created.id,
            &BookPatch {
                price: Some(15.0),
                ..BookPatch::default()
            },
        )
        .unwrap();
    assert_eq!(updated.price, 15.0);

    let stats = library.stats().unwrap();
    assert_eq!(stats.total_count, 2);
    assert_eq!(stats.distinct_author_count, 2);
    assert!((stats.total_value - 24.0).abs() < 1e-9);

    library.delete_book(created.id).unwrap();
    let err = library.get_book(created.id).unwrap_err();
    assert!(matches!(
        err,
        LibraryError::Repo(RepoError::NotFound(id)) if id == created.id
    ));

    assert_eq!(
        library.list_books(&BookListQuery::default()).unwrap().len(),
        1
    );
}

#[test]
fn backup_snapshots_land_in_the_backups_dir() {
    let dir = tempfile::tempdir().unwrap();
    let library = Library::open(LibraryPaths::new(dir.path().join("store"))).unwrap();

    library
        .create_book(&NewBook::new("Dune", "Frank Herbert", 12.5))
        .unwrap();

    let snapshot = library.backup(5).unwrap();
    let listed = library.list_backups().unwrap();
    assert!(!listed.is_empty());
    assert!(listed.len() <= 5);
    assert!(listed.iter().any(|info| info.name == snapshot.as_str()));
}

#[test]
fn export_writes_into_the_exports_dir() {
    let dir = tempfile::tempdir().unwrap();
    let library = Library::open(LibraryPaths::new(dir.path().join("store"))).unwrap();

    library
        .create_book(&NewBook::new("Dune", "Frank Herbert", 12.5))
        .unwrap();
    library
        .create_book(&NewBook::new("Hyperion", "Dan Simmons", 9.0))
        .unwrap();

    let receipt = library.export_books().unwrap();
    assert_eq!(receipt.rows, 2);
    assert!(receipt.path.starts_with(library.paths().exports_dir()));
    assert!(receipt.path.is_file());

    let text = library.export_csv_text().unwrap();
    assert!(text.starts_with("id,title,author,price,created_at,updated_at"));
    assert_eq!(text.lines().count(), 3);
}

#[test]
fn import_flows_through_the_facade() {
    let dir = tempfile::tempdir().unwrap();
    let library = Library::open(LibraryPaths::new(dir.path().join("store"))).unwrap();

    let outcome = library
        .import_books(
            "id,title,author,price,created_at,updated_at\n\
             1,Dune,Frank Herbert,12.5,0,0\n\
             2,Bad,,3.0,0,0\n",
        )
        .unwrap();

    assert_eq!(outcome.imported.len(), 1);
    assert_eq!(outcome.errors.len(), 1);
    assert_eq!(library.stats().unwrap().total_count, 1);
}
