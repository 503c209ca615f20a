use bookstand_core::db::open_db_in_memory;
use bookstand_core::{
    import_csv, parse_export, render_csv, write_export, Book, BookListQuery, BookRepository,
    Clock, ExportError, NewBook, SqliteBookRepository,
};
use chrono::{DateTime, TimeZone, Utc};
use std::fs;

struct FrozenClock(DateTime<Utc>);

impl Clock for FrozenClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn sample_book(id: i64, title: &str, author: &str, price: f64) -> Book {
    Book {
        id,
        title: title.to_string(),
        author: author.to_string(),
        price,
        created_at: 1_700_000_000_000,
        updated_at: 1_700_000_000_000,
    }
}

#[test]
fn empty_export_is_just_the_header() {
    let text = render_csv(&[]).unwrap();
    assert_eq!(text, "id,title,author,price,created_at,updated_at\n");
}

#[test]
fn export_preserves_input_order() {
    let books = vec![
        sample_book(3, "Ubik", "Philip K. Dick", 7.25),
        sample_book(1, "Dune", "Frank Herbert", 12.5),
    ];

    let text = render_csv(&books).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("3,"));
    assert!(lines[2].starts_with("1,"));
}

#[test]
fn roundtrip_preserves_special_characters() {
    let books = vec![
        sample_book(1, "Comma, the Novel", "Smith, Ada", 10.0),
        sample_book(2, "He said \"hi\"", "O'Neil", 5.5),
        sample_book(3, "Line\nBreak", "Weird & Co", 0.0),
    ];

    let text = render_csv(&books).unwrap();
    let parsed = parse_export(&text).unwrap();
    assert_eq!(parsed, books);
}

#[test]
fn write_export_creates_a_timestamped_file() {
    let dir = tempfile::tempdir().unwrap();
    let clock = FrozenClock(Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap());
    let books = vec![sample_book(1, "Dune", "Frank Herbert", 12.5)];

    let receipt = write_export(&books, dir.path(), &clock).unwrap();
    assert_eq!(receipt.rows, 1);
    assert_eq!(
        receipt.path.file_name().and_then(|name| name.to_str()),
        Some("books_export_20260101T120000.csv")
    );

    let written = fs::read_to_string(&receipt.path).unwrap();
    assert_eq!(written, render_csv(&books).unwrap());

    // Only the completed export may be visible.
    let entries: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(entries, vec!["books_export_20260101T120000.csv".to_string()]);
}

#[test]
fn import_inserts_valid_rows_and_reports_bad_ones() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let text = "id,title,author,price,created_at,updated_at\n\
                99,Dune,Frank Herbert,12.5,0,0\n\
                100,Hyperion,Dan Simmons,not-a-price,0,0\n\
                101,,Anonymous,3.0,0,0\n\
                102,\"Comma, the Novel\",\"Smith, Ada\",10.0,0,0\n";

    let outcome = import_csv(&repo, text).unwrap();

    assert_eq!(outcome.imported.len(), 2);
    assert_eq!(outcome.errors.len(), 2);
    assert_eq!(outcome.errors[0].line, 3);
    assert!(outcome.errors[0].message.contains("price"));
    assert_eq!(outcome.errors[1].line, 4);
    assert!(outcome.errors[1].message.contains("title"));

    // Incoming ids are ignored; the store assigns fresh ones.
    assert!(outcome.imported.iter().all(|book| book.id < 99));

    let listed = repo.list_books(&BookListQuery::default()).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].title, "Dune");
    assert_eq!(listed[1].title, "Comma, the Novel");
    assert_eq!(listed[1].author, "Smith, Ada");
}

#[test]
fn import_without_required_columns_fails() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBookRepository::new(&conn);

    let err = import_csv(&repo, "id,title,author\n1,Dune,Frank Herbert\n").unwrap_err();
    assert!(matches!(err, ExportError::MissingColumn("price")));
}

#[test]
fn export_then_import_recovers_the_same_records() {
    let source_conn = open_db_in_memory().unwrap();
    let source = SqliteBookRepository::new(&source_conn);
    source
        .create_book(&NewBook::new("Comma, the Novel", "Smith, Ada", 10.0))
        .unwrap();
    source
        .create_book(&NewBook::new("He said \"hi\"", "O'Neil", 5.5))
        .unwrap();

    let text = render_csv(&source.list_books(&BookListQuery::default()).unwrap()).unwrap();

    let target_conn = open_db_in_memory().unwrap();
    let target = SqliteBookRepository::new(&target_conn);
    let outcome = import_csv(&target, &text).unwrap();
    assert!(outcome.errors.is_empty());

    let originals = source.list_books(&BookListQuery::default()).unwrap();
    let imported = target.list_books(&BookListQuery::default()).unwrap();
    let fields = |books: &[Book]| -> Vec<(String, String, f64)> {
        books
            .iter()
            .map(|book| (book.title.clone(), book.author.clone(), book.price))
            .collect()
    };
    assert_eq!(fields(&originals), fields(&imported));
}
