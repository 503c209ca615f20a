//! CSV rendering, file export and import.
//!
//! # Responsibility
//! - Serialize records in `list` order behind a stable header.
//! - Parse CSV input row by row, skipping and reporting bad rows instead of
//!   aborting the whole import.
//!
//! # Invariants
//! - Export files are written to a `.part` sibling and renamed into place.
//! - Imported rows never carry their incoming `id` or timestamps; the store
//!   assigns fresh ones.

use crate::clock::Clock;
use crate::model::book::{Book, NewBook};
use crate::repo::book_repo::{BookRepository, RepoError};
use csv::{Reader, ReaderBuilder, StringRecord, Writer};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Column order shared by export and import.
pub const EXPORT_HEADER: [&str; 6] = [
    "id",
    "title",
    "author",
    "price",
    "created_at",
    "updated_at",
];

const EXPORT_PREFIX: &str = "books_export_";
const EXPORT_SUFFIX: &str = ".csv";
const EXPORT_TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S";
const PARTIAL_SUFFIX: &str = ".part";

pub type ExportResult<T> = Result<T, ExportError>;

/// Failure while rendering, writing or importing CSV.
#[derive(Debug)]
pub enum ExportError {
    /// CSV-level failure (malformed input, writer error).
    Csv(csv::Error),
    /// Filesystem failure at the given path.
    Io { path: PathBuf, source: io::Error },
    /// Import input lacks a required header column.
    MissingColumn(&'static str),
    /// Exported document has an unparseable field.
    Malformed(String),
    /// Persistence failure while inserting imported rows.
    Repo(RepoError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "export I/O failure at `{}`: {source}", path.display())
            }
            Self::MissingColumn(column) => {
                write!(f, "import header is missing required column `{column}`")
            }
            Self::Malformed(message) => write!(f, "malformed export document: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Csv(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::MissingColumn(_) => None,
            Self::Malformed(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<csv::Error> for ExportError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Result of one completed file export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub rows: usize,
}

/// One rejected import row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ImportRowError {
    /// 1-based line in the CSV input (the header is line 1).
    pub line: u64,
    pub message: String,
}

/// Result of one import run; bad rows are reported, good rows inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub imported: Vec<Book>,
    pub errors: Vec<ImportRowError>,
}

/// Renders records as CSV text with the fixed header row.
///
/// Rows appear in input order; fields containing delimiters or quotes are
/// quoted by the writer.
pub fn render_csv(books: &[Book]) -> ExportResult<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(EXPORT_HEADER)?;

    for book in books {
        writer.write_record(&[
            book.id.to_string(),
            book.title.clone(),
            book.author.clone(),
            book.price.to_string(),
            book.created_at.to_string(),
            book.updated_at.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Csv(csv::Error::from(err.into_error())))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Writes records to a timestamp-named CSV file in `exports_dir`.
///
/// The file is written to a `.part` sibling and renamed into place, so a
/// failed write leaves no file under the export name.
pub fn write_export(
    books: &[Book],
    exports_dir: &Path,
    clock: &impl Clock,
) -> ExportResult<ExportReceipt> {
    let text = render_csv(books)?;

    let name = format!(
        "{EXPORT_PREFIX}{}{EXPORT_SUFFIX}",
        clock.now().format(EXPORT_TIMESTAMP_FORMAT)
    );
    let final_path = exports_dir.join(&name);
    let partial_path = exports_dir.join(format!("{name}{PARTIAL_SUFFIX}"));

    if let Err(source) = fs::write(&partial_path, text.as_bytes()) {
        let _ = fs::remove_file(&partial_path);
        return Err(ExportError::Io {
            path: partial_path,
            source,
        });
    }
    if let Err(source) = fs::rename(&partial_path, &final_path) {
        let _ = fs::remove_file(&partial_path);
        return Err(ExportError::Io {
            path: final_path,
            source,
        });
    }

    info!(
        "event=export_write module=export status=ok rows={} file={name}",
        books.len()
    );
    Ok(ExportReceipt {
        path: final_path,
        rows: books.len(),
    })
}

/// Imports records from CSV text, inserting each valid row via `repo`.
///
/// Incoming `id`, `created_at` and `updated_at` columns are ignored; rows
/// that fail to parse or validate are collected as line errors without
/// aborting the rest of the import. Persistence failures other than
/// validation abort the run.
pub fn import_csv<R: BookRepository>(repo: &R, text: &str) -> ExportResult<ImportOutcome> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    let title_idx = find_column(&headers, "title")?;
    let author_idx = find_column(&headers, "author")?;
    let price_idx = find_column(&headers, "price")?;

    let mut outcome = ImportOutcome {
        imported: Vec::new(),
        errors: Vec::new(),
    };

    for (index, record) in reader.records().enumerate() {
        // Header occupies line 1.
        let line = index as u64 + 2;

        let record = match record {
            Ok(record) => record,
            Err(err) => {
                outcome.errors.push(ImportRowError {
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };

        let price_text = field(&record, price_idx);
        let price = match price_text.trim().parse::<f64>() {
            Ok(price) => price,
            Err(_) => {
                outcome.errors.push(ImportRowError {
                    line,
                    message: format!("invalid price `{price_text}`"),
                });
                continue;
            }
        };

        let draft = NewBook::new(field(&record, title_idx), field(&record, author_idx), price);
        match repo.create_book(&draft) {
            Ok(book) => outcome.imported.push(book),
            Err(RepoError::Validation(err)) => {
                outcome.errors.push(ImportRowError {
                    line,
                    message: err.to_string(),
                });
            }
            Err(err) => return Err(ExportError::Repo(err)),
        }
    }

    info!(
        "event=import_csv module=export status=ok imported={} rejected={}",
        outcome.imported.len(),
        outcome.errors.len()
    );
    Ok(outcome)
}

/// Reads back an exported document. Test and verification helper for the
/// export round-trip; tolerates nothing beyond the canonical header.
pub fn parse_export(text: &str) -> ExportResult<Vec<Book>> {
    let mut reader = Reader::from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();
    for (index, column) in EXPORT_HEADER.iter().enumerate() {
        let actual = headers.get(index).unwrap_or("");
        if !actual.trim().eq_ignore_ascii_case(column) {
            return Err(ExportError::Malformed(format!(
                "unexpected column `{actual}` at position {index}"
            )));
        }
    }

    let mut books = Vec::new();
    for record in reader.records() {
        let record = record?;
        books.push(Book {
            id: parse_field(&record, 0, "id")?,
            title: field(&record, 1),
            author: field(&record, 2),
            price: parse_field(&record, 3, "price")?,
            created_at: parse_field(&record, 4, "created_at")?,
            updated_at: parse_field(&record, 5, "updated_at")?,
        });
    }
    Ok(books)
}

fn field(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").to_string()
}

fn parse_field<T: std::str::FromStr>(
    record: &StringRecord,
    index: usize,
    column: &'static str,
) -> ExportResult<T> {
    let raw = record.get(index).unwrap_or("");
    raw.trim()
        .parse::<T>()
        .map_err(|_| ExportError::Malformed(format!("bad `{column}` value `{raw}`")))
}

fn find_column(headers: &StringRecord, name: &'static str) -> ExportResult<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name))
        .ok_or(ExportError::MissingColumn(name))
}
