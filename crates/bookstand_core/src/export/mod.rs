//! Delimited-text export and import for the catalog.
//!
//! # Responsibility
//! - Render the record set as CSV with a fixed header row.
//! - Write timestamp-named export files without exposing partial writes.
//! - Re-ingest exported CSV, collecting per-line errors.

mod csv_io;

pub use csv_io::{
    import_csv, parse_export, render_csv, write_export, ExportError, ExportReceipt, ExportResult,
    ImportOutcome, ImportRowError, EXPORT_HEADER,
};
