//! Bookstand API daemon entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bookstand_core::{default_log_level, init_logging, Library, LibraryPaths, DEFAULT_RETENTION};
use clap::Parser;

use bookstand_server::api::{self, ApiState};

/// Single-user bookstore inventory API.
#[derive(Parser)]
#[command(name = "bookstand", about = "Single-user bookstore inventory API")]
struct Cli {
    /// Address to bind the API server.
    #[arg(long, env = "BOOKSTAND_BIND", default_value = "127.0.0.1:7070")]
    bind: String,

    /// Base directory for the database, backups, exports and logs.
    #[arg(long, env = "BOOKSTAND_DATA_DIR", default_value = "bookstand_data")]
    data_dir: PathBuf,

    /// Number of snapshots kept by backup rotation.
    #[arg(long, env = "BOOKSTAND_KEEP_BACKUPS", default_value_t = DEFAULT_RETENTION)]
    keep_backups: usize,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, env = "BOOKSTAND_LOG_LEVEL")]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = LibraryPaths::new(&cli.data_dir);
    paths.ensure_layout().with_context(|| {
        format!(
            "failed to create data layout under `{}`",
            cli.data_dir.display()
        )
    })?;

    // The logging backend requires an absolute directory.
    let logs_dir = paths
        .logs_dir()
        .canonicalize()
        .context("failed to resolve log directory")?;
    let logs_dir = logs_dir
        .to_str()
        .context("log directory is not valid UTF-8")?;
    let level = cli.log_level.as_deref().unwrap_or_else(|| default_log_level());
    init_logging(level, logs_dir).map_err(anyhow::Error::msg)?;

    let library = Library::open(paths)?;
    let state = Arc::new(ApiState::new(library, cli.keep_backups));

    api::serve(state, &cli.bind).await
}
