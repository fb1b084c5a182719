//! Error types shared by the store, the command line and the TUI.

use std::path::PathBuf;

use thiserror::Error;

/// Failure reported by the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Input rejected before it reaches the store.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task name cannot be empty")]
    EmptyName,
    #[error("unrecognised due date '{0}'. Use YYYY-MM-DD, 'today', 'tomorrow', a weekday, or 'in Nd'")]
    InvalidDue(String),
}

/// Failure while resolving paths or setting up logging.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no writable data directory found; pass --db <path>")]
    NoDataDir,
    #[error("failed to open log file '{path}': {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of a command line subcommand. Printed to stderr by `main`.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: i64 },
    #[error("failed to serialise export: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("terminal: {0}")]
    Terminal(std::io::Error),
}
