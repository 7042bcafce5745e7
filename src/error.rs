use std::path::PathBuf;
use thiserror::Error;

/// Failures from the key-value store and the history layered on it.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Failed to create data directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to encode history: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Repetition amount must be between 1 and 9, got {0}")]
    InvalidAmount(u32),
}

pub type Result<T> = std::result::Result<T, Error>;
