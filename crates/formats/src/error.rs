//! Error types for table readers and writers

use std::path::PathBuf;
use thiserror::Error;

/// Format errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] custdedup_core::Error),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),
}

/// Result type alias for format operations
pub type Result<T> = std::result::Result<T, Error>;
