//! Error types for the core table engine

use thiserror::Error;

/// Problems with the shape or typing of a table
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("missing required column `{column}`")]
    MissingColumn { column: String },

    #[error("duplicate column `{column}`")]
    DuplicateColumn { column: String },

    #[error("row {row} has {actual} cells, expected {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("column `{column}` at row {row}: expected a non-negative integer, found {value}")]
    InvalidTieBreak {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column `{column}` at row {row}: expected an integer ID, found {value}")]
    InvalidId {
        column: String,
        row: usize,
        value: String,
    },
}

/// Core errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
