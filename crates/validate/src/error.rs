//! Error types for validators

use thiserror::Error;

/// Validator errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type alias for validator operations
pub type Result<T> = std::result::Result<T, Error>;
