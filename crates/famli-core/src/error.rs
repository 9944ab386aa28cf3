//! Error types for famli-core

use thiserror::Error;

/// Main error type for famli-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(err.to_string())
    }
}

/// Result type alias for famli-core
pub type Result<T> = std::result::Result<T, Error>;
