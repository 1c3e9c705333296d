//! Common error types for SArch

use thiserror::Error;

/// Common result type for SArch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the archive crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// MPEG stream could not be parsed
    #[error("Audio error: {0}")]
    Audio(String),

    /// ID3 tag could not be read or written
    #[error("Tag error: {0}")]
    Tag(#[from] id3::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// True when the error is a violated UNIQUE constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Error::Database(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}
