//! Error types for the importer
//!
//! Item-level failures (a session, a file directory, a single file) are
//! reported and skipped; everything else aborts the run.

use thiserror::Error;

/// Importer error
#[derive(Debug, Error)]
pub enum ImportError {
    /// Expected input file or directory absent
    #[error("missing {0}")]
    MissingFile(String),

    /// Input present but not parseable
    #[error("{0}")]
    MalformedData(String),

    /// Required key absent from sessioninfo.json
    #[error("missing {0} in sessioninfo.json")]
    MissingField(&'static str),

    /// File is not a usable MP3 stream
    #[error("{0}")]
    InvalidAudio(String),

    /// File skipped because of its extension
    #[error("unallowed file suffix: {0}")]
    UnsupportedFile(String),

    /// Database, storage or tag failure
    #[error(transparent)]
    Common(#[from] sarch_common::Error),

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    /// True for errors that only skip the current item
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            ImportError::MissingFile(_)
                | ImportError::MalformedData(_)
                | ImportError::MissingField(_)
                | ImportError::InvalidAudio(_)
                | ImportError::UnsupportedFile(_)
        )
    }

    /// True when a unique constraint rejected a row
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, ImportError::Common(e) if e.is_unique_violation())
    }
}

/// Result type for importer operations
pub type ImportResult<T> = Result<T, ImportError>;
