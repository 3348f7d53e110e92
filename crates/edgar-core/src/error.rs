//! Error types for mirror operations.
//!
//! [`EdgarError`] covers everything that can abort a build or fail a lookup.
//! Malformed individual records found while indexing are not represented here;
//! they are recovered inside the index builder and only counted.

use thiserror::Error;

/// Errors that can occur while building or reading the mirror.
#[derive(Error, Debug)]
pub enum EdgarError {
    /// Non-success HTTP response or transport failure while fetching an archive.
    #[error("Network error: {0}")]
    Network(String),

    /// A directory or file could not be created, read, written or renamed.
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// A ZIP archive could not be opened or extracted.
    #[error("Archive error: {0}")]
    Archive(String),

    /// A persisted index, summary or facts file could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No identifier could be resolved, or its facts file is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl EdgarError {
    /// Builds a [`EdgarError::Filesystem`] naming the path involved.
    pub fn filesystem(path: impl AsRef<std::path::Path>, err: impl std::fmt::Display) -> Self {
        Self::Filesystem(format!("{}: {}", path.as_ref().display(), err))
    }
}

/// Result type alias using [`EdgarError`].
pub type Result<T> = std::result::Result<T, EdgarError>;
