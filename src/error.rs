// src/error.rs

use thiserror::Error;

/// Core error types for pkgstate
#[derive(Error, Debug)]
pub enum Error {
    /// I/O failure with the path or operation that caused it
    #[error("I/O error: {0}")]
    IoError(String),

    /// Repository directory or consolidated file does not exist
    #[error("Repository '{0}' not found")]
    RepositoryNotFound(String),

    /// Failure while writing a consolidated file
    #[error("Write error: {0}")]
    WriteError(String),
}

impl Error {
    /// True for conditions the tools report as "not found" rather than as failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::RepositoryNotFound(_))
    }
}

/// Result type alias using pkgstate's Error type
pub type Result<T> = std::result::Result<T, Error>;
