//! Error types for setup-fs

use std::path::PathBuf;

/// Result type for setup-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in setup-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {format} settings at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported settings format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Source not found: {path}")]
    SourceNotFound { path: PathBuf },

    #[error("Invalid folder '{folder}': {reason}")]
    InvalidFolder { folder: String, reason: String },

    #[error("Invalid search path '{path}': {reason}")]
    InvalidSearchPath { path: String, reason: String },

    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
