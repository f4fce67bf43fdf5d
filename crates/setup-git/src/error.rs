//! Error types for setup-git

use std::path::PathBuf;

/// Result type for setup-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in setup-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] setup_fs::Error),

    #[error("Not a git working copy: {path}")]
    NotARepository { path: PathBuf },

    #[error("Cannot clone into {path}: directory exists and is not empty")]
    DestinationOccupied { path: PathBuf },

    #[error("Clone of '{url}' failed: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Fetch from '{remote}' failed: {message}")]
    FetchFailed { remote: String, message: String },

    #[error("Push to '{remote}' failed: {message}")]
    PushFailed { remote: String, message: String },

    #[error("HEAD is detached in {path}")]
    DetachedHead { path: PathBuf },

    #[error("{message}")]
    CannotFastForward { message: String },

    #[error("Invalid tag name: {name}")]
    InvalidTagName { name: String },

    #[error("Tag '{name}' already exists")]
    TagExists { name: String },
}
