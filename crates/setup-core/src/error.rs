//! Error types for setup-core

use std::path::PathBuf;

use serde::Serialize;
use setup_manifest::TargetVersion;

/// Result type for setup-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in setup-core operations
///
/// Except for manifest and run-level problems, every variant is scoped to
/// one package: the pipeline records it against that package and moves on.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Working copy exists but was cloned from a different location
    #[error("Working copy of '{package}' tracks {}, manifest says {expected}", .actual.as_deref().unwrap_or("no origin"))]
    ConfigDrift {
        package: String,
        expected: String,
        actual: Option<String>,
    },

    /// No usable working copy could be produced
    #[error("Fetch of '{package}' failed: {message}")]
    Fetch { package: String, message: String },

    /// The target version is not served by the manifest or the package
    #[error("{target} is not supported: {reason}")]
    Unsupported {
        target: TargetVersion,
        reason: String,
    },

    /// The compiler rejected an artifact
    #[error("Compiling {artifact} failed: {diagnostics}")]
    Compile {
        artifact: String,
        diagnostics: String,
    },

    /// A spawned process could not start or exited non-zero
    #[error("'{command}' failed{}: {message}", .exit_code.map(|c| format!(" with exit code {c}")).unwrap_or_default())]
    Execution {
        command: String,
        exit_code: Option<i32>,
        message: String,
    },

    /// The environment store could not be read or written
    #[error("Environment store {path}: {message}")]
    Store { path: PathBuf, message: String },

    /// Package filter names packages the manifest does not declare
    #[error("Unknown package(s): {}", .names.join(", "))]
    UnknownPackages { names: Vec<String> },

    #[error("Run cancelled")]
    Cancelled,

    /// Filesystem error from setup-fs
    #[error(transparent)]
    Fs(#[from] setup_fs::Error),

    /// Version-control error from setup-git
    #[error(transparent)]
    Git(#[from] setup_git::Error),

    /// Manifest error from setup-manifest
    #[error(transparent)]
    Manifest(#[from] setup_manifest::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Category of a package failure, as shown in run summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Parse,
    ConfigDrift,
    Fetch,
    Unsupported,
    Compile,
    Io,
    Execution,
    Store,
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigDrift { .. } => ErrorKind::ConfigDrift,
            Self::Fetch { .. } | Self::Git(_) => ErrorKind::Fetch,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Compile { .. } => ErrorKind::Compile,
            Self::Execution { .. } => ErrorKind::Execution,
            Self::Store { .. } => ErrorKind::Store,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Manifest(_) | Self::UnknownPackages { .. } => ErrorKind::Parse,
            Self::Fs(_) | Self::Io(_) => ErrorKind::Io,
        }
    }
}
