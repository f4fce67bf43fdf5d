//! Error types for setup-cli

use setup_core::ErrorKind;

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Exit code for a successful run
pub const EXIT_OK: i32 = 0;
/// Manifest could not be parsed, or the command line was unusable
pub const EXIT_PARSE: i32 = 1;
/// One or more packages failed
pub const EXIT_FAILED: i32 = 2;
/// The target version is not supported
pub const EXIT_UNSUPPORTED: i32 = 3;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from setup-core
    #[error(transparent)]
    Core(#[from] setup_core::Error),

    /// Error from setup-manifest
    #[error(transparent)]
    Manifest(#[from] setup_manifest::Error),

    /// Error from setup-git
    #[error(transparent)]
    Git(#[from] setup_git::Error),

    /// Error from setup-fs
    #[error(transparent)]
    Fs(#[from] setup_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON output failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Interactive prompt error
    #[error("Interactive prompt error: {0}")]
    Dialoguer(#[from] dialoguer::Error),

    /// No target version given and none in the manifest
    #[error("No target version: pass --target or set DefaultIDE in the manifest")]
    NoTarget,

    /// The run finished but some packages did not install
    #[error("{failed} package(s) failed")]
    PackagesFailed { failed: usize },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Core(e) => match e.kind() {
                ErrorKind::Unsupported => EXIT_UNSUPPORTED,
                _ => EXIT_PARSE,
            },
            Self::NoTarget => EXIT_UNSUPPORTED,
            Self::PackagesFailed { .. } => EXIT_FAILED,
            _ => EXIT_PARSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use setup_manifest::TargetVersion;

    #[test]
    fn user_error_displays_message() {
        let error = CliError::user("test error");
        assert_eq!(format!("{}", error), "test error");
        assert_eq!(error.exit_code(), EXIT_PARSE);
    }

    #[test]
    fn unsupported_target_maps_to_three() {
        let error = CliError::from(setup_core::Error::Unsupported {
            target: TargetVersion::new(26),
            reason: "below the minimum supported version D27".into(),
        });
        assert_eq!(error.exit_code(), EXIT_UNSUPPORTED);
        assert_eq!(CliError::NoTarget.exit_code(), EXIT_UNSUPPORTED);
    }

    #[test]
    fn failed_packages_map_to_two() {
        assert_eq!(CliError::PackagesFailed { failed: 1 }.exit_code(), EXIT_FAILED);
    }

    #[test]
    fn parse_errors_map_to_one() {
        let error = CliError::from(setup_core::Error::UnknownPackages {
            names: vec!["Nope".into()],
        });
        assert_eq!(error.exit_code(), EXIT_PARSE);
    }
}
