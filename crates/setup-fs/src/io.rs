//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use backoff::ExponentialBackoff;
use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Retry policy for renames that can fail transiently.
///
/// On Windows a freshly written file is often held open briefly by
/// indexers or virus scanners, so renames are retried with exponential
/// backoff before giving up.
#[derive(Debug, Clone, Copy)]
pub struct RobustnessConfig {
    /// Retry failed renames at all
    pub retry_rename: bool,
    /// Give up after this much time has passed
    pub max_elapsed: Duration,
}

impl Default for RobustnessConfig {
    fn default() -> Self {
        Self {
            retry_rename: true,
            max_elapsed: Duration::from_secs(2),
        }
    }
}

impl RobustnessConfig {
    /// No retries; used by tests that want failures to surface immediately.
    pub fn strict() -> Self {
        Self {
            retry_rename: false,
            max_elapsed: Duration::ZERO,
        }
    }
}

/// Rename `from` to `to`, retrying per `robustness`.
pub fn rename_with_retry(from: &Path, to: &Path, robustness: RobustnessConfig) -> Result<()> {
    if !robustness.retry_rename {
        return fs::rename(from, to).map_err(|e| Error::io(to, e));
    }

    let policy = ExponentialBackoff {
        initial_interval: Duration::from_millis(20),
        max_elapsed_time: Some(robustness.max_elapsed),
        ..ExponentialBackoff::default()
    };

    backoff::retry(policy, || {
        fs::rename(from, to).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                backoff::Error::permanent(e)
            } else {
                tracing::debug!(from = %from.display(), to = %to.display(), error = %e, "Rename failed, retrying");
                backoff::Error::transient(e)
            }
        })
    })
    .map_err(|e| match e {
        backoff::Error::Permanent(err) => Error::io(to, err),
        backoff::Error::Transient { err, .. } => Error::io(to, err),
    })
}

/// Write content atomically to a file with locking.
///
/// Uses write-to-temp-then-rename strategy to prevent partial writes.
/// Acquires an advisory lock to prevent concurrent access.
pub fn write_atomic(path: &NormalizedPath, content: &[u8], robustness: RobustnessConfig) -> Result<()> {
    let native_path = path.to_native();

    if let Some(parent) = native_path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    // Same directory keeps the rename on one filesystem
    let temp_name = format!(
        ".{}.{}.tmp",
        native_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default(),
        std::process::id()
    );
    let temp_path = native_path.with_file_name(&temp_name);

    let mut temp_file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&temp_path)
        .map_err(|e| Error::io(&temp_path, e))?;

    temp_file.lock_exclusive().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io(&temp_path, e))?;
    temp_file.sync_all().map_err(|e| Error::io(&temp_path, e))?;

    temp_file.unlock().map_err(|_| Error::LockFailed {
        path: native_path.clone(),
    })?;
    drop(temp_file);

    if let Err(e) = rename_with_retry(&temp_path, &native_path, robustness) {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }

    Ok(())
}

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Write text content to a file atomically.
pub fn write_text(path: &NormalizedPath, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes(), RobustnessConfig::default())
}
