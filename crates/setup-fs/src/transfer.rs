//! Rollback-safe copy and idempotent removal
//!
//! Copies are staged next to their destination and moved into place with a
//! rename, so an interrupted or failed copy never leaves a half-written
//! destination. Replacing an existing directory keeps the old tree as a
//! backup until the new one is in place and restores it on failure.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::checksum::files_match;
use crate::io::{RobustnessConfig, rename_with_retry};
use crate::{Error, NormalizedPath, Result};

/// Result of a successful copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Content was written to `target`
    Copied { target: NormalizedPath },
    /// `target` already held identical content
    Unchanged { target: NormalizedPath },
}

impl CopyOutcome {
    /// The final location of the copied file or directory.
    pub fn target(&self) -> &NormalizedPath {
        match self {
            Self::Copied { target } | Self::Unchanged { target } => target,
        }
    }
}

/// Copy `origin` (file or directory) to `destination`.
///
/// When `destination` is an existing directory the origin is placed inside
/// it under its own name; otherwise `destination` is the target path itself.
/// Missing parent directories are created.
pub fn copy_path(
    origin: &NormalizedPath,
    destination: &NormalizedPath,
    robustness: RobustnessConfig,
) -> Result<CopyOutcome> {
    let source = origin.to_native();
    if !source.exists() {
        return Err(Error::SourceNotFound { path: source });
    }

    let target = if destination.is_dir() {
        match origin.file_name() {
            Some(name) => destination.join(name),
            None => destination.clone(),
        }
    } else {
        destination.clone()
    };
    let target_native = target.to_native();

    if let Some(parent) = target_native.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    if source.is_dir() {
        replace_dir(&source, &target_native, robustness)?;
        tracing::debug!(origin = %origin, target = %target, "Copied directory");
        return Ok(CopyOutcome::Copied { target });
    }

    if files_match(&source, &target_native) {
        tracing::debug!(origin = %origin, target = %target, "Destination already up to date");
        return Ok(CopyOutcome::Unchanged { target });
    }

    let staged = sibling(&target_native, "tmp");
    if let Err(e) = fs::copy(&source, &staged) {
        let _ = fs::remove_file(&staged);
        return Err(Error::io(&source, e));
    }
    if let Err(e) = rename_with_retry(&staged, &target_native, robustness) {
        let _ = fs::remove_file(&staged);
        return Err(e);
    }

    tracing::debug!(origin = %origin, target = %target, "Copied file");
    Ok(CopyOutcome::Copied { target })
}

/// Remove a file or directory tree.
///
/// Returns `Ok(false)` when nothing existed at `path`.
pub fn remove_path(path: &NormalizedPath) -> Result<bool> {
    let native = path.to_native();
    let metadata = match fs::symlink_metadata(&native) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(Error::io(&native, e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(&native)
    } else {
        fs::remove_file(&native)
    };

    match result {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(&native, e)),
    }
}

/// Stage a copy of `source` next to `target`, then swap it into place.
fn replace_dir(source: &Path, target: &Path, robustness: RobustnessConfig) -> Result<()> {
    let staging = sibling(target, "staging");
    if let Err(e) = copy_tree(source, &staging) {
        let _ = fs::remove_dir_all(&staging);
        return Err(e);
    }

    let backup = if target.exists() {
        let backup = sibling(target, "backup");
        if let Err(e) = rename_with_retry(target, &backup, robustness) {
            let _ = fs::remove_dir_all(&staging);
            return Err(e);
        }
        Some(backup)
    } else {
        None
    };

    if let Err(e) = rename_with_retry(&staging, target, robustness) {
        let _ = fs::remove_dir_all(&staging);
        if let Some(backup) = &backup
            && let Err(restore) = rename_with_retry(backup, target, robustness)
        {
            tracing::error!(
                target = %target.display(),
                backup = %backup.display(),
                error = %restore,
                "Failed to restore previous contents"
            );
        }
        return Err(e);
    }

    if let Some(backup) = backup {
        let removed = if backup.is_dir() {
            fs::remove_dir_all(&backup)
        } else {
            fs::remove_file(&backup)
        };
        if let Err(e) = removed {
            tracing::warn!(backup = %backup.display(), error = %e, "Failed to remove backup");
        }
    }

    Ok(())
}

fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    fs::create_dir_all(target).map_err(|e| Error::io(target, e))?;
    let entries = fs::read_dir(source).map_err(|e| Error::io(source, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(source, e))?;
        let from = entry.path();
        let to = target.join(entry.file_name());
        if from.is_dir() {
            copy_tree(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(|e| Error::io(&from, e))?;
        }
    }
    Ok(())
}

/// A unique hidden path in the same directory as `path`.
fn sibling(path: &Path, kind: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.{}.{}", name, Uuid::new_v4().simple(), kind))
}
