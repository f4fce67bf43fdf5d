//! Repository fetcher: clone-or-update policy over a `SourceControl`
//!
//! The fetcher decides *what* to do with a package's working copy; the
//! version-control collaborator does it. Updates fail soft: a working copy
//! that exists but cannot be updated is reported stale and used as it is.

use std::sync::Arc;

use serde::Serialize;
use setup_fs::NormalizedPath;
use setup_git::{same_remote, SourceControl, UpdateOutcome};
use setup_manifest::SourceRef;

use crate::{Error, Result};

/// What the fetch step did to a working copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FetchStatus {
    /// No working copy existed; it was cloned
    Cloned,
    /// New commits were fast-forwarded in
    Updated,
    UpToDate,
    /// Offline run; the existing copy was used without contacting the remote
    Offline,
    /// Update failed; the existing copy was kept
    Stale { reason: String },
    /// The working copy tracks a different origin; it was left untouched
    Drifted { actual: Option<String> },
}

impl FetchStatus {
    /// Whether the working copy is usable without reservation.
    pub fn is_clean(&self) -> bool {
        !matches!(self, Self::Stale { .. } | Self::Drifted { .. })
    }
}

/// Clones or updates package working copies.
///
/// Cheap to clone; every fetch task in the worker pool holds its own handle.
#[derive(Clone)]
pub struct RepositoryFetcher {
    source: Arc<dyn SourceControl>,
}

impl RepositoryFetcher {
    pub fn new(source: Arc<dyn SourceControl>) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &dyn SourceControl {
        self.source.as_ref()
    }

    /// Ensure a working copy of `source` exists at `folder`.
    ///
    /// Fails only when no usable working copy exists afterwards.
    pub fn fetch(
        &self,
        package: &str,
        source: &SourceRef,
        folder: &NormalizedPath,
        offline: bool,
    ) -> Result<FetchStatus> {
        if !self.source.is_working_copy(folder) {
            if offline {
                return Err(Error::Fetch {
                    package: package.to_string(),
                    message: format!("no working copy at {folder} and running offline"),
                });
            }
            self.source
                .materialize(&source.primary, source.upstream.as_deref(), folder)
                .map_err(|e| Error::Fetch {
                    package: package.to_string(),
                    message: e.to_string(),
                })?;
            return Ok(FetchStatus::Cloned);
        }

        let actual = self.source.origin_url(folder).map_err(|e| Error::Fetch {
            package: package.to_string(),
            message: e.to_string(),
        })?;
        if !actual.as_deref().is_some_and(|url| same_remote(url, &source.primary)) {
            tracing::warn!(
                package,
                expected = %source.primary,
                actual = actual.as_deref().unwrap_or("<none>"),
                "Working copy origin differs from manifest"
            );
            return Ok(FetchStatus::Drifted { actual });
        }

        if offline {
            tracing::debug!(package, "Offline, using existing working copy");
            return Ok(FetchStatus::Offline);
        }

        match self.source.update(folder) {
            Ok(UpdateOutcome::UpToDate) => Ok(FetchStatus::UpToDate),
            Ok(UpdateOutcome::FastForwarded { .. }) => Ok(FetchStatus::Updated),
            Err(e) => {
                tracing::warn!(package, error = %e, "Update failed, using existing working copy");
                Ok(FetchStatus::Stale {
                    reason: e.to_string(),
                })
            }
        }
    }
}
