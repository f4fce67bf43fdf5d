//! Fast-forwarding forks from the repositories they were forked from

use std::fmt;

use git2::Repository;
use setup_fs::NormalizedPath;

use crate::helpers;
use crate::source::{ORIGIN, UPSTREAM};
use crate::Result;

/// Where a working copy stands relative to its upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// The working copy does not exist
    Missing,
    /// No `upstream` remote is configured
    NoUpstream,
    /// Upstream has no branch named like the current one
    NoUpstreamBranch { branch: String },
    /// Already at the upstream commit
    UpToDate { branch: String },
    /// Upstream is ahead and the branch can be fast-forwarded (dry run)
    FastForwardable { branch: String },
    /// Fast-forwarded to upstream and pushed to origin
    FastForwarded { branch: String },
    /// Local commits that upstream does not have
    Ahead { branch: String },
    Diverged { branch: String },
}

impl SyncStatus {
    /// Short label used to group statuses in reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NoUpstream => "no upstream",
            Self::NoUpstreamBranch { .. } => "no upstream branch",
            Self::UpToDate { .. } => "up to date",
            Self::FastForwardable { .. } => "fast-forwardable",
            Self::FastForwarded { .. } => "fast-forwarded",
            Self::Ahead { .. } => "ahead",
            Self::Diverged { .. } => "diverged",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing | Self::NoUpstream => f.write_str(self.label()),
            Self::NoUpstreamBranch { branch }
            | Self::UpToDate { branch }
            | Self::FastForwardable { branch }
            | Self::FastForwarded { branch }
            | Self::Ahead { branch }
            | Self::Diverged { branch } => write!(f, "{} ({branch})", self.label()),
        }
    }
}

/// Compare the working copy at `path` with `upstream/<current branch>` and
/// fast-forward it when upstream is strictly ahead.
///
/// A fast-forwarded branch is pushed to `origin` so the fork catches up too.
/// With `dry_run` the remote is still fetched but nothing local changes.
pub fn sync_with_upstream(path: &NormalizedPath, dry_run: bool) -> Result<SyncStatus> {
    if !path.is_dir() {
        return Ok(SyncStatus::Missing);
    }

    let repo = helpers::open(&path.to_native())?;
    if helpers::remote_url(&repo, UPSTREAM)?.is_none() {
        return Ok(SyncStatus::NoUpstream);
    }

    helpers::fetch(&repo, UPSTREAM, &[])?;
    let branch = helpers::current_branch(&repo)?;

    let Some(upstream_oid) = upstream_tip(&repo, &branch)? else {
        return Ok(SyncStatus::NoUpstreamBranch { branch });
    };
    let head_oid = repo.head()?.peel_to_commit()?.id();

    if head_oid == upstream_oid {
        return Ok(SyncStatus::UpToDate { branch });
    }

    let base = match repo.merge_base(head_oid, upstream_oid) {
        Ok(base) => base,
        Err(e) if e.code() == git2::ErrorCode::NotFound => {
            return Ok(SyncStatus::Diverged { branch });
        }
        Err(e) => return Err(e.into()),
    };

    if base == head_oid {
        if dry_run {
            return Ok(SyncStatus::FastForwardable { branch });
        }
        helpers::fast_forward(&repo, &branch, upstream_oid)?;
        helpers::push(&repo, ORIGIN, &format!("refs/heads/{branch}:refs/heads/{branch}"))?;
        tracing::info!(path = %path, branch = %branch, "Fast-forwarded from upstream");
        return Ok(SyncStatus::FastForwarded { branch });
    }

    if base == upstream_oid {
        Ok(SyncStatus::Ahead { branch })
    } else {
        Ok(SyncStatus::Diverged { branch })
    }
}

fn upstream_tip(repo: &Repository, branch: &str) -> Result<Option<git2::Oid>> {
    match repo.find_reference(&format!("refs/remotes/{UPSTREAM}/{branch}")) {
        Ok(reference) => Ok(Some(reference.peel_to_commit()?.id())),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_folder() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = NormalizedPath::new(temp.path()).join("absent");
        assert_eq!(sync_with_upstream(&path, true).unwrap(), SyncStatus::Missing);
    }

    #[test]
    fn test_display_includes_branch() {
        let status = SyncStatus::Diverged {
            branch: "main".into(),
        };
        assert_eq!(status.to_string(), "diverged (main)");
        assert_eq!(SyncStatus::NoUpstream.to_string(), "no upstream");
    }
}
