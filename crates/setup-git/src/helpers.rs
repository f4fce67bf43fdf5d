//! Shared git2 helper functions
//!
//! These encapsulate the fetch, fast-forward and push patterns used by the
//! working-copy updater, upstream sync and release tagging.

use std::path::Path;

use git2::{Oid, Repository};

use crate::{Error, Result};

/// Open the working copy at `path`.
pub fn open(path: &Path) -> Result<Repository> {
    Repository::open(path).map_err(|_| Error::NotARepository {
        path: path.to_path_buf(),
    })
}

/// Get the current branch name, failing on a detached HEAD.
pub fn current_branch(repo: &Repository) -> Result<String> {
    let head = repo.head()?;
    if head.is_branch()
        && let Some(name) = head.shorthand()
    {
        return Ok(name.to_string());
    }
    Err(Error::DetachedHead {
        path: repo.workdir().unwrap_or(repo.path()).to_path_buf(),
    })
}

/// URL of the named remote, or `None` if the remote does not exist.
pub fn remote_url(repo: &Repository, name: &str) -> Result<Option<String>> {
    match repo.find_remote(name) {
        Ok(remote) => Ok(remote.url().map(str::to_string)),
        Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Fetch `refspecs` from `remote_name`; an empty slice uses the remote's
/// configured refspecs.
pub fn fetch(repo: &Repository, remote_name: &str, refspecs: &[&str]) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    remote
        .fetch(refspecs, None, None)
        .map_err(|e| Error::FetchFailed {
            remote: remote_name.to_string(),
            message: e.message().to_string(),
        })?;

    tracing::debug!(remote = remote_name, "Fetched");
    Ok(())
}

/// Move `branch` to `target` and update the working tree.
///
/// The working tree is checked out first in safe mode so that local
/// modifications conflicting with the new commit abort the update instead of
/// being overwritten.
pub fn fast_forward(repo: &Repository, branch: &str, target: Oid) -> Result<()> {
    let commit = repo.find_commit(target)?;
    repo.checkout_tree(
        commit.as_object(),
        Some(git2::build::CheckoutBuilder::default().safe()),
    )
    .map_err(|e| Error::CannotFastForward {
        message: format!("Cannot update working tree of '{branch}': {}", e.message()),
    })?;

    let refname = format!("refs/heads/{branch}");
    let mut reference = repo.find_reference(&refname)?;
    reference.set_target(target, &format!("fast-forward to {target}"))?;
    Ok(())
}

/// Push `refspec` to `remote_name`.
pub fn push(repo: &Repository, remote_name: &str, refspec: &str) -> Result<()> {
    let mut remote = repo
        .find_remote(remote_name)
        .map_err(|_| Error::RemoteNotFound {
            name: remote_name.to_string(),
        })?;

    remote
        .push(&[refspec], None)
        .map_err(|e| Error::PushFailed {
            remote: remote_name.to_string(),
            message: e.message().to_string(),
        })?;

    tracing::info!(remote = remote_name, refspec, "Pushed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_with_commit(path: &Path) -> Repository {
        let repo = Repository::init(path).unwrap();
        {
            let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "Initial", &tree, &[])
                .unwrap();
        }
        repo
    }

    #[test]
    fn test_current_branch_on_default_branch() {
        let temp = TempDir::new().unwrap();
        let repo = repo_with_commit(temp.path());

        let branch = current_branch(&repo).unwrap();
        assert!(branch == "main" || branch == "master");
    }

    #[test]
    fn test_current_branch_detached() {
        let temp = TempDir::new().unwrap();
        let repo = repo_with_commit(temp.path());
        let head = repo.head().unwrap().target().unwrap();
        repo.set_head_detached(head).unwrap();

        assert!(matches!(current_branch(&repo), Err(Error::DetachedHead { .. })));
    }

    #[test]
    fn test_remote_url_missing_remote() {
        let temp = TempDir::new().unwrap();
        let repo = repo_with_commit(temp.path());
        assert_eq!(remote_url(&repo, "origin").unwrap(), None);

        repo.remote("origin", "https://example.com/a.git").unwrap();
        assert_eq!(
            remote_url(&repo, "origin").unwrap().as_deref(),
            Some("https://example.com/a.git")
        );
    }

    #[test]
    fn test_fetch_unknown_remote() {
        let temp = TempDir::new().unwrap();
        let repo = repo_with_commit(temp.path());
        let err = fetch(&repo, "upstream", &[]).unwrap_err();
        assert!(err.to_string().contains("upstream"));
    }

    #[test]
    fn test_open_non_repository() {
        let temp = TempDir::new().unwrap();
        assert!(matches!(open(temp.path()), Err(Error::NotARepository { .. })));
    }
}
