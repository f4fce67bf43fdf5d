//! Working-copy materialization behind a collaborator trait

use git2::build::RepoBuilder;
use setup_fs::NormalizedPath;

use crate::helpers;
use crate::{Error, Result};

/// Name of the remote a working copy is cloned from
pub const ORIGIN: &str = "origin";
/// Name of the remote recording where a fork came from
pub const UPSTREAM: &str = "upstream";

/// Result of updating an existing working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate,
    FastForwarded { from: String, to: String },
}

/// Version-control operations the installer depends on.
///
/// Implementations must be shareable across the fetch worker pool.
pub trait SourceControl: Send + Sync {
    /// Whether `path` holds a working copy.
    fn is_working_copy(&self, path: &NormalizedPath) -> bool;

    /// Create a working copy of `primary` at `path`, recording `upstream`
    /// as a secondary remote when given.
    fn materialize(&self, primary: &str, upstream: Option<&str>, path: &NormalizedPath) -> Result<()>;

    /// Bring the working copy at `path` up to date with its origin.
    fn update(&self, path: &NormalizedPath) -> Result<UpdateOutcome>;

    /// URL the working copy was cloned from.
    fn origin_url(&self, path: &NormalizedPath) -> Result<Option<String>>;
}

/// git2-backed [`SourceControl`].
#[derive(Debug, Clone, Default)]
pub struct GitSource;

impl GitSource {
    pub fn new() -> Self {
        Self
    }
}

impl SourceControl for GitSource {
    fn is_working_copy(&self, path: &NormalizedPath) -> bool {
        git2::Repository::open(path.to_native()).is_ok()
    }

    fn materialize(&self, primary: &str, upstream: Option<&str>, path: &NormalizedPath) -> Result<()> {
        let native = path.to_native();
        if native.exists() {
            let occupied = std::fs::read_dir(&native)
                .map_err(|e| setup_fs::Error::io(&native, e))?
                .next()
                .is_some();
            if occupied {
                return Err(Error::DestinationOccupied { path: native });
            }
        } else if let Some(parent) = native.parent() {
            std::fs::create_dir_all(parent).map_err(|e| setup_fs::Error::io(parent, e))?;
        }

        tracing::info!(url = primary, path = %path, "Cloning");
        let repo = RepoBuilder::new()
            .clone(primary, &native)
            .map_err(|e| Error::CloneFailed {
                url: primary.to_string(),
                message: e.message().to_string(),
            })?;

        if let Some(upstream) = upstream
            && helpers::remote_url(&repo, UPSTREAM)?.is_none()
        {
            repo.remote(UPSTREAM, upstream)?;
            tracing::debug!(url = upstream, "Added upstream remote");
        }

        Ok(())
    }

    fn update(&self, path: &NormalizedPath) -> Result<UpdateOutcome> {
        let repo = helpers::open(&path.to_native())?;
        let branch = helpers::current_branch(&repo)?;

        helpers::fetch(&repo, ORIGIN, &[branch.as_str()])?;

        let fetch_head = repo
            .find_reference("FETCH_HEAD")
            .map_err(|e| Error::FetchFailed {
                remote: ORIGIN.to_string(),
                message: format!("Could not find FETCH_HEAD: {}", e.message()),
            })?;
        let fetch_commit = fetch_head.peel_to_commit()?;
        let head_commit = repo.head()?.peel_to_commit()?;

        let (analysis, _) =
            repo.merge_analysis(&[&repo.find_annotated_commit(fetch_commit.id())?])?;

        if analysis.is_up_to_date() {
            return Ok(UpdateOutcome::UpToDate);
        }

        if analysis.is_fast_forward() {
            helpers::fast_forward(&repo, &branch, fetch_commit.id())?;
            tracing::info!(path = %path, to = %fetch_commit.id(), "Fast-forwarded");
            return Ok(UpdateOutcome::FastForwarded {
                from: head_commit.id().to_string(),
                to: fetch_commit.id().to_string(),
            });
        }

        Err(Error::CannotFastForward {
            message: format!(
                "Cannot fast-forward {branch} from {} to {}. Manual merge required.",
                head_commit.id(),
                fetch_commit.id()
            ),
        })
    }

    fn origin_url(&self, path: &NormalizedPath) -> Result<Option<String>> {
        let repo = helpers::open(&path.to_native())?;
        helpers::remote_url(&repo, ORIGIN)
    }
}

/// Whether two remote locations name the same repository.
///
/// A trailing `/` or `.git` and the path separator style are ignored.
pub fn same_remote(a: &str, b: &str) -> bool {
    fn canonical(url: &str) -> String {
        let url = url.trim().replace('\\', "/");
        let url = url.trim_end_matches('/');
        url.strip_suffix(".git").unwrap_or(url).to_string()
    }
    canonical(a) == canonical(b)
}
