//! Immutable per-run settings passed to every component

use setup_fs::NormalizedPath;
use setup_manifest::{PackageDefinition, TargetVersion};

use crate::cancel::CancelToken;

/// Default size of the fetch worker pool
pub const DEFAULT_JOBS: usize = 4;

/// Everything a run needs to know besides the manifest itself.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Absolute components root; package folders are relative to it
    pub root: NormalizedPath,
    pub target: TargetVersion,
    /// Treat configuration drift as a package failure
    pub strict: bool,
    /// Never contact remotes; use existing working copies as they are
    pub offline: bool,
    /// Upper bound on concurrent fetches
    pub jobs: usize,
    /// Section or package names to install; empty means all
    pub packages: Vec<String>,
    pub cancel: CancelToken,
}

impl RunContext {
    pub fn new(root: NormalizedPath, target: TargetVersion) -> Self {
        Self {
            root,
            target,
            strict: false,
            offline: false,
            jobs: DEFAULT_JOBS,
            packages: Vec::new(),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn with_packages(mut self, packages: Vec<String>) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Resolved folder of a package's working copy (`$BaseFolder`).
    pub fn package_folder(&self, package: &PackageDefinition) -> NormalizedPath {
        self.root.join(&package.folder)
    }
}
