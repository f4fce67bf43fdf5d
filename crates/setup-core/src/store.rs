//! Target environment configuration store
//!
//! The installer only needs two operations from the IDE's persisted
//! settings: "is this path registered?" and "register this path". Each target
//! version has its own store; [`FileEnvironmentStore`] persists one as TOML.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use setup_fs::NormalizedPath;
use setup_manifest::TargetVersion;

use crate::{Error, Result};

/// Which registration list an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathList {
    /// Library search path
    Search,
    Include,
    /// Installed design-time packages
    Package,
}

impl fmt::Display for PathList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search => write!(f, "search path"),
            Self::Include => write!(f, "include path"),
            Self::Package => write!(f, "design package"),
        }
    }
}

/// Registration queries against one target environment.
///
/// Registration is idempotent and ordered: the first registration of a path
/// fixes its position, later ones are no-ops.
pub trait EnvironmentStore: Send {
    fn is_registered(&self, list: PathList, path: &NormalizedPath) -> Result<bool>;

    /// Append `path` to `list` unless present. Returns whether it was added.
    fn register(&mut self, list: PathList, path: &NormalizedPath) -> Result<bool>;

    /// Entries of `list` in registration order.
    fn entries(&self, list: PathList) -> Result<Vec<NormalizedPath>>;
}

/// Persisted registration lists for one target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub search_paths: Vec<String>,
    #[serde(default)]
    pub include_paths: Vec<String>,
    #[serde(default)]
    pub packages: Vec<String>,
}

impl EnvironmentState {
    fn list(&self, list: PathList) -> &Vec<String> {
        match list {
            PathList::Search => &self.search_paths,
            PathList::Include => &self.include_paths,
            PathList::Package => &self.packages,
        }
    }

    fn list_mut(&mut self, list: PathList) -> &mut Vec<String> {
        match list {
            PathList::Search => &mut self.search_paths,
            PathList::Include => &mut self.include_paths,
            PathList::Package => &mut self.packages,
        }
    }

    fn contains(&self, list: PathList, path: &NormalizedPath) -> bool {
        self.list(list).iter().any(|entry| entry == path.as_str())
    }

    /// Append unless present; returns whether it was added.
    fn insert(&mut self, list: PathList, path: &NormalizedPath) -> bool {
        if self.contains(list, path) {
            return false;
        }
        self.list_mut(list).push(path.as_str().to_string());
        true
    }

    fn paths(&self, list: PathList) -> Vec<NormalizedPath> {
        self.list(list).iter().map(NormalizedPath::new).collect()
    }
}

/// TOML-backed store at `<dir>/D<n>.toml`, rewritten atomically on every
/// new registration.
#[derive(Debug)]
pub struct FileEnvironmentStore {
    path: NormalizedPath,
    state: EnvironmentState,
}

impl FileEnvironmentStore {
    /// Open (or start) the store for `target` under `dir`.
    pub fn open(dir: &NormalizedPath, target: TargetVersion) -> Result<Self> {
        let path = dir.join(&format!("{target}.toml"));
        let mut state = if path.is_file() {
            let text = setup_fs::io::read_text(&path)?;
            toml::from_str::<EnvironmentState>(&text).map_err(|e| Error::Store {
                path: path.to_native(),
                message: e.to_string(),
            })?
        } else {
            EnvironmentState::default()
        };
        state.target.get_or_insert_with(|| target.to_string());
        tracing::debug!(path = %path, "Opened environment store");
        Ok(Self { path, state })
    }

    fn save(&self) -> Result<()> {
        let text = toml::to_string_pretty(&self.state).map_err(|e| Error::Store {
            path: self.path.to_native(),
            message: e.to_string(),
        })?;
        setup_fs::io::write_text(&self.path, &text)?;
        Ok(())
    }

    /// Per-user default store directory.
    pub fn default_dir() -> Option<NormalizedPath> {
        dirs::data_dir().map(|dir| NormalizedPath::new(dir).join("component-setup/environment"))
    }

    pub fn path(&self) -> &NormalizedPath {
        &self.path
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }
}

impl EnvironmentStore for FileEnvironmentStore {
    fn is_registered(&self, list: PathList, path: &NormalizedPath) -> Result<bool> {
        Ok(self.state.contains(list, path))
    }

    fn register(&mut self, list: PathList, path: &NormalizedPath) -> Result<bool> {
        if !self.state.insert(list, path) {
            return Ok(false);
        }
        self.state.updated = Some(Utc::now());
        self.save()?;
        tracing::info!(%list, path = %path, "Registered");
        Ok(true)
    }

    fn entries(&self, list: PathList) -> Result<Vec<NormalizedPath>> {
        Ok(self.state.paths(list))
    }
}

/// Store that lives only for the process, for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnvironmentStore {
    state: EnvironmentState,
}

impl MemoryEnvironmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EnvironmentState {
        &self.state
    }
}

impl EnvironmentStore for MemoryEnvironmentStore {
    fn is_registered(&self, list: PathList, path: &NormalizedPath) -> Result<bool> {
        Ok(self.state.contains(list, path))
    }

    fn register(&mut self, list: PathList, path: &NormalizedPath) -> Result<bool> {
        Ok(self.state.insert(list, path))
    }

    fn entries(&self, list: PathList) -> Result<Vec<NormalizedPath>> {
        Ok(self.state.paths(list))
    }
}
