//! Manifest data model

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::ParseError;

/// A normalized IDE release identifier.
///
/// Manifests spell it `D29`, the options section may use a bare `29`;
/// both normalize to the same value and display as `D29`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub struct TargetVersion(u16);

impl TargetVersion {
    pub const fn new(number: u16) -> Self {
        Self(number)
    }

    /// The bare version number, as substituted into `LibSuffix`.
    pub fn number(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

impl From<TargetVersion> for String {
    fn from(version: TargetVersion) -> Self {
        version.to_string()
    }
}

impl FromStr for TargetVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('D')
            .or_else(|| trimmed.strip_prefix('d'))
            .unwrap_or(trimmed);
        digits
            .parse::<u16>()
            .map(Self)
            .map_err(|_| format!("invalid target version '{trimmed}'"))
    }
}

/// Where a package's sources come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    /// Repository the working copy is cloned from (`origin`)
    pub primary: String,
    /// Repository the primary was forked from; provenance and sync only
    pub upstream: Option<String>,
}

/// Whether and how a package is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Installable {
    /// Fetch only
    NotInstallable,
    /// Register paths and compile artifacts
    #[default]
    Install,
    /// Register paths without compiling
    PathOnly,
}

impl Installable {
    /// Manifest encoding (`0`, `1`, `2`).
    pub fn code(&self) -> u8 {
        match self {
            Self::NotInstallable => 0,
            Self::Install => 1,
            Self::PathOnly => 2,
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "0" => Some(Self::NotInstallable),
            "1" => Some(Self::Install),
            "2" => Some(Self::PathOnly),
            _ => None,
        }
    }
}

/// Runtime or design-time build artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactKind {
    Runtime,
    DesignTime,
}

impl ArtifactKind {
    /// Classify an artifact path by its file name.
    ///
    /// Design-time packages are conventionally named `dcl*` or end in
    /// `Design`, `DT` or `_D`; everything else is a runtime package.
    pub fn classify(artifact: &str) -> Self {
        let stem = setup_fs::NormalizedPath::new(artifact)
            .file_stem()
            .unwrap_or_default()
            .to_string();
        let lower = stem.to_ascii_lowercase();
        if lower.starts_with("dcl")
            || lower.ends_with("design")
            || lower.ends_with("_d")
            || stem.ends_with("DT")
        {
            Self::DesignTime
        } else {
            Self::Runtime
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Runtime => write!(f, "runtime"),
            Self::DesignTime => write!(f, "design-time"),
        }
    }
}

/// Artifacts declared for one target version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetArtifacts {
    /// Declared as `D<n>+`: also serves later versions without their own entry
    pub at_least: bool,
    /// Artifact paths relative to the package folder, in declared order
    pub artifacts: Vec<String>,
}

/// The kind of a post-install action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    Copy,
    CopyAndRun,
    Delete,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Copy => "Copy",
            Self::CopyAndRun => "CopyAndRun",
            Self::Delete => "Delete",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "copy" => Ok(Self::Copy),
            "copyandrun" => Ok(Self::CopyAndRun),
            "delete" => Ok(Self::Delete),
            other => Err(format!(
                "unknown action '{other}' (expected Copy, CopyAndRun or Delete)"
            )),
        }
    }
}

/// One post-install side effect, in declared order.
///
/// Origins and destinations may reference `$BaseFolder`, expanded to the
/// package's resolved folder when the action runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
pub enum ExecuteEntry {
    Copy { origin: String, destination: String },
    CopyAndRun { origin: String, destination: String },
    Delete { origin: String },
}

impl ExecuteEntry {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Copy { .. } => ActionKind::Copy,
            Self::CopyAndRun { .. } => ActionKind::CopyAndRun,
            Self::Delete { .. } => ActionKind::Delete,
        }
    }

    pub fn origin(&self) -> &str {
        match self {
            Self::Copy { origin, .. } | Self::CopyAndRun { origin, .. } | Self::Delete { origin } => {
                origin
            }
        }
    }

    pub fn destination(&self) -> Option<&str> {
        match self {
            Self::Copy { destination, .. } | Self::CopyAndRun { destination, .. } => {
                Some(destination)
            }
            Self::Delete { .. } => None,
        }
    }
}

/// One installable component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDefinition {
    /// Section header the package was declared under
    pub section: String,
    pub name: String,
    pub source: SourceRef,
    /// Relative to the components root
    pub folder: String,
    /// Relative to `folder`; `""` is the folder itself
    pub search_paths: Vec<String>,
    /// Absolute or `$BaseFolder`-relative include directories
    pub include_paths: Vec<String>,
    pub artifacts: BTreeMap<TargetVersion, TargetArtifacts>,
    pub installable: Installable,
    pub lib_suffix: Option<String>,
    /// Presentation grouping only; never affects install order
    pub group_index: Option<u32>,
    pub execute: Vec<ExecuteEntry>,
}

impl PackageDefinition {
    /// Whether `query` names this package (section or display name).
    pub fn matches(&self, query: &str) -> bool {
        self.section.eq_ignore_ascii_case(query) || self.name.eq_ignore_ascii_case(query)
    }
}

/// Process-wide options from the `[Options]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Options {
    pub minimum_ide_version: Option<TargetVersion>,
    /// Default components root
    pub default_dest_folder: Option<String>,
    /// Default target version
    pub default_ide: Option<TargetVersion>,
    pub auto_start: bool,
}

impl Options {
    /// Installation may start without confirmation.
    pub fn should_auto_start(&self) -> bool {
        self.auto_start && self.default_ide.is_some() && self.default_dest_folder.is_some()
    }

    /// Whether `target` is at or above the manifest's minimum version.
    pub fn supports(&self, target: TargetVersion) -> bool {
        self.minimum_ide_version.is_none_or(|minimum| target >= minimum)
    }
}

/// A parsed manifest: global options plus packages in install order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub options: Options,
    pub packages: Vec<PackageDefinition>,
}

impl Manifest {
    /// Parse manifest text.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        crate::parser::parse(text)
    }

    /// Find a package by section or display name.
    pub fn package(&self, query: &str) -> Option<&PackageDefinition> {
        self.packages.iter().find(|p| p.matches(query))
    }

    /// Select packages matching any of `queries`, keeping manifest order.
    ///
    /// An empty filter selects every package. Queries that match nothing
    /// are returned separately so callers can report them.
    pub fn select<'a>(&'a self, queries: &[String]) -> (Vec<&'a PackageDefinition>, Vec<String>) {
        if queries.is_empty() {
            return (self.packages.iter().collect(), Vec::new());
        }
        let selected = self
            .packages
            .iter()
            .filter(|p| queries.iter().any(|q| p.matches(q)))
            .collect();
        let unmatched = queries
            .iter()
            .filter(|q| !self.packages.iter().any(|p| p.matches(q)))
            .cloned()
            .collect();
        (selected, unmatched)
    }

    /// Packages grouped by `GroupIndex` for display.
    ///
    /// Ungrouped packages come first; within a group manifest order is kept.
    pub fn groups(&self) -> BTreeMap<Option<u32>, Vec<&PackageDefinition>> {
        let mut groups: BTreeMap<Option<u32>, Vec<&PackageDefinition>> = BTreeMap::new();
        for package in &self.packages {
            groups.entry(package.group_index).or_default().push(package);
        }
        groups
    }
}
