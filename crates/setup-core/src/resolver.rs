//! Target resolver: which artifacts a package builds for a target version
//!
//! An exact `D<n>` entry always wins. Failing that, the nearest `D<m>+`
//! entry with `m <= n` serves the target. A plain `D<m>` entry never serves
//! any other version; there is no interpolation between listed versions.

use serde::Serialize;
use setup_manifest::{format_lib_suffix, ArtifactKind, Options, PackageDefinition, TargetVersion};

use crate::{Error, Result};

/// One artifact to compile, relative to the package folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedArtifact {
    pub path: String,
    pub kind: ArtifactKind,
}

/// Artifacts a package builds for one target, runtime first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTarget {
    pub target: TargetVersion,
    /// Manifest entry that served the target
    pub entry: Option<TargetVersion>,
    pub artifacts: Vec<ResolvedArtifact>,
    /// Rendered `LibSuffix`
    pub lib_suffix: Option<String>,
}

/// Fail when `target` is below the manifest's minimum supported version.
pub fn check_target(options: &Options, target: TargetVersion) -> Result<()> {
    match options.minimum_ide_version {
        Some(minimum) if target < minimum => Err(Error::Unsupported {
            target,
            reason: format!("below the minimum supported version {minimum}"),
        }),
        _ => Ok(()),
    }
}

/// Select the artifacts `package` builds for `target`.
///
/// A package that declares no artifacts for any version has nothing to build
/// and resolves to an empty list; one that declares artifacts, but none that
/// serve `target`, is `Unsupported`.
pub fn resolve(
    options: &Options,
    package: &PackageDefinition,
    target: TargetVersion,
) -> Result<ResolvedTarget> {
    check_target(options, target)?;

    let lib_suffix = package
        .lib_suffix
        .as_deref()
        .map(|template| format_lib_suffix(template, target));

    if package.artifacts.is_empty() {
        return Ok(ResolvedTarget {
            target,
            entry: None,
            artifacts: Vec::new(),
            lib_suffix,
        });
    }

    let (entry, declared) = match package.artifacts.get_key_value(&target) {
        Some((version, declared)) => (*version, declared),
        None => package
            .artifacts
            .range(..=target)
            .rev()
            .find(|(_, declared)| declared.at_least)
            .map(|(version, declared)| (*version, declared))
            .ok_or_else(|| Error::Unsupported {
                target,
                reason: format!("'{}' declares no artifacts for this version", package.name),
            })?,
    };

    tracing::debug!(package = %package.name, %target, %entry, "Resolved target entry");

    Ok(ResolvedTarget {
        target,
        entry: Some(entry),
        artifacts: runtime_first(&declared.artifacts),
        lib_suffix,
    })
}

/// Stable partition: runtime artifacts, then design-time, each in declared order.
fn runtime_first(artifacts: &[String]) -> Vec<ResolvedArtifact> {
    let classified = artifacts.iter().map(|path| ResolvedArtifact {
        path: path.clone(),
        kind: ArtifactKind::classify(path),
    });
    let (runtime, design): (Vec<_>, Vec<_>) =
        classified.partition(|a| a.kind == ArtifactKind::Runtime);
    runtime.into_iter().chain(design).collect()
}
