//! Search-path registrar
//!
//! Resolves a package's search and include paths against its folder and
//! registers the ones that exist. Missing directories are reported, never
//! registered, and never fatal.

use serde::Serialize;
use setup_fs::NormalizedPath;
use setup_manifest::{expand_base_folder, PackageDefinition};

use crate::store::{EnvironmentStore, PathList};
use crate::Result;

/// One path the registrar will act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    pub list: PathList,
    pub path: NormalizedPath,
}

/// Outcome of registering one package's paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistrationReport {
    /// Newly added entries
    pub added: Vec<PathEntry>,
    /// Entries that were already registered
    pub existing: Vec<PathEntry>,
    /// Entries whose directory does not exist
    pub missing: Vec<PathEntry>,
}

/// Absolute search and include paths of `package` rooted at `base_folder`,
/// search paths first, each in declared order.
///
/// An empty search path is the package folder itself. Include paths have
/// `$BaseFolder` expanded; relative ones are taken relative to the folder.
pub fn package_paths(package: &PackageDefinition, base_folder: &NormalizedPath) -> Vec<PathEntry> {
    let search = package.search_paths.iter().map(|entry| PathEntry {
        list: PathList::Search,
        path: base_folder.join(entry),
    });
    let include = package.include_paths.iter().map(|entry| PathEntry {
        list: PathList::Include,
        path: NormalizedPath::new(expand_base_folder(entry, base_folder.as_str()))
            .resolve_against(base_folder),
    });
    search.chain(include).collect()
}

/// Register `package`'s paths into `store`.
pub fn register_package(
    store: &mut dyn EnvironmentStore,
    package: &PackageDefinition,
    base_folder: &NormalizedPath,
) -> Result<RegistrationReport> {
    let mut report = RegistrationReport::default();

    for entry in package_paths(package, base_folder) {
        if !entry.path.is_dir() {
            tracing::warn!(
                package = %package.name,
                list = %entry.list,
                path = %entry.path,
                "Directory does not exist, not registering"
            );
            report.missing.push(entry);
            continue;
        }

        if store.register(entry.list, &entry.path)? {
            report.added.push(entry);
        } else {
            tracing::debug!(path = %entry.path, "Already registered");
            report.existing.push(entry);
        }
    }

    Ok(report)
}
