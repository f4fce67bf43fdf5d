//! Package installer: register, then compile runtime before design-time
//!
//! Paths are registered before the first compile so every artifact (and
//! every later package) sees them. A compile failure stops the package; what
//! already compiled stays registered and the package is reported partial.

use setup_fs::NormalizedPath;
use setup_manifest::{ArtifactKind, Installable, Options, PackageDefinition, TargetVersion};

use crate::compiler::{CompileRequest, Compiler};
use crate::registrar::{register_package, RegistrationReport};
use crate::resolver::{resolve, ResolvedArtifact};
use crate::store::{EnvironmentStore, PathList};
use crate::{Error, Result};

/// How far a package's install step got.
#[derive(Debug)]
pub enum InstallResult {
    /// Registered and every artifact compiled
    Installed {
        registration: RegistrationReport,
        compiled: Vec<String>,
    },
    /// Registered without compiling (`Installable=2`)
    PathOnly { registration: RegistrationReport },
    /// Not installable; fetched only
    FetchedOnly,
    /// Registered, some artifacts compiled, then one failed
    Partial {
        registration: RegistrationReport,
        compiled: Vec<String>,
        error: Error,
    },
    /// The target is not served; nothing was touched
    Unsupported(Error),
    Failed {
        registration: Option<RegistrationReport>,
        error: Error,
    },
}

/// Installs packages into one target environment.
pub struct PackageInstaller<'a> {
    compiler: &'a dyn Compiler,
    store: &'a mut dyn EnvironmentStore,
    options: &'a Options,
    target: TargetVersion,
}

impl<'a> PackageInstaller<'a> {
    pub fn new(
        compiler: &'a dyn Compiler,
        store: &'a mut dyn EnvironmentStore,
        options: &'a Options,
        target: TargetVersion,
    ) -> Self {
        Self {
            compiler,
            store,
            options,
            target,
        }
    }

    /// Install `package` from its working copy at `base_folder`.
    pub fn install(&mut self, package: &PackageDefinition, base_folder: &NormalizedPath) -> InstallResult {
        match package.installable {
            Installable::NotInstallable => {
                tracing::debug!(package = %package.name, "Not installable, fetched only");
                InstallResult::FetchedOnly
            }
            Installable::PathOnly => match register_package(&mut *self.store, package, base_folder) {
                Ok(registration) => InstallResult::PathOnly { registration },
                Err(error) => InstallResult::Failed {
                    registration: None,
                    error,
                },
            },
            Installable::Install => self.install_artifacts(package, base_folder),
        }
    }

    fn install_artifacts(&mut self, package: &PackageDefinition, base_folder: &NormalizedPath) -> InstallResult {
        let resolved = match resolve(self.options, package, self.target) {
            Ok(resolved) => resolved,
            Err(error) => {
                tracing::warn!(package = %package.name, error = %error, "Skipping package");
                return InstallResult::Unsupported(error);
            }
        };

        let registration = match register_package(&mut *self.store, package, base_folder) {
            Ok(registration) => registration,
            Err(error) => {
                return InstallResult::Failed {
                    registration: None,
                    error,
                };
            }
        };

        let mut compiled = Vec::new();
        for artifact in &resolved.artifacts {
            match self.compile_one(package, base_folder, artifact, resolved.lib_suffix.clone()) {
                Ok(()) => compiled.push(artifact.path.clone()),
                Err(error) if compiled.is_empty() => {
                    return InstallResult::Failed {
                        registration: Some(registration),
                        error,
                    };
                }
                Err(error) => {
                    return InstallResult::Partial {
                        registration,
                        compiled,
                        error,
                    };
                }
            }
        }

        InstallResult::Installed {
            registration,
            compiled,
        }
    }

    fn compile_one(
        &mut self,
        package: &PackageDefinition,
        base_folder: &NormalizedPath,
        artifact: &ResolvedArtifact,
        lib_suffix: Option<String>,
    ) -> Result<()> {
        let path = base_folder.join(&artifact.path);
        let request = CompileRequest {
            package: package.name.clone(),
            artifact: path.clone(),
            kind: artifact.kind,
            target: self.target,
            lib_suffix,
            search_paths: self.store.entries(PathList::Search)?,
            working_dir: base_folder.clone(),
        };

        tracing::info!(package = %package.name, artifact = %artifact.path, kind = %artifact.kind, "Compiling");
        let output = self.compiler.compile(&request)?;
        if !output.success {
            tracing::warn!(package = %package.name, artifact = %artifact.path, "Compile failed");
            return Err(Error::Compile {
                artifact: artifact.path.clone(),
                diagnostics: output.diagnostics.trim().to_string(),
            });
        }

        if artifact.kind == ArtifactKind::DesignTime {
            self.store.register(PathList::Package, &path)?;
        }
        Ok(())
    }
}
