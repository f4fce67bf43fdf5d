//! Loaded manifest plus everything derived from it for one command

use std::path::Path;

use setup_core::RunContext;
use setup_fs::NormalizedPath;
use setup_manifest::{Manifest, PackageDefinition, TargetVersion};

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};
use crate::settings::LoadedSettings;

pub struct Session {
    pub manifest_path: NormalizedPath,
    pub manifest: Manifest,
    pub settings: LoadedSettings,
}

impl Session {
    /// Parse the manifest and load the settings that go with it.
    pub fn load(manifest: &Path, config: Option<&Path>) -> Result<Self> {
        let manifest_path = NormalizedPath::new(manifest).absolutize()?;
        let parsed = Manifest::load(&manifest_path)?;
        let settings = LoadedSettings::locate(config, &manifest_dir(&manifest_path))?;
        Ok(Self {
            manifest_path,
            manifest: parsed,
            settings,
        })
    }

    pub fn manifest_dir(&self) -> NormalizedPath {
        manifest_dir(&self.manifest_path)
    }

    /// `--target`, else the manifest's `DefaultIDE`.
    pub fn target(&self, flag: Option<TargetVersion>) -> Result<TargetVersion> {
        flag.or(self.manifest.options.default_ide)
            .ok_or(CliError::NoTarget)
    }

    /// `--root`, else `DefaultDestFolder`, else the manifest's folder.
    ///
    /// Relative roots from the command line are taken from the current
    /// directory; a relative `DefaultDestFolder` from the manifest's folder.
    pub fn root(&self, flag: Option<&Path>) -> Result<NormalizedPath> {
        match (flag, &self.manifest.options.default_dest_folder) {
            (Some(root), _) => Ok(NormalizedPath::new(root).absolutize()?),
            (None, Some(folder)) => Ok(NormalizedPath::new(folder)
                .resolve_against(&self.manifest_dir())
                .absolutize()?),
            (None, None) => Ok(self.manifest_dir()),
        }
    }

    /// Packages matching `filter` in manifest order; all when empty.
    pub fn select(&self, filter: &[String]) -> Result<Vec<&PackageDefinition>> {
        let (selected, unmatched) = self.manifest.select(filter);
        if !unmatched.is_empty() {
            return Err(setup_core::Error::UnknownPackages { names: unmatched }.into());
        }
        Ok(selected)
    }

    /// Run context for `args`; other flags are layered on by the caller.
    pub fn context(&self, args: &TargetArgs) -> Result<RunContext> {
        let target = self.target(args.target)?;
        let root = self.root(args.root.as_deref())?;
        tracing::debug!(target = %target, root = %root, "Resolved run context");
        Ok(RunContext::new(root, target).with_packages(args.packages.clone()))
    }
}

fn manifest_dir(manifest_path: &NormalizedPath) -> NormalizedPath {
    manifest_path
        .parent()
        .unwrap_or_else(|| NormalizedPath::new("."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn session(text: &str) -> (TempDir, Session) {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Setup.ini");
        fs::write(&path, text).unwrap();
        let session = Session::load(&path, None).unwrap();
        (temp, session)
    }

    #[test]
    fn target_falls_back_to_default_ide() {
        let (_temp, session) = session("[Options]\nDefaultIDE=D28\n");
        assert_eq!(session.target(None).unwrap(), TargetVersion::new(28));
        assert_eq!(
            session.target(Some(TargetVersion::new(29))).unwrap(),
            TargetVersion::new(29)
        );
    }

    #[test]
    fn missing_target_is_an_error() {
        let (_temp, session) = session("");
        assert!(matches!(session.target(None), Err(CliError::NoTarget)));
    }

    #[test]
    fn relative_dest_folder_is_anchored_at_the_manifest() {
        let (temp, session) = session("[Options]\nDefaultDestFolder=components\n");
        assert_eq!(
            session.root(None).unwrap(),
            NormalizedPath::new(temp.path()).absolutize().unwrap().join("components")
        );
    }

    #[test]
    fn dest_folder_with_parent_segments_matches_explicit_root() {
        let (temp, session) = session("[Options]\nDefaultDestFolder=sub\\..\\components\n");
        fs::create_dir(temp.path().join("components")).unwrap();
        assert_eq!(
            session.root(None).unwrap(),
            session.root(Some(&temp.path().join("components"))).unwrap()
        );
    }

    #[test]
    fn unknown_filter_is_rejected() {
        let (_temp, session) = session("[P]\nName=Alpha\nGit=g\nFolder=A\n");
        assert_eq!(session.select(&["alpha".into()]).unwrap().len(), 1);
        let err = session.select(&["Beta".into()]).unwrap_err();
        assert_eq!(err.exit_code(), crate::error::EXIT_PARSE);
    }

    #[test]
    fn manifest_folder_is_the_last_resort_root() {
        let (_temp, session) = session("");
        assert_eq!(session.root(None).unwrap(), session.manifest_dir());
    }
}
