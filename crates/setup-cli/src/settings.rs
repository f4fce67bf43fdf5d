//! Installer settings (`setup.toml`)
//!
//! Looked up as `--config <path>`, else `setup.toml` next to the manifest,
//! else built-in defaults. JSON and YAML work too; the format follows the
//! file extension.

use std::path::Path;

use serde::Deserialize;
use setup_core::{FileEnvironmentStore, DEFAULT_JOBS};
use setup_fs::NormalizedPath;

use crate::error::Result;

/// File name looked up next to the manifest
pub const SETTINGS_FILE: &str = "setup.toml";

/// Compiler command used when neither settings nor flags provide one
pub const DEFAULT_COMPILER_COMMAND: &str =
    "msbuild \"{artifact}\" /t:Build /p:DCC_UnitSearchPath=\"{search_path}\" /p:DllSuffix={suffix}";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub compiler: CompilerSettings,
    pub store: StoreSettings,
    pub fetch: FetchSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompilerSettings {
    /// Template with `{artifact}` `{suffix}` `{target}` `{search_path}` `{package}`
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// Directory holding one `D<n>.toml` per target
    pub dir: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchSettings {
    pub jobs: Option<usize>,
    pub offline: bool,
}

/// Settings plus the directory relative settings paths are resolved against.
#[derive(Debug, Clone)]
pub struct LoadedSettings {
    pub settings: Settings,
    pub base: NormalizedPath,
}

impl LoadedSettings {
    /// Load from `explicit`, else from `setup.toml` in `manifest_dir`.
    pub fn locate(explicit: Option<&Path>, manifest_dir: &NormalizedPath) -> Result<Self> {
        let (path, settings) = match explicit {
            Some(path) => {
                let path = NormalizedPath::new(path).absolutize()?;
                let settings: Settings = setup_fs::load_settings(&path)?;
                (path, settings)
            }
            None => {
                let path = manifest_dir.join(SETTINGS_FILE);
                let settings: Settings = setup_fs::load_settings_or_default(&path)?;
                (path, settings)
            }
        };
        tracing::debug!(path = %path, ?settings, "Loaded settings");
        let base = path.parent().unwrap_or_else(|| manifest_dir.clone());
        Ok(Self { settings, base })
    }

    pub fn compiler_command(&self, flag: Option<&str>) -> String {
        flag.or(self.settings.compiler.command.as_deref())
            .unwrap_or(DEFAULT_COMPILER_COMMAND)
            .to_string()
    }

    pub fn jobs(&self, flag: Option<usize>) -> usize {
        flag.or(self.settings.fetch.jobs).unwrap_or(DEFAULT_JOBS)
    }

    /// Directory of the per-target environment stores.
    ///
    /// Relative settings are resolved against the settings file's folder;
    /// without a setting, the per-user data directory is used, falling back
    /// to `.setup/environment` next to the settings.
    pub fn store_dir(&self) -> NormalizedPath {
        match &self.settings.store.dir {
            Some(dir) => NormalizedPath::new(dir).resolve_against(&self.base),
            None => FileEnvironmentStore::default_dir()
                .unwrap_or_else(|| self.base.join(".setup/environment")),
        }
    }
}
