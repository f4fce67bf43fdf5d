//! Action runner: post-install `Copy`, `CopyAndRun` and `Delete`
//!
//! Actions run strictly in declared order and each is reported on its own; a
//! failed action never stops the ones after it.

use serde::Serialize;
use setup_fs::{copy_path, remove_path, CopyOutcome, NormalizedPath, RobustnessConfig};
use setup_manifest::{expand_base_folder, ActionKind, ExecuteEntry};

use crate::process::{program_command, run_captured};
use crate::{Error, Result};

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "kebab-case")]
pub enum ActionEffect {
    Copied { target: NormalizedPath },
    /// Destination already held identical content
    Unchanged { target: NormalizedPath },
    /// Copied and executed successfully
    Ran { target: NormalizedPath },
    Deleted { path: NormalizedPath },
    /// Nothing existed at the path
    AlreadyAbsent { path: NormalizedPath },
}

/// Result of one action, by 1-based declared index.
#[derive(Debug)]
pub struct ActionReport {
    pub index: usize,
    pub kind: ActionKind,
    pub result: Result<ActionEffect>,
}

impl ActionReport {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Expand `$BaseFolder` in an action path and anchor relative results at
/// `base_folder`.
pub fn resolve_location(raw: &str, base_folder: &NormalizedPath) -> NormalizedPath {
    NormalizedPath::new(expand_base_folder(raw, base_folder.as_str())).resolve_against(base_folder)
}

#[derive(Debug, Clone, Default)]
pub struct ActionRunner {
    robustness: RobustnessConfig,
}

impl ActionRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_robustness(robustness: RobustnessConfig) -> Self {
        Self { robustness }
    }

    /// Run every entry in order, reporting each independently.
    pub fn run_all(&self, entries: &[ExecuteEntry], base_folder: &NormalizedPath) -> Vec<ActionReport> {
        entries
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let result = self.run(entry, base_folder);
                match &result {
                    Ok(effect) => tracing::info!(index = idx + 1, action = %entry.kind(), ?effect, "Action done"),
                    Err(e) => tracing::warn!(index = idx + 1, action = %entry.kind(), error = %e, "Action failed"),
                }
                ActionReport {
                    index: idx + 1,
                    kind: entry.kind(),
                    result,
                }
            })
            .collect()
    }

    pub fn run(&self, entry: &ExecuteEntry, base_folder: &NormalizedPath) -> Result<ActionEffect> {
        match entry {
            ExecuteEntry::Copy {
                origin,
                destination,
            } => Ok(match self.copy(origin, destination, base_folder)? {
                CopyOutcome::Copied { target } => ActionEffect::Copied { target },
                CopyOutcome::Unchanged { target } => ActionEffect::Unchanged { target },
            }),
            ExecuteEntry::CopyAndRun {
                origin,
                destination,
            } => {
                let target = self.copy(origin, destination, base_folder)?.target().clone();
                execute(&target)?;
                Ok(ActionEffect::Ran { target })
            }
            ExecuteEntry::Delete { origin } => {
                let path = resolve_location(origin, base_folder);
                if remove_path(&path)? {
                    Ok(ActionEffect::Deleted { path })
                } else {
                    tracing::debug!(path = %path, "Nothing to delete");
                    Ok(ActionEffect::AlreadyAbsent { path })
                }
            }
        }
    }

    fn copy(&self, origin: &str, destination: &str, base_folder: &NormalizedPath) -> Result<CopyOutcome> {
        let origin = resolve_location(origin, base_folder);
        let target = resolve_location(destination, base_folder);

        // A trailing separator names a directory to copy into
        if destination.ends_with('/') || destination.ends_with('\\') {
            let native = target.to_native();
            std::fs::create_dir_all(&native).map_err(|e| setup_fs::Error::io(&native, e))?;
        }

        Ok(copy_path(&origin, &target, self.robustness)?)
    }
}

fn execute(target: &NormalizedPath) -> Result<()> {
    if !target.is_file() {
        return Err(Error::Execution {
            command: target.to_string(),
            exit_code: None,
            message: "not a file".into(),
        });
    }

    let native = target.to_native();
    let mut cmd = program_command(&native);
    if let Some(dir) = native.parent() {
        cmd.current_dir(dir);
    }

    tracing::info!(program = %target, "Running");
    let captured = run_captured(&mut cmd, target.as_str())?;
    if captured.success {
        return Ok(());
    }

    let output = captured.output.trim();
    Err(Error::Execution {
        command: target.to_string(),
        exit_code: captured.exit_code,
        message: if output.is_empty() {
            "exited unsuccessfully".to_string()
        } else {
            output.to_string()
        },
    })
}
