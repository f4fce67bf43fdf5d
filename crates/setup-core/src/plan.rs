//! Dry run: the ordered operations an install would perform
//!
//! Building a plan only reads: working-copy state through the
//! version-control collaborator and registration state through the
//! environment store. Nothing is cloned, registered, compiled or copied.

use std::fmt;

use serde::Serialize;
use setup_fs::NormalizedPath;
use setup_git::{same_remote, SourceControl};
use setup_manifest::{
    ActionKind, ArtifactKind, Installable, Manifest, PackageDefinition, TargetVersion,
};

use crate::actions::resolve_location;
use crate::context::RunContext;
use crate::pipeline::select_packages;
use crate::registrar::package_paths;
use crate::resolver::{check_target, resolve};
use crate::store::{EnvironmentStore, PathList};
use crate::Result;

/// How a path registration is expected to go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathState {
    New,
    AlreadyRegistered,
    /// The directory does not exist in the working copy
    Missing,
    /// The working copy has not been fetched yet
    Pending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "kebab-case")]
pub enum PlanStep {
    Clone { url: String, into: NormalizedPath },
    Update { folder: NormalizedPath },
    UseExisting { folder: NormalizedPath },
    /// Working copy tracks a different origin
    Drift { folder: NormalizedPath, actual: Option<String> },
    Register { list: PathList, path: NormalizedPath, state: PathState },
    Compile { artifact: NormalizedPath, kind: ArtifactKind, lib_suffix: Option<String> },
    RegisterPackage { artifact: NormalizedPath },
    Action { index: usize, action: ActionKind, origin: NormalizedPath, destination: Option<NormalizedPath> },
    Skip { reason: String },
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clone { url, into } => write!(f, "clone {url} into {into}"),
            Self::Update { folder } => write!(f, "update {folder}"),
            Self::UseExisting { folder } => write!(f, "use existing {folder} (offline)"),
            Self::Drift { folder, actual } => write!(
                f,
                "drift: {folder} tracks {}",
                actual.as_deref().unwrap_or("no origin")
            ),
            Self::Register { list, path, state } => {
                write!(f, "register {list} {path}")?;
                match state {
                    PathState::New => Ok(()),
                    PathState::AlreadyRegistered => write!(f, " (already registered)"),
                    PathState::Missing => write!(f, " (missing, will be skipped)"),
                    PathState::Pending => write!(f, " (after fetch)"),
                }
            }
            Self::Compile {
                artifact,
                kind,
                lib_suffix,
            } => {
                write!(f, "compile {kind} {artifact}")?;
                if let Some(suffix) = lib_suffix {
                    write!(f, " (suffix {suffix})")?;
                }
                Ok(())
            }
            Self::RegisterPackage { artifact } => write!(f, "register design package {artifact}"),
            Self::Action {
                index,
                action,
                origin,
                destination,
            } => {
                write!(f, "action {index}: {action} {origin}")?;
                if let Some(destination) = destination {
                    write!(f, " -> {destination}")?;
                }
                Ok(())
            }
            Self::Skip { reason } => write!(f, "skip: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagePlan {
    pub section: String,
    pub name: String,
    pub installable: Installable,
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub target: TargetVersion,
    pub root: NormalizedPath,
    pub packages: Vec<PackagePlan>,
}

impl Plan {
    /// Plan an install of `manifest` under `ctx` without side effects.
    pub fn build(
        manifest: &Manifest,
        ctx: &RunContext,
        source: &dyn SourceControl,
        store: &dyn EnvironmentStore,
    ) -> Result<Self> {
        check_target(&manifest.options, ctx.target)?;
        let selected = select_packages(manifest, ctx)?;

        let mut packages = Vec::with_capacity(selected.len());
        let mut planned_clones: Vec<NormalizedPath> = Vec::new();
        for package in selected {
            let folder = ctx.package_folder(package);
            let mut steps = Vec::new();

            let fetched = source.is_working_copy(&folder);
            if !fetched && planned_clones.contains(&folder) {
                steps.push(PlanStep::Update { folder: folder.clone() });
            } else if !fetched && ctx.offline {
                steps.push(PlanStep::Skip {
                    reason: format!("no working copy at {folder} and running offline"),
                });
                packages.push(package_plan(package, steps));
                continue;
            } else if !fetched {
                planned_clones.push(folder.clone());
                steps.push(PlanStep::Clone {
                    url: package.source.primary.clone(),
                    into: folder.clone(),
                });
            } else {
                let actual = source.origin_url(&folder)?;
                if !actual.as_deref().is_some_and(|url| same_remote(url, &package.source.primary)) {
                    steps.push(PlanStep::Drift {
                        folder: folder.clone(),
                        actual,
                    });
                    if ctx.strict {
                        steps.push(PlanStep::Skip {
                            reason: "configuration drift in strict mode".into(),
                        });
                        packages.push(package_plan(package, steps));
                        continue;
                    }
                } else if ctx.offline {
                    steps.push(PlanStep::UseExisting { folder: folder.clone() });
                } else {
                    steps.push(PlanStep::Update { folder: folder.clone() });
                }
            }

            let resolved = match package.installable {
                Installable::NotInstallable => None,
                Installable::PathOnly => Some(Vec::new()),
                Installable::Install => match resolve(&manifest.options, package, ctx.target) {
                    Ok(resolved) => {
                        let suffix = resolved.lib_suffix;
                        Some(
                            resolved
                                .artifacts
                                .into_iter()
                                .map(|artifact| (artifact, suffix.clone()))
                                .collect::<Vec<_>>(),
                        )
                    }
                    Err(e) => {
                        steps.push(PlanStep::Skip { reason: e.to_string() });
                        packages.push(package_plan(package, steps));
                        continue;
                    }
                },
            };

            let Some(artifacts) = resolved else {
                packages.push(package_plan(package, steps));
                continue;
            };

            for entry in package_paths(package, &folder) {
                let state = if !fetched {
                    PathState::Pending
                } else if !entry.path.is_dir() {
                    PathState::Missing
                } else if store.is_registered(entry.list, &entry.path)? {
                    PathState::AlreadyRegistered
                } else {
                    PathState::New
                };
                steps.push(PlanStep::Register {
                    list: entry.list,
                    path: entry.path,
                    state,
                });
            }

            for (artifact, lib_suffix) in artifacts {
                let path = folder.join(&artifact.path);
                steps.push(PlanStep::Compile {
                    artifact: path.clone(),
                    kind: artifact.kind,
                    lib_suffix,
                });
                if artifact.kind == ArtifactKind::DesignTime {
                    steps.push(PlanStep::RegisterPackage { artifact: path });
                }
            }

            for (idx, entry) in package.execute.iter().enumerate() {
                steps.push(PlanStep::Action {
                    index: idx + 1,
                    action: entry.kind(),
                    origin: resolve_location(entry.origin(), &folder),
                    destination: entry.destination().map(|d| resolve_location(d, &folder)),
                });
            }

            packages.push(package_plan(package, steps));
        }

        Ok(Self {
            target: ctx.target,
            root: ctx.root.clone(),
            packages,
        })
    }

    /// Total number of steps across packages.
    pub fn step_count(&self) -> usize {
        self.packages.iter().map(|p| p.steps.len()).sum()
    }
}

fn package_plan(package: &PackageDefinition, steps: Vec<PlanStep>) -> PackagePlan {
    PackagePlan {
        section: package.section.clone(),
        name: package.name.clone(),
        installable: package.installable,
        steps,
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Plan for {} into {}:", self.target, self.root)?;
        let mut number = 0;
        for package in &self.packages {
            writeln!(f, "{} [{}]", package.name, package.section)?;
            for step in &package.steps {
                number += 1;
                writeln!(f, "  {number:>3}. {step}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryEnvironmentStore;
    use setup_git::UpdateOutcome;

    /// Reports every folder as an existing working copy of `origin`.
    struct Existing {
        origin: Option<String>,
    }

    impl SourceControl for Existing {
        fn is_working_copy(&self, _path: &NormalizedPath) -> bool {
            true
        }

        fn materialize(&self, _primary: &str, _upstream: Option<&str>, _path: &NormalizedPath) -> setup_git::Result<()> {
            unreachable!("planning never clones")
        }

        fn update(&self, _path: &NormalizedPath) -> setup_git::Result<UpdateOutcome> {
            unreachable!("planning never updates")
        }

        fn origin_url(&self, _path: &NormalizedPath) -> setup_git::Result<Option<String>> {
            Ok(self.origin.clone())
        }
    }

    struct Nothing;

    impl SourceControl for Nothing {
        fn is_working_copy(&self, _path: &NormalizedPath) -> bool {
            false
        }

        fn materialize(&self, _primary: &str, _upstream: Option<&str>, _path: &NormalizedPath) -> setup_git::Result<()> {
            unreachable!("planning never clones")
        }

        fn update(&self, _path: &NormalizedPath) -> setup_git::Result<UpdateOutcome> {
            unreachable!("planning never updates")
        }

        fn origin_url(&self, _path: &NormalizedPath) -> setup_git::Result<Option<String>> {
            Ok(None)
        }
    }

    const MANIFEST: &str = "\
[Options]
MinimumIDEVersion=27

[Package - 1]
Name=SynEdit
Git=https://github.com/pyscripter/SynEdit
Folder=SynEdit
SearchPath=\"Source\"
D29=\"Packages\\SynEdit_D.dproj\", \"Packages\\SynEdit_R.dproj\"
LibSuffix=%d0
ExecuteCount=1
Execute1=\"Delete\", \"$BaseFolder\\Obsolete\"

[Package - 2]
Name=Old
Git=https://example.com/old
Folder=Old
D27=\"Old.dproj\"
";

    fn ctx() -> RunContext {
        RunContext::new(NormalizedPath::new("/components"), TargetVersion::new(29))
    }

    #[test]
    fn unfetched_package_plans_clone_then_everything_after_it() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let plan = Plan::build(&manifest, &ctx(), &Nothing, &store).unwrap();

        let steps = &plan.packages[0].steps;
        assert_eq!(
            steps[0],
            PlanStep::Clone {
                url: "https://github.com/pyscripter/SynEdit".into(),
                into: NormalizedPath::new("/components/SynEdit"),
            }
        );
        assert_eq!(
            steps[1],
            PlanStep::Register {
                list: PathList::Search,
                path: NormalizedPath::new("/components/SynEdit/Source"),
                state: PathState::Pending,
            }
        );
        let compiles: Vec<_> = steps
            .iter()
            .filter_map(|s| match s {
                PlanStep::Compile { artifact, .. } => Some(artifact.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(
            compiles,
            [
                "/components/SynEdit/Packages/SynEdit_R.dproj",
                "/components/SynEdit/Packages/SynEdit_D.dproj"
            ]
        );
        assert!(matches!(steps.last(), Some(PlanStep::Action { index: 1, action: ActionKind::Delete, .. })));
    }

    #[test]
    fn unsupported_package_plans_a_skip() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let plan = Plan::build(&manifest, &ctx(), &Nothing, &store).unwrap();

        assert!(matches!(plan.packages[1].steps.last(), Some(PlanStep::Skip { .. })));
    }

    #[test]
    fn drift_is_planned_and_strict_mode_skips() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let source = Existing {
            origin: Some("https://example.com/fork".into()),
        };

        let lenient = Plan::build(&manifest, &ctx(), &source, &store).unwrap();
        assert!(matches!(lenient.packages[0].steps[0], PlanStep::Drift { .. }));
        assert!(lenient.packages[0].steps.len() > 2);

        let strict = Plan::build(&manifest, &ctx().with_strict(true), &source, &store).unwrap();
        assert_eq!(strict.packages[0].steps.len(), 2);
        assert!(matches!(strict.packages[0].steps[1], PlanStep::Skip { .. }));
    }

    #[test]
    fn offline_uses_existing_copy() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let source = Existing {
            origin: Some("https://github.com/pyscripter/SynEdit.git".into()),
        };

        let plan = Plan::build(&manifest, &ctx().with_offline(true), &source, &store).unwrap();
        assert!(matches!(plan.packages[0].steps[0], PlanStep::UseExisting { .. }));

        let online = Plan::build(&manifest, &ctx(), &source, &store).unwrap();
        assert!(matches!(online.packages[0].steps[0], PlanStep::Update { .. }));
    }

    #[test]
    fn shared_folder_is_cloned_once() {
        let manifest = Manifest::parse(
            "[A]\nName=A\nGit=https://example.com/shared\nFolder=Shared\n\n\
             [B]\nName=B\nGit=https://example.com/shared\nFolder=Shared\n",
        )
        .unwrap();
        let store = MemoryEnvironmentStore::new();
        let plan = Plan::build(&manifest, &ctx(), &Nothing, &store).unwrap();
        assert!(matches!(plan.packages[0].steps[0], PlanStep::Clone { .. }));
        assert!(matches!(plan.packages[1].steps[0], PlanStep::Update { .. }));
    }

    #[test]
    fn offline_without_copy_is_skipped() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let plan = Plan::build(&manifest, &ctx().with_offline(true), &Nothing, &store).unwrap();
        assert_eq!(plan.packages[0].steps.len(), 1);
        assert!(matches!(plan.packages[0].steps[0], PlanStep::Skip { .. }));
    }

    #[test]
    fn below_minimum_target_is_a_plan_error() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let ctx = RunContext::new(NormalizedPath::new("/components"), TargetVersion::new(26));
        assert!(matches!(
            Plan::build(&manifest, &ctx, &Nothing, &store),
            Err(crate::Error::Unsupported { .. })
        ));
    }

    #[test]
    fn display_numbers_steps() {
        let manifest = Manifest::parse(MANIFEST).unwrap();
        let store = MemoryEnvironmentStore::new();
        let plan = Plan::build(&manifest, &ctx(), &Nothing, &store).unwrap();
        let text = plan.to_string();
        assert!(text.starts_with("Plan for D29 into /components:"));
        assert!(text.contains("    1. clone https://github.com/pyscripter/SynEdit into /components/SynEdit"));
        assert_eq!(plan.step_count(), text.lines().filter(|l| l.starts_with("  ")).count());
    }
}
