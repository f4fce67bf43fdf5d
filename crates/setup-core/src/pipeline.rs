//! Orchestration: concurrent fetch phase, then sequential install phase
//!
//! ```text
//! select ──► fetch (worker pool, any order) ──► install (manifest order)
//!                                                 register ─► compile ─► actions
//! ```
//!
//! Fetches share nothing but the components root, so they run on a bounded
//! pool of blocking threads, one task per working copy: packages declaring
//! the same folder are fetched one after another by that folder's task. Installs mutate the environment store and
//! later packages depend on earlier registrations, so they run one at a
//! time in manifest order. One package's failure never stops the run.

use std::collections::VecDeque;
use std::sync::Arc;

use setup_fs::NormalizedPath;
use setup_git::SourceControl;
use setup_manifest::{Manifest, Options, PackageDefinition, SourceRef};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::actions::ActionRunner;
use crate::cancel::CancelToken;
use crate::compiler::Compiler;
use crate::context::RunContext;
use crate::fetcher::{FetchStatus, RepositoryFetcher};
use crate::installer::PackageInstaller;
use crate::resolver::check_target;
use crate::store::EnvironmentStore;
use crate::summary::{ActionSummary, PackageReport, RunSummary};
use crate::{Error, Result};

type FetchTask = JoinHandle<Vec<Result<FetchStatus>>>;

/// Packages of `manifest` selected by `ctx.packages`, in manifest order.
///
/// Fails when a filter entry matches no package.
pub fn select_packages<'a>(manifest: &'a Manifest, ctx: &RunContext) -> Result<Vec<&'a PackageDefinition>> {
    let (selected, unmatched) = manifest.select(&ctx.packages);
    if !unmatched.is_empty() {
        return Err(Error::UnknownPackages { names: unmatched });
    }
    Ok(selected)
}

/// Runs a manifest against one target environment.
pub struct Pipeline {
    fetcher: RepositoryFetcher,
    compiler: Box<dyn Compiler>,
    store: Box<dyn EnvironmentStore>,
    actions: ActionRunner,
    handle_interrupts: bool,
}

impl Pipeline {
    pub fn new(
        source: Arc<dyn SourceControl>,
        compiler: Box<dyn Compiler>,
        store: Box<dyn EnvironmentStore>,
    ) -> Self {
        Self {
            fetcher: RepositoryFetcher::new(source),
            compiler,
            store,
            actions: ActionRunner::new(),
            handle_interrupts: false,
        }
    }

    pub fn with_actions(mut self, actions: ActionRunner) -> Self {
        self.actions = actions;
        self
    }

    /// Cancel the run's token on Ctrl-C instead of terminating the process.
    pub fn with_interrupt_handler(mut self, enabled: bool) -> Self {
        self.handle_interrupts = enabled;
        self
    }

    pub fn store(&self) -> &dyn EnvironmentStore {
        self.store.as_ref()
    }

    /// Install every selected package.
    ///
    /// Errors only for run-level problems: an unsupported target, an unknown
    /// package filter, or a runtime that cannot start. Everything scoped to a
    /// package ends up in that package's report.
    pub fn run(&mut self, manifest: &Manifest, ctx: &RunContext) -> Result<RunSummary> {
        check_target(&manifest.options, ctx.target)?;
        let selected = select_packages(manifest, ctx)?;

        tracing::info!(
            target = %ctx.target,
            root = %ctx.root,
            packages = selected.len(),
            jobs = ctx.jobs,
            "Starting install"
        );

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(ctx.jobs)
            .thread_name("setup-fetch")
            .enable_all()
            .build()?;

        if self.handle_interrupts {
            watch_interrupt(&runtime, ctx.cancel.clone());
        }

        let (tasks, group_of) = self.fetch_all(&runtime, &selected, ctx);
        let mut tasks: Vec<Option<FetchTask>> = tasks.into_iter().map(Some).collect();
        let mut results: Vec<VecDeque<Result<FetchStatus>>> = (0..tasks.len()).map(|_| VecDeque::new()).collect();
        let mut join_errors: Vec<Option<String>> = vec![None; tasks.len()];

        let mut packages = Vec::with_capacity(selected.len());
        for (package, group) in selected.into_iter().zip(group_of) {
            if let Some(task) = tasks[group].take() {
                match runtime.block_on(task) {
                    Ok(fetched) => results[group] = fetched.into(),
                    Err(e) => join_errors[group] = Some(e.to_string()),
                }
            }
            let fetched = results[group].pop_front().unwrap_or_else(|| {
                Err(Error::Fetch {
                    package: package.name.clone(),
                    message: format!(
                        "fetch task failed: {}",
                        join_errors[group].as_deref().unwrap_or("no result")
                    ),
                })
            });
            packages.push(self.install_one(&manifest.options, package, fetched, ctx));
        }

        let summary = RunSummary {
            target: ctx.target,
            packages,
        };
        tracing::info!(
            failed = summary.failed().count(),
            cancelled = summary.was_cancelled(),
            "Install finished"
        );
        Ok(summary)
    }

    /// Spawn one fetch task per distinct working copy.
    ///
    /// Returns the tasks and, for every selected package, the index of the
    /// task that fetches it. A task yields one result per member package,
    /// in manifest order.
    fn fetch_all(
        &self,
        runtime: &Runtime,
        selected: &[&PackageDefinition],
        ctx: &RunContext,
    ) -> (Vec<FetchTask>, Vec<usize>) {
        let mut groups: Vec<(NormalizedPath, Vec<(String, SourceRef)>)> = Vec::new();
        let mut group_of = Vec::with_capacity(selected.len());
        for package in selected {
            let folder = ctx.package_folder(package);
            let group = match groups.iter().position(|(existing, _)| same_folder(existing, &folder)) {
                Some(group) => {
                    tracing::debug!(package = %package.name, folder = %folder, "Sharing working copy");
                    group
                }
                None => {
                    groups.push((folder, Vec::new()));
                    groups.len() - 1
                }
            };
            groups[group].1.push((package.name.clone(), package.source.clone()));
            group_of.push(group);
        }

        let tasks = groups
            .into_iter()
            .map(|(folder, members)| {
                let fetcher = self.fetcher.clone();
                let cancel = ctx.cancel.clone();
                let offline = ctx.offline;
                runtime.spawn_blocking(move || {
                    members
                        .iter()
                        .map(|(name, source)| {
                            if cancel.is_cancelled() {
                                return Err(Error::Cancelled);
                            }
                            tracing::debug!(package = %name, folder = %folder, "Fetching");
                            fetcher.fetch(name, source, &folder, offline)
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        (tasks, group_of)
    }

    fn install_one(
        &mut self,
        options: &Options,
        package: &PackageDefinition,
        fetched: Result<FetchStatus>,
        ctx: &RunContext,
    ) -> PackageReport {
        let mut report = PackageReport::pending(package);

        if ctx.cancel.is_cancelled() {
            tracing::info!(package = %package.name, "Cancelled, skipping");
            report.skip(&Error::Cancelled);
            return report;
        }

        let status = match fetched {
            Ok(status) => status,
            Err(Error::Cancelled) => {
                report.skip(&Error::Cancelled);
                return report;
            }
            Err(error) => {
                tracing::error!(package = %package.name, error = %error, "Fetch failed");
                report.fail(&error);
                return report;
            }
        };

        let drift = match &status {
            FetchStatus::Drifted { actual } => Some(Error::ConfigDrift {
                package: package.name.clone(),
                expected: package.source.primary.clone(),
                actual: actual.clone(),
            }),
            FetchStatus::Stale { reason } => {
                report
                    .warnings
                    .push(format!("update failed, using existing working copy: {reason}"));
                None
            }
            _ => None,
        };
        report.fetch = Some(status);
        if let Some(drift) = drift {
            if ctx.strict {
                report.fail(&drift);
                return report;
            }
            report.warnings.push(drift.to_string());
        }

        let folder = ctx.package_folder(package);
        let result = PackageInstaller::new(
            self.compiler.as_ref(),
            self.store.as_mut(),
            options,
            ctx.target,
        )
        .install(package, &folder);

        if report.apply(result) && !package.execute.is_empty() {
            report.actions = self
                .actions
                .run_all(&package.execute, &folder)
                .iter()
                .map(ActionSummary::from)
                .collect();
        }

        tracing::info!(package = %package.name, status = %report.status, "Package done");
        report
    }
}

/// Folders compare case-insensitively; component roots usually live on
/// case-insensitive filesystems.
fn same_folder(a: &NormalizedPath, b: &NormalizedPath) -> bool {
    a.as_str().eq_ignore_ascii_case(b.as_str())
}

/// Cancel `token` on the first Ctrl-C.
///
/// Work in flight finishes; packages not yet started are skipped.
fn watch_interrupt(runtime: &Runtime, token: CancelToken) {
    runtime.spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing the current package");
            token.cancel();
        }
    });
}
