//! Install command implementation

use std::io::IsTerminal;
use std::sync::Arc;

use colored::{ColoredString, Colorize};
use dialoguer::Confirm;
use setup_core::{
    check_target, CommandCompiler, FileEnvironmentStore, PackageReport, PackageStatus, Pipeline,
    RunContext, RunSummary,
};
use setup_git::GitSource;

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};
use crate::session::Session;

/// Flags specific to `install`.
#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    pub strict: bool,
    pub offline: bool,
    pub jobs: Option<usize>,
    pub compiler: Option<String>,
    pub yes: bool,
    pub json: bool,
}

pub fn run_install(session: &Session, args: &TargetArgs, options: &InstallOptions) -> Result<()> {
    let settings = &session.settings;
    let ctx = session
        .context(args)?
        .with_strict(options.strict)
        .with_offline(options.offline || settings.settings.fetch.offline)
        .with_jobs(settings.jobs(options.jobs));
    check_target(&session.manifest.options, ctx.target)?;

    if !confirmed(session, &ctx, options)? {
        println!("{}", "Aborted.".yellow());
        return Ok(());
    }

    let store = FileEnvironmentStore::open(&settings.store_dir(), ctx.target)?;
    tracing::info!(store = %store.path(), "Using environment store");
    let compiler = CommandCompiler::new(settings.compiler_command(options.compiler.as_deref()));
    let mut pipeline = Pipeline::new(Arc::new(GitSource::new()), Box::new(compiler), Box::new(store))
        .with_interrupt_handler(true);

    if !options.json {
        println!(
            "{} Installing {} into {}...",
            "=>".blue().bold(),
            ctx.target.to_string().cyan(),
            ctx.root
        );
    }
    let summary = pipeline.run(&session.manifest, &ctx)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print_summary(&summary);
    }

    let failed = summary
        .packages
        .iter()
        .filter(|p| p.has_failures() || p.was_cancelled())
        .count();
    if failed > 0 {
        return Err(CliError::PackagesFailed { failed });
    }
    Ok(())
}

/// Ask before touching anything, unless told not to or nobody can answer.
fn confirmed(session: &Session, ctx: &RunContext, options: &InstallOptions) -> Result<bool> {
    if options.yes || session.manifest.options.should_auto_start() || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Ok(Confirm::new()
        .with_prompt(format!("Install into {} at {}?", ctx.target, ctx.root))
        .default(true)
        .interact()?)
}

fn status_label(status: PackageStatus) -> ColoredString {
    let label = format!("{:<10}", status.label());
    match status {
        PackageStatus::Installed => label.green(),
        PackageStatus::PathOnly | PackageStatus::FetchedOnly => label.cyan(),
        PackageStatus::Partial => label.yellow(),
        PackageStatus::Skipped => label.dimmed(),
        PackageStatus::Failed => label.red().bold(),
    }
}

fn print_package(report: &PackageReport) {
    println!("  {} {}", status_label(report.status), report.name);
    for warning in &report.warnings {
        println!("     {} {}", "!".yellow(), warning);
    }
    if let Some(failure) = &report.failure {
        println!("     {} {}", "x".red(), failure.message);
    }
    for action in &report.actions {
        match &action.failure {
            Some(failure) => println!(
                "     {} action {} ({}): {}",
                "x".red(),
                action.index,
                action.action,
                failure.message
            ),
            None => println!("     {} action {} ({})", "+".green(), action.index, action.action),
        }
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", format!("Summary for {}", summary.target).bold());
    for report in &summary.packages {
        print_package(report);
    }
    println!();

    if summary.was_cancelled() {
        println!("{} Run cancelled; remaining packages were skipped.", "CANCELLED".yellow().bold());
    } else if summary.has_failures() {
        println!(
            "{} {} package(s) need attention.",
            "FAILED".red().bold(),
            summary.failed().count()
        );
    } else {
        println!(
            "{} {} installed, {} path-only, {} fetched, {} skipped.",
            "OK".green().bold(),
            summary.count(PackageStatus::Installed),
            summary.count(PackageStatus::PathOnly),
            summary.count(PackageStatus::FetchedOnly),
            summary.count(PackageStatus::Skipped)
        );
    }
}
