//! Sync-upstream command implementation

use colored::Colorize;
use setup_git::{sync_with_upstream, SyncStatus};

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};
use crate::session::Session;

/// Fast-forward every selected working copy from its upstream remote and
/// print the outcome grouped by status.
pub fn run_sync_upstream(session: &Session, args: &TargetArgs, dry_run: bool) -> Result<()> {
    let root = session.root(args.root.as_deref())?;
    let packages = session.select(&args.packages)?;

    println!(
        "{} Syncing {} working copies from upstream{}...",
        "=>".blue().bold(),
        packages.len(),
        if dry_run { " (dry run)" } else { "" }
    );

    let mut groups: Vec<(&'static str, Vec<String>)> = Vec::new();
    let mut errors = Vec::new();
    for package in packages {
        let folder = root.join(&package.folder);
        match sync_with_upstream(&folder, dry_run) {
            Ok(status) => {
                tracing::debug!(package = %package.name, %status, "Upstream status");
                let entry = describe(&package.name, &status);
                match groups.iter_mut().find(|(label, _)| *label == status.label()) {
                    Some((_, names)) => names.push(entry),
                    None => groups.push((status.label(), vec![entry])),
                }
            }
            Err(e) => errors.push((package.name.clone(), e)),
        }
    }

    for (label, names) in &groups {
        println!();
        println!("{}:", label.bold());
        for name in names {
            println!("  {} {}", "-".dimmed(), name);
        }
    }

    if !errors.is_empty() {
        println!();
        println!("{}:", "errors".red().bold());
        for (name, error) in &errors {
            println!("  {} {}: {}", "x".red(), name, error);
        }
        return Err(CliError::PackagesFailed {
            failed: errors.len(),
        });
    }
    Ok(())
}

fn describe(name: &str, status: &SyncStatus) -> String {
    match status {
        SyncStatus::Missing | SyncStatus::NoUpstream => name.to_string(),
        SyncStatus::NoUpstreamBranch { branch }
        | SyncStatus::UpToDate { branch }
        | SyncStatus::FastForwardable { branch }
        | SyncStatus::FastForwarded { branch }
        | SyncStatus::Ahead { branch }
        | SyncStatus::Diverged { branch } => format!("{name} ({branch})"),
    }
}
