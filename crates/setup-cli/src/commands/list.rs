//! List command implementation

use colored::Colorize;
use serde_json::json;
use setup_manifest::Installable;

use crate::error::Result;
use crate::session::Session;

/// Print packages grouped by `GroupIndex`, ungrouped first.
///
/// Grouping is presentation only; install order is always manifest order.
pub fn run_list(session: &Session, json: bool) -> Result<()> {
    let groups = session.manifest.groups();

    if json {
        let output: Vec<_> = groups
            .iter()
            .map(|(group, packages)| {
                json!({
                    "group": group,
                    "packages": packages.iter().map(|p| json!({
                        "section": p.section,
                        "name": p.name,
                        "git": p.source.primary,
                        "folder": p.folder,
                        "installable": p.installable,
                    })).collect::<Vec<_>>(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if session.manifest.packages.is_empty() {
        println!("{}", "No packages".dimmed());
        return Ok(());
    }

    for (group, packages) in &groups {
        match group {
            Some(index) => println!("{} {}", "Group".bold(), index),
            None => println!("{}", "Ungrouped".bold()),
        }
        for package in packages {
            let mode = match package.installable {
                Installable::Install => "".normal(),
                Installable::PathOnly => " (path only)".yellow(),
                Installable::NotInstallable => " (fetch only)".dimmed(),
            };
            println!(
                "  {} {}{}  {}",
                "+".green(),
                package.name.cyan(),
                mode,
                package.source.primary.dimmed()
            );
        }
    }
    Ok(())
}
