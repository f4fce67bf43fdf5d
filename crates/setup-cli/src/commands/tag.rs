//! Tag command implementation

use colored::Colorize;
use setup_git::tag_release;

use crate::cli::TargetArgs;
use crate::error::{CliError, Result};
use crate::session::Session;

/// Tag HEAD of every selected working copy and push the tag to origin.
///
/// Every folder must exist before anything is tagged. The first failure
/// stops the command and lists what was already tagged.
pub fn run_tag(session: &Session, args: &TargetArgs, tag: &str, dry_run: bool) -> Result<()> {
    let root = session.root(args.root.as_deref())?;
    let packages = session.select(&args.packages)?;

    if let Some(missing) = packages.iter().find(|p| !root.join(&p.folder).is_dir()) {
        return Err(CliError::user(format!(
            "[{}] {}: working copy {} does not exist",
            missing.section,
            missing.name,
            root.join(&missing.folder)
        )));
    }

    let mut tagged = Vec::new();
    for package in packages {
        let folder = root.join(&package.folder);
        match tag_release(&folder, tag, dry_run) {
            Ok(outcome) if dry_run => println!(
                "  {} would tag {} at {} and push to origin",
                "-".dimmed(),
                package.name.cyan(),
                &outcome.commit[..outcome.commit.len().min(8)]
            ),
            Ok(outcome) => {
                println!(
                    "  {} tagged {} at {}",
                    "+".green(),
                    package.name.cyan(),
                    &outcome.commit[..outcome.commit.len().min(8)]
                );
                tagged.push(package.name.clone());
            }
            Err(e) => {
                if !tagged.is_empty() {
                    println!(
                        "{} {} already tagged: {}",
                        "PARTIAL".yellow().bold(),
                        tag,
                        tagged.join(", ")
                    );
                }
                return Err(CliError::user(format!("[{}] {}: {e}", package.section, package.name)));
            }
        }
    }

    println!(
        "{} {} {}",
        "OK".green().bold(),
        tag,
        if dry_run { "validated" } else { "tagged and pushed" }
    );
    Ok(())
}
