//! Plan command implementation
//!
//! Dry run of `install`: shows every operation in order without fetching,
//! registering, compiling or running anything.

use colored::Colorize;
use setup_core::{FileEnvironmentStore, Plan};
use setup_git::GitSource;

use crate::cli::TargetArgs;
use crate::error::Result;
use crate::session::Session;

pub fn run_plan(session: &Session, args: &TargetArgs, json: bool) -> Result<()> {
    let ctx = session.context(args)?;
    let store = FileEnvironmentStore::open(&session.settings.store_dir(), ctx.target)?;
    let plan = Plan::build(&session.manifest, &ctx, &GitSource::new(), &store)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    print!("{plan}");
    println!();
    println!(
        "{} {} step(s) across {} package(s). Run {} to apply.",
        "=>".blue().bold(),
        plan.step_count(),
        plan.packages.len(),
        "setup install".cyan()
    );
    Ok(())
}
