//! Validate command implementation

use std::path::Path;

use colored::Colorize;
use setup_fs::NormalizedPath;
use setup_manifest::{Installable, Manifest};

use crate::error::Result;

/// Parse the manifest and report what it declares.
pub fn run_validate(path: &Path) -> Result<()> {
    let manifest = Manifest::load(&NormalizedPath::new(path))?;

    let count = |mode: Installable| {
        manifest
            .packages
            .iter()
            .filter(|p| p.installable == mode)
            .count()
    };
    let actions: usize = manifest.packages.iter().map(|p| p.execute.len()).sum();

    println!(
        "{} {} is valid: {} package(s)",
        "OK".green().bold(),
        path.display(),
        manifest.packages.len()
    );
    println!(
        "   {} install, {} path-only, {} fetch-only, {} action(s)",
        count(Installable::Install),
        count(Installable::PathOnly),
        count(Installable::NotInstallable),
        actions
    );
    if let Some(minimum) = manifest.options.minimum_ide_version {
        println!("   {}: {}", "Minimum IDE".dimmed(), minimum);
    }
    if let Some(target) = manifest.options.default_ide {
        println!("   {}: {}", "Default IDE".dimmed(), target);
    }
    Ok(())
}
