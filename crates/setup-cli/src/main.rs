//! Component Setup CLI
//!
//! Installs IDE component packages described by a manifest.

mod cli;
mod commands;
mod error;
mod session;
mod settings;

use std::path::Path;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::InstallOptions;
use error::{Result, EXIT_OK};
use session::Session;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match run(cli) {
        Ok(()) => EXIT_OK,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::debug!("Verbose mode enabled");
}

fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Some(cmd) => execute_command(cmd, config),
        None => {
            println!("{} Component Setup", "setup".green().bold());
            println!();
            println!("Run {} for available commands.", "setup --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, config: Option<&Path>) -> Result<()> {
    match cmd {
        Commands::Validate { manifest } => commands::run_validate(&manifest),
        Commands::Plan { target, json } => {
            let session = Session::load(&target.manifest.manifest, config)?;
            commands::run_plan(&session, &target, json)
        }
        Commands::Install {
            target,
            strict,
            offline,
            jobs,
            compiler,
            yes,
            json,
        } => {
            let session = Session::load(&target.manifest.manifest, config)?;
            let options = InstallOptions {
                strict,
                offline,
                jobs,
                compiler,
                yes,
                json,
            };
            commands::run_install(&session, &target, &options)
        }
        Commands::List { manifest, json } => {
            let session = Session::load(&manifest.manifest, config)?;
            commands::run_list(&session, json)
        }
        Commands::SyncUpstream { target, dry_run } => {
            let session = Session::load(&target.manifest.manifest, config)?;
            commands::run_sync_upstream(&session, &target, dry_run)
        }
        Commands::Tag {
            tag,
            target,
            dry_run,
        } => {
            let session = Session::load(&target.manifest.manifest, config)?;
            commands::run_tag(&session, &target, &tag, dry_run)
        }
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "setup", &mut std::io::stdout());
            Ok(())
        }
    }
}
