//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use setup_manifest::TargetVersion;

/// Component Setup - Install IDE component packages from a manifest
#[derive(Parser, Debug)]
#[command(name = "setup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Installer settings file (default: setup.toml next to the manifest)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Manifest location shared by every command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ManifestArgs {
    /// Manifest file
    #[arg(short, long, env = "SETUP_MANIFEST", default_value = "Setup.ini")]
    pub manifest: PathBuf,
}

/// Arguments shared by commands that act on working copies.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// IDE version to install into, e.g. D29 (default: DefaultIDE)
    #[arg(short, long, env = "SETUP_TARGET")]
    pub target: Option<TargetVersion>,

    /// Components root (default: DefaultDestFolder, else the manifest's folder)
    #[arg(short, long, env = "SETUP_ROOT")]
    pub root: Option<PathBuf>,

    /// Only these packages, by section or name (repeatable)
    #[arg(short, long = "package", value_name = "NAME")]
    pub packages: Vec<String>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check that a manifest parses
    Validate {
        /// Manifest file
        #[arg(env = "SETUP_MANIFEST", default_value = "Setup.ini")]
        manifest: PathBuf,
    },

    /// Show the operations an install would perform, in order
    Plan {
        #[command(flatten)]
        target: TargetArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Fetch, register, compile and run actions for every package
    ///
    /// Examples:
    ///   setup install                      # Everything, into DefaultIDE
    ///   setup install -t D29 -p SynEdit    # One package into D29
    ///   setup install --offline --yes      # Use existing working copies
    Install {
        #[command(flatten)]
        target: TargetArgs,

        /// Fail packages whose working copy tracks a different origin
        #[arg(long)]
        strict: bool,

        /// Never contact remotes
        #[arg(long)]
        offline: bool,

        /// Concurrent fetches (default: from settings, else 4)
        #[arg(short, long)]
        jobs: Option<usize>,

        /// Compiler command template (overrides settings)
        #[arg(long, env = "SETUP_COMPILER")]
        compiler: Option<String>,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Output the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// List packages grouped by GroupIndex
    List {
        #[command(flatten)]
        manifest: ManifestArgs,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Fast-forward forked working copies from their upstream remotes
    SyncUpstream {
        #[command(flatten)]
        target: TargetArgs,

        /// Report what would happen without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Tag HEAD of every working copy and push the tag to origin
    Tag {
        /// Tag name, e.g. v1.2.0
        tag: String,

        #[command(flatten)]
        target: TargetArgs,

        /// Report what would happen without changing anything
        #[arg(long)]
        dry_run: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   setup completions bash > ~/.local/share/bash-completion/completions/setup
    ///   setup completions zsh > ~/.zfunc/_setup
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn install_flags_parse() {
        let cli = Cli::try_parse_from([
            "setup", "install", "-t", "d29", "-p", "SynEdit", "-p", "Package - 2", "--strict", "--jobs", "8",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Install {
                target,
                strict,
                jobs,
                ..
            }) => {
                assert_eq!(target.target, Some(TargetVersion::new(29)));
                assert_eq!(target.packages, vec!["SynEdit", "Package - 2"]);
                assert!(strict);
                assert_eq!(jobs, Some(8));
            }
            other => panic!("expected install, got {other:?}"),
        }
    }

    #[test]
    fn bad_target_is_rejected() {
        assert!(Cli::try_parse_from(["setup", "plan", "--target", "Delphi"]).is_err());
    }

    #[test]
    fn tag_takes_a_name() {
        let cli = Cli::try_parse_from(["setup", "tag", "v1.0", "--dry-run"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Tag { ref tag, dry_run: true, .. }) if tag == "v1.0"
        ));
    }
}
