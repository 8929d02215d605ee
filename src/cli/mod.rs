//! Command-line interface for precommit.
//!
//! Subcommands: `check` (the default), `fix`, `init`, and clap's built-in
//! `help`. Bad flags, bad subcommands, and positional arguments are all
//! rejected with a message naming the offending token before any check
//! runs, and exit with status 1.

mod commands;

use crate::core::console::Console;
use crate::core::error::{Error, Result};
use crate::core::git::GitRepo;
use crate::core::runner::RunOptions;
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Simple git pre-commit hook management.
#[derive(Debug, Parser)]
#[command(
    name = "precommit",
    version,
    about = "Simple git pre-commit hook management",
    long_about = r#"
Simple git pre-commit hook management.

precommit runs the checks declared in precommit.toml against the files
staged in the current git repository.

Quick start:
  precommit init    # Create precommit.toml and install the git hook
  precommit         # Check for problems in the staged files
  precommit fix     # Apply any available fixes
"#
)]
pub struct Cli {
    /// Subcommand to run; defaults to `check`.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Turn on colorized output, overriding any environment settings.
    #[arg(long, global = true, conflicts_with = "no_color")]
    pub color: bool,

    /// Turn off colorized output.
    #[arg(long, global = true)]
    pub no_color: bool,

    // Accepted without a subcommand so the hook's `precommit --all`
    // reaches the default check action.
    #[arg(long, hide = true)]
    pub all: bool,

    #[arg(long, hide = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check for pre-commit failures (the default).
    Check {
        /// Run all checks, including slow ones.
        #[arg(long)]
        all: bool,

        /// Emit verbose output.
        #[arg(long)]
        verbose: bool,
    },

    /// Apply available fixes for the problems that check finds.
    Fix {
        /// Run all checks, including slow ones.
        #[arg(long)]
        all: bool,

        /// Emit verbose output.
        #[arg(long)]
        verbose: bool,

        /// Report fixes without applying them.
        #[arg(long)]
        dry_run: bool,
    },

    /// Write a default precommit.toml and install the git hook.
    Init {
        /// Overwrite existing files.
        #[arg(short, long)]
        force: bool,
    },
}

/// Runs the CLI.
pub fn run() -> Result<ExitCode> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return Ok(ExitCode::SUCCESS);
        },
        Err(e) => {
            let _ = e.print();
            return Ok(ExitCode::FAILURE);
        },
    };

    validate_flags(&cli)?;

    let verbose = effective_verbose(&cli);
    setup_logging(verbose);

    let console = Console::new(resolve_colors(cli.color, cli.no_color));

    // Run from the repository root regardless of the caller's directory.
    let repo = GitRepo::discover()?;
    std::env::set_current_dir(repo.root())
        .map_err(|e| Error::io("change to repository root", e))?;

    match cli.command {
        None => {
            let options = RunOptions {
                check_all: cli.all,
                dry_run: false,
                verbose,
            };
            commands::check(&repo, options, console)
        },
        Some(Commands::Check { all, .. }) => {
            let options = RunOptions {
                check_all: all || cli.all,
                dry_run: false,
                verbose,
            };
            commands::check(&repo, options, console)
        },
        Some(Commands::Fix { all, dry_run, .. }) => {
            let options = RunOptions {
                check_all: all || cli.all,
                dry_run,
                verbose,
            };
            commands::fix(&repo, options, console)
        },
        Some(Commands::Init { force }) => commands::init(&repo, force),
    }
}

/// Rejects top-level flags that are not valid for the chosen subcommand.
fn validate_flags(cli: &Cli) -> Result<()> {
    if let Some(Commands::Init { .. }) = cli.command {
        if cli.all {
            return Err(Error::usage("flag --all not valid for init subcommand"));
        }
        if cli.verbose {
            return Err(Error::usage("flag --verbose not valid for init subcommand"));
        }
    }
    Ok(())
}

fn effective_verbose(cli: &Cli) -> bool {
    cli.verbose
        || matches!(
            cli.command,
            Some(Commands::Check { verbose: true, .. } | Commands::Fix { verbose: true, .. })
        )
}

/// Resolves the color decision once, up front.
///
/// An explicit flag always wins; otherwise `NO_COLOR` disables colors when
/// standard output is not an interactive terminal.
fn resolve_colors(color: bool, no_color: bool) -> bool {
    let stdout_tty = std::io::stdout().is_terminal();
    if color {
        true
    } else if no_color || (std::env::var_os("NO_COLOR").is_some() && !stdout_tty) {
        false
    } else {
        stdout_tty
    }
}

/// Sets up logging to stderr based on the verbosity flag.
fn setup_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
