//! reposync CLI
//!
//! Keeps the git checkouts of several machines in step through one shared
//! manifest file.

mod cli;
mod commands;
mod context;
mod error;

use std::io;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use commands::sync::SyncArgs;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("Verbose mode enabled");

    execute_command(cli)
}

/// Logs go to stderr so command output stays parseable.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbose)
        .try_init();
}

fn execute_command(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "reposync", &mut io::stdout());
        return Ok(());
    }

    let settings = context::load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Scan {
            path,
            no_remote_check,
            output,
            format,
        } => commands::run_scan(&settings, &path, !no_remote_check, output.as_deref(), format),
        Commands::Sync {
            path,
            manifest,
            existing,
            dry_run,
            no_remote_check,
            format,
            machine,
            json,
        } => {
            let machine = context::resolve_machine(machine.as_deref(), &settings);
            commands::run_sync(
                &settings,
                SyncArgs {
                    path,
                    manifest,
                    existing: existing.policy(),
                    dry_run,
                    check_remote: !no_remote_check,
                    format,
                    machine,
                    json,
                },
            )
        }
        Commands::Restore {
            manifest,
            destination,
            existing,
            dry_run,
            format,
            machine,
        } => {
            let machine = context::resolve_machine(machine.as_deref(), &settings);
            commands::run_restore(
                &settings,
                &manifest,
                &destination,
                existing.policy(),
                dry_run,
                format,
                machine,
            )
        }
        Commands::Completions { .. } => Ok(()),
    }
}
