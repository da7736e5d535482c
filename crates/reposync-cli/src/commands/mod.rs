//! Command implementations for reposync-cli

pub mod restore;
pub mod scan;
pub mod sync;

use colored::Colorize;
use reposync_core::{CloneOutcome, CloneStatus, Settings, SyncEngine};
use reposync_git::GitCli;

use crate::error::{CliError, Result};

pub use restore::run_restore;
pub use scan::run_scan;
pub use sync::run_sync;

/// Build an engine around the `git` found on `PATH`.
///
/// A missing `git` executable aborts the command.
fn engine(settings: &Settings) -> Result<SyncEngine<GitCli>> {
    let git = GitCli::locate()?;
    tracing::debug!(program = %git.program().display(), "Using git");
    Ok(SyncEngine::new(git).with_settings(settings))
}

fn print_outcome(outcome: &CloneOutcome) {
    let target = outcome.target_path.display();
    match &outcome.status {
        CloneStatus::Cloned => {
            println!("   {} {} -> {}", "+".green(), outcome.remote_url.cyan(), target);
        }
        CloneStatus::WouldClone => {
            println!(
                "   {} {} -> {} {}",
                "+".yellow(),
                outcome.remote_url.cyan(),
                target,
                "(dry-run)".dimmed()
            );
        }
        CloneStatus::Skipped(reason) => {
            println!("   {} {} ({})", "-".dimmed(), target, reason.to_string().dimmed());
        }
        CloneStatus::Failed { exit_code } => {
            println!(
                "   {} {} -> {} (exit code {})",
                "x".red().bold(),
                outcome.remote_url,
                target,
                exit_code
            );
        }
    }
}

/// Turn failed clones into a command error so the process exits non-zero.
fn check_failures(outcomes: &[CloneOutcome]) -> Result<()> {
    let failed = outcomes
        .iter()
        .filter(|outcome| outcome.status.is_failure())
        .count();

    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::user(format!("{failed} clone(s) failed")))
    }
}
