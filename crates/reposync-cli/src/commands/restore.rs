//! Restore command implementation

use std::path::Path;

use colored::Colorize;
use reposync_core::{ExistingPolicy, ManifestFormat, Settings, SyncOptions, manifest};

use crate::error::{CliError, Result};

/// Run the restore command
///
/// Clones every manifest entry that applies to `machine` into `destination`.
pub fn run_restore(
    settings: &Settings,
    manifest_path: &Path,
    destination: &Path,
    existing: ExistingPolicy,
    dry_run: bool,
    format: Option<ManifestFormat>,
    machine: String,
) -> Result<()> {
    if !manifest_path.is_file() {
        return Err(CliError::user(format!(
            "Manifest not found: {}",
            manifest_path.display()
        )));
    }

    let format = ManifestFormat::resolve(manifest_path, format, settings.manifest_format);
    let records = manifest::load(manifest_path, format)?;

    let mode = if dry_run { " (dry-run)" } else { "" };
    println!(
        "{} Restoring {} repositories into {}{}",
        "=>".blue().bold(),
        records.len(),
        destination.display(),
        mode.yellow()
    );

    let options = SyncOptions {
        dry_run,
        existing,
        format: Some(format),
        machine,
        ..SyncOptions::default()
    };

    let engine = super::engine(settings)?;
    let outcomes = engine.restore(&records, destination, &options)?;

    for outcome in &outcomes {
        super::print_outcome(outcome);
    }

    super::check_failures(&outcomes)?;
    println!("{} Restore finished", "OK".green().bold());
    Ok(())
}
