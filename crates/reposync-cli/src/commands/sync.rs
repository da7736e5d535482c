//! Sync command implementation
//!
//! Reconciles a local root with the shared manifest, clones what is missing
//! and writes the manifest back when the inventory changed.

use std::path::{Path, PathBuf};

use colored::Colorize;
use reposync_core::{
    CloneStatus, ExistingPolicy, ManifestFormat, Settings, SyncOptions, SyncReport,
};
use reposync_fs::SyncPath;

use crate::error::{CliError, Result};

/// Flags of the sync command after clap parsing
#[derive(Debug, Clone, Default)]
pub struct SyncArgs {
    pub path: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
    pub existing: ExistingPolicy,
    pub dry_run: bool,
    pub check_remote: bool,
    pub format: Option<ManifestFormat>,
    pub machine: String,
    pub json: bool,
}

/// Run the sync command
pub fn run_sync(settings: &Settings, args: SyncArgs) -> Result<()> {
    let local_dir = args
        .path
        .or_else(|| settings.local_path.clone())
        .ok_or_else(|| {
            CliError::user("No local root given; pass <PATH> or set local_path in the settings")
        })?;
    let manifest_path = resolve_manifest(args.manifest, settings, &local_dir);

    let options = SyncOptions {
        dry_run: args.dry_run,
        existing: args.existing,
        check_remote: args.check_remote && settings.check_remote,
        format: args.format,
        machine: args.machine,
    };

    if !args.json {
        let mode = if options.dry_run { " (dry-run)" } else { "" };
        println!(
            "{} Syncing {} with {}{}",
            "=>".blue().bold(),
            local_dir.display(),
            manifest_path.display(),
            mode.yellow()
        );
    }

    let engine = super::engine(settings)?;
    let report = engine.sync_with_options(&local_dir, &manifest_path, &options)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    super::check_failures(&report.outcomes)
}

/// Flag first, then settings, then `repositories.json` inside the root.
fn resolve_manifest(flag: Option<PathBuf>, settings: &Settings, local_dir: &Path) -> PathBuf {
    flag.or_else(|| settings.manifest_path.clone())
        .unwrap_or_else(|| local_dir.join(SyncPath::DefaultManifest))
}

fn print_report(report: &SyncReport) {
    for action in &report.actions {
        println!("   {} {}", "~".cyan(), action);
    }

    // Clones already appear as actions
    let unfinished = report.outcomes.iter().filter(|outcome| {
        !matches!(outcome.status, CloneStatus::Cloned | CloneStatus::WouldClone)
    });
    for outcome in unfinished {
        super::print_outcome(outcome);
    }

    let manifest = if report.persisted {
        "manifest updated".green().to_string()
    } else if report.changed || !report.manifest_existed {
        "manifest not written".yellow().to_string()
    } else {
        "manifest up to date".dimmed().to_string()
    };

    println!(
        "{} {} records, {}",
        "OK".green().bold(),
        report.records.len(),
        manifest
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_flag_wins() {
        let settings = Settings {
            manifest_path: Some(PathBuf::from("/share/settings.json")),
            ..Settings::default()
        };
        let path = resolve_manifest(
            Some(PathBuf::from("/share/flag.xml")),
            &settings,
            Path::new("/work"),
        );
        assert_eq!(path, PathBuf::from("/share/flag.xml"));
    }

    #[test]
    fn manifest_from_settings() {
        let settings = Settings {
            manifest_path: Some(PathBuf::from("/share/settings.json")),
            ..Settings::default()
        };
        let path = resolve_manifest(None, &settings, Path::new("/work"));
        assert_eq!(path, PathBuf::from("/share/settings.json"));
    }

    #[test]
    fn manifest_defaults_inside_root() {
        let path = resolve_manifest(None, &Settings::default(), Path::new("/work"));
        assert_eq!(path, Path::new("/work").join("repositories.json"));
    }

    #[test]
    fn missing_root_is_a_user_error() {
        let error = run_sync(&Settings::default(), SyncArgs::default()).unwrap_err();
        assert!(matches!(error, CliError::User { .. }));
    }
}
