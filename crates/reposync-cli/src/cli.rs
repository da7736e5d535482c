//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use reposync_core::{ExistingPolicy, ManifestFormat};

/// Keep git checkouts on several machines in step through a shared manifest
#[derive(Parser, Debug)]
#[command(name = "reposync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to <config dir>/reposync/settings.toml)
    #[arg(long, global = true, env = "REPOSYNC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// List the git checkouts under a directory
    Scan {
        /// Directory to scan
        path: PathBuf,

        /// Do not probe whether remotes answer
        #[arg(long)]
        no_remote_check: bool,

        /// Write the records to this manifest instead of printing them
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Manifest format (json, csv, xml, toml, yaml)
        #[arg(long, value_parser = parse_format)]
        format: Option<ManifestFormat>,
    },

    /// Reconcile a local root with the manifest and clone what is missing
    Sync {
        /// Local root (defaults to local_path from settings)
        path: Option<PathBuf>,

        /// Manifest file (defaults to manifest_path from settings)
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        #[command(flatten)]
        existing: ExistingArgs,

        /// Preview changes without modifying anything
        #[arg(long)]
        dry_run: bool,

        /// Do not probe whether remotes answer
        #[arg(long)]
        no_remote_check: bool,

        /// Manifest format (json, csv, xml, toml, yaml)
        #[arg(long, value_parser = parse_format)]
        format: Option<ManifestFormat>,

        /// Machine identity matched against system filters
        #[arg(long, env = "REPOSYNC_MACHINE")]
        machine: Option<String>,

        /// Print the sync report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clone every manifest entry into a destination directory
    Restore {
        /// Manifest file to restore from
        #[arg(short, long)]
        manifest: PathBuf,

        /// Directory to clone into
        #[arg(short, long)]
        destination: PathBuf,

        #[command(flatten)]
        existing: ExistingArgs,

        /// Preview clones without modifying anything
        #[arg(long)]
        dry_run: bool,

        /// Manifest format (json, csv, xml, toml, yaml)
        #[arg(long, value_parser = parse_format)]
        format: Option<ManifestFormat>,

        /// Machine identity matched against system filters
        #[arg(long, env = "REPOSYNC_MACHINE")]
        machine: Option<String>,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// What to do with clone targets that already exist
#[derive(Args, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExistingArgs {
    /// Delete existing targets and clone again
    #[arg(long, conflicts_with = "skip_existing")]
    pub force: bool,

    /// Skip existing targets without a warning
    #[arg(long)]
    pub skip_existing: bool,
}

impl ExistingArgs {
    pub fn policy(self) -> ExistingPolicy {
        if self.force {
            ExistingPolicy::Force
        } else if self.skip_existing {
            ExistingPolicy::SkipExisting
        } else {
            ExistingPolicy::Plain
        }
    }
}

fn parse_format(value: &str) -> Result<ManifestFormat, String> {
    value.parse().map_err(|e: reposync_core::Error| e.to_string())
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
    fn parse_scan_command() {
        let cli = Cli::parse_from(["reposync", "scan", "/work"]);
        match cli.command {
            Commands::Scan {
                path,
                no_remote_check,
                output,
                format,
            } => {
                assert_eq!(path, PathBuf::from("/work"));
                assert!(!no_remote_check);
                assert!(output.is_none());
                assert!(format.is_none());
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn parse_scan_with_output_and_format() {
        let cli = Cli::parse_from([
            "reposync",
            "scan",
            "/work",
            "--no-remote-check",
            "-o",
            "inventory.txt",
            "--format",
            "CSV",
        ]);
        match cli.command {
            Commands::Scan {
                no_remote_check,
                output,
                format,
                ..
            } => {
                assert!(no_remote_check);
                assert_eq!(output, Some(PathBuf::from("inventory.txt")));
                assert_eq!(format, Some(ManifestFormat::Csv));
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn parse_scan_rejects_unknown_format() {
        let result = Cli::try_parse_from(["reposync", "scan", "/work", "--format", "ini"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_sync_defaults() {
        let cli = Cli::parse_from(["reposync", "sync"]);
        match cli.command {
            Commands::Sync {
                path,
                manifest,
                existing,
                dry_run,
                json,
                ..
            } => {
                assert!(path.is_none());
                assert!(manifest.is_none());
                assert_eq!(existing.policy(), ExistingPolicy::Plain);
                assert!(!dry_run);
                assert!(!json);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn parse_sync_with_flags() {
        let cli = Cli::parse_from([
            "reposync",
            "sync",
            "/work",
            "--manifest",
            "/share/repositories.xml",
            "--force",
            "--dry-run",
            "--machine",
            "BUILD-01",
            "--json",
        ]);
        match cli.command {
            Commands::Sync {
                path,
                manifest,
                existing,
                dry_run,
                machine,
                json,
                ..
            } => {
                assert_eq!(path, Some(PathBuf::from("/work")));
                assert_eq!(manifest, Some(PathBuf::from("/share/repositories.xml")));
                assert_eq!(existing.policy(), ExistingPolicy::Force);
                assert!(dry_run);
                assert_eq!(machine.as_deref(), Some("BUILD-01"));
                assert!(json);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn parse_sync_skip_existing() {
        let cli = Cli::parse_from(["reposync", "sync", "--skip-existing"]);
        match cli.command {
            Commands::Sync { existing, .. } => {
                assert_eq!(existing.policy(), ExistingPolicy::SkipExisting);
            }
            _ => panic!("Expected Sync command"),
        }
    }

    #[test]
    fn parse_force_conflicts_with_skip_existing() {
        let result = Cli::try_parse_from(["reposync", "sync", "--force", "--skip-existing"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_restore_command() {
        let cli = Cli::parse_from([
            "reposync",
            "restore",
            "-m",
            "repositories.json",
            "-d",
            "/restore",
        ]);
        match cli.command {
            Commands::Restore {
                manifest,
                destination,
                existing,
                dry_run,
                ..
            } => {
                assert_eq!(manifest, PathBuf::from("repositories.json"));
                assert_eq!(destination, PathBuf::from("/restore"));
                assert_eq!(existing.policy(), ExistingPolicy::Plain);
                assert!(!dry_run);
            }
            _ => panic!("Expected Restore command"),
        }
    }

    #[test]
    fn parse_restore_requires_destination() {
        let result = Cli::try_parse_from(["reposync", "restore", "-m", "repositories.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "reposync",
            "scan",
            "/work",
            "--verbose",
            "--config",
            "/etc/reposync.toml",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/etc/reposync.toml")));
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["reposync", "completions", "bash"]);
        assert!(matches!(cli.command, Commands::Completions { shell: Shell::Bash }));
    }
}
