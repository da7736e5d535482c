//! End-to-end sync runs
//!
//! A run moves through [`SyncState`] in order. Loading is skipped when the
//! manifest does not exist yet, and persisting only happens when the
//! reconciled set differs from the manifest or there was no manifest. In dry
//! run mode every mutating step is replaced by an action line describing what
//! would have happened.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reposync_fs::RobustnessConfig;
use reposync_git::VcsClient;
use serde::Serialize;

use crate::clone::{CloneOrchestrator, ExistingPolicy};
use crate::config::Settings;
use crate::manifest::{self, ManifestFormat};
use crate::reconcile::reconcile;
use crate::record::{CloneOutcome, CloneRequest, CloneStatus, RepositoryRecord, absolute_root};
use crate::scanner::{DEFAULT_PROBE_TIMEOUT, DEFAULT_REMOTE, RepositoryScanner};
use crate::Result;

/// Stages of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    Start,
    LoadManifest,
    ScanLocal,
    Reconcile,
    CloneMissing,
    Persist,
    Done,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::LoadManifest => "load-manifest",
            Self::ScanLocal => "scan-local",
            Self::Reconcile => "reconcile",
            Self::CloneMissing => "clone-missing",
            Self::Persist => "persist",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Options for sync and restore runs
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// If true, simulate changes without modifying the filesystem.
    /// Actions will be prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
    pub existing: ExistingPolicy,
    /// Probe remotes of scanned checkouts
    pub check_remote: bool,
    /// Manifest format override; otherwise the extension decides
    pub format: Option<ManifestFormat>,
    /// Identity matched against system filters
    pub machine: String,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            existing: ExistingPolicy::default(),
            check_remote: true,
            format: None,
            machine: String::new(),
        }
    }
}

/// Report from a sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    /// Reconciled record set, ordered by relative path
    pub records: Vec<RepositoryRecord>,
    pub outcomes: Vec<CloneOutcome>,
    /// Whether the reconciled set differs from the manifest
    pub changed: bool,
    pub manifest_existed: bool,
    /// Whether the manifest was written
    pub persisted: bool,
    /// Human-readable actions taken (or that would be taken in dry-run mode)
    pub actions: Vec<String>,
    /// Last state reached
    pub state: SyncState,
}

impl SyncReport {
    /// Whether any clone failed.
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|outcome| outcome.status.is_failure())
    }
}

/// Runs scans, syncs and restores against one version-control client.
pub struct SyncEngine<C: VcsClient> {
    client: C,
    remote_name: String,
    probe_timeout: Duration,
    default_format: ManifestFormat,
    robustness: RobustnessConfig,
}

impl<C: VcsClient> SyncEngine<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            remote_name: DEFAULT_REMOTE.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            default_format: ManifestFormat::default(),
            robustness: RobustnessConfig::default(),
        }
    }

    /// Apply remote name, probe timeout and default format from `settings`.
    pub fn with_settings(mut self, settings: &Settings) -> Self {
        self.remote_name = settings.remote_name.clone();
        self.probe_timeout = settings.probe_timeout();
        self.default_format = settings.manifest_format;
        self
    }

    /// Retry policy for manifest writes.
    pub fn with_robustness(mut self, robustness: RobustnessConfig) -> Self {
        self.robustness = robustness;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn scanner(&self) -> RepositoryScanner<'_> {
        RepositoryScanner::new(&self.client)
            .with_remote_name(self.remote_name.clone())
            .with_probe_timeout(self.probe_timeout)
    }

    fn orchestrator<'a>(&'a self, options: &'a SyncOptions) -> CloneOrchestrator<'a> {
        CloneOrchestrator::new(&self.client, &options.machine)
            .with_policy(options.existing)
            .with_dry_run(options.dry_run)
    }

    /// Discover the checkouts under `root`.
    pub fn scan(&self, root: &Path, check_remote: bool) -> Result<Vec<RepositoryRecord>> {
        self.scanner().scan(root, check_remote)
    }

    /// Sync `local_dir` with the manifest at `manifest_path`.
    ///
    /// # Errors
    ///
    /// Fails when the manifest exists but cannot be read or parsed, when the
    /// root cannot be created or scanned, or when the manifest write fails.
    /// Per-record problems are reported in [`SyncReport::outcomes`] instead.
    pub fn sync_with_options(
        &self,
        local_dir: &Path,
        manifest_path: &Path,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let mut actions = Vec::new();
        let prefix = if options.dry_run { "[dry-run] Would " } else { "" };
        let format = ManifestFormat::resolve(manifest_path, options.format, self.default_format);
        transition(SyncState::Start);

        let manifest_existed = manifest_path.exists();
        let manifest_records = if manifest_existed {
            transition(SyncState::LoadManifest);
            manifest::load(manifest_path, format)?
        } else {
            tracing::info!(path = %manifest_path.display(), "No manifest yet, starting empty");
            Vec::new()
        };

        transition(SyncState::ScanLocal);
        let root = absolute_root(local_dir)?;
        let local_records = if local_dir.is_dir() {
            self.scan(local_dir, options.check_remote)?
        } else {
            if !options.dry_run {
                fs::create_dir_all(local_dir)?;
            }
            tracing::info!(path = %root, dry_run = options.dry_run, "Creating missing root");
            actions.push(format!("{}{} root {root}", prefix, verb(options.dry_run, "Created", "create")));
            Vec::new()
        };

        transition(SyncState::Reconcile);
        let reconciliation = reconcile(local_records, manifest_records, &root);

        transition(SyncState::CloneMissing);
        let outcomes = self
            .orchestrator(options)
            .materialize(&reconciliation.to_clone, local_dir);
        actions.extend(outcomes.iter().filter_map(describe_outcome));

        let persist = reconciliation.changed || !manifest_existed;
        let mut persisted = false;
        if persist {
            transition(SyncState::Persist);
            if !options.dry_run {
                manifest::save(manifest_path, &reconciliation.records, format, self.robustness)?;
                persisted = true;
            }
            actions.push(format!(
                "{}{} {} records to {}",
                prefix,
                verb(options.dry_run, "Wrote", "write"),
                reconciliation.records.len(),
                manifest_path.display()
            ));
        } else {
            tracing::info!(path = %manifest_path.display(), "Manifest already up to date");
        }

        transition(SyncState::Done);
        Ok(SyncReport {
            records: reconciliation.records,
            outcomes,
            changed: reconciliation.changed,
            manifest_existed,
            persisted,
            actions,
            state: SyncState::Done,
        })
    }

    /// Clone every record into `destination`.
    ///
    /// Records pass through the same gates as during a sync. The destination
    /// is created when missing, except in dry-run mode.
    pub fn restore(
        &self,
        records: &[RepositoryRecord],
        destination: &Path,
        options: &SyncOptions,
    ) -> Result<Vec<CloneOutcome>> {
        if !destination.exists() && !options.dry_run {
            tracing::info!(path = %destination.display(), "Creating restore destination");
            fs::create_dir_all(destination)?;
        }

        let queue: Vec<CloneRequest> = records.iter().map(CloneRequest::from_record).collect();
        Ok(self.orchestrator(options).materialize(&queue, destination))
    }
}

fn transition(state: SyncState) {
    tracing::info!(%state, "Sync state");
}

fn verb(dry_run: bool, done: &'static str, would: &'static str) -> &'static str {
    if dry_run { would } else { done }
}

fn describe_outcome(outcome: &CloneOutcome) -> Option<String> {
    let target = outcome.target_path.display();
    match outcome.status {
        CloneStatus::Cloned => Some(format!("Cloned {} into {target}", outcome.remote_url)),
        CloneStatus::WouldClone => {
            Some(format!("[dry-run] Would clone {} into {target}", outcome.remote_url))
        }
        _ => None,
    }
}
