//! Multi-machine sync scenarios
//!
//! Each test simulates several machines sharing one manifest on a common
//! share. Machines are separate root directories; clones go through the real
//! `git` executable against local bare remotes.

use std::fs;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use reposync_core::manifest;
use reposync_core::{
    CloneStatus, ExistingPolicy, ManifestFormat, RepositoryRecord, SkipReason, SyncEngine,
    SyncOptions, SyncReport,
};
use reposync_git::{GitCli, VcsClient};
use reposync_test_utils::git::bare_remote_with_commit;
use tempfile::TempDir;

// =============================================================================
// Test Infrastructure
// =============================================================================

/// A share holding bare remotes and the manifest, plus one root per machine.
struct Fleet {
    temp: TempDir,
    manifest: PathBuf,
}

impl Fleet {
    fn new(manifest_name: &str) -> Self {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("share")).unwrap();
        let manifest = temp.path().join("share").join(manifest_name);
        Self { temp, manifest }
    }

    /// Create a bare remote with one commit and return its URL.
    fn remote(&self, name: &str) -> String {
        let path = self.temp.path().join("remotes").join(format!("{name}.git"));
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        bare_remote_with_commit(&path).to_string_lossy().into_owned()
    }

    fn root(&self, machine: &str) -> PathBuf {
        self.temp.path().join("machines").join(machine)
    }

    fn engine(&self) -> SyncEngine<GitCli> {
        SyncEngine::new(GitCli::locate().unwrap())
    }

    /// Clone `url` by hand, as a user would, into `machine`'s root.
    fn clone_by_hand(&self, machine: &str, relative: &str, url: &str) {
        let target = self.root(machine).join(relative);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        let code = GitCli::locate().unwrap().clone_recursive(url, &target).unwrap();
        assert_eq!(code, 0, "clone of {url} failed");
    }

    fn sync(&self, machine: &str) -> SyncReport {
        self.sync_with(machine, SyncOptions::default())
    }

    fn sync_with(&self, machine: &str, options: SyncOptions) -> SyncReport {
        let options = SyncOptions {
            machine: machine.to_string(),
            ..options
        };
        self.engine()
            .sync_with_options(&self.root(machine), &self.manifest, &options)
            .unwrap()
    }

    fn manifest_records(&self) -> Vec<RepositoryRecord> {
        let format = ManifestFormat::resolve(&self.manifest, None, ManifestFormat::default());
        manifest::load(&self.manifest, format).unwrap()
    }

    fn edit_manifest(&self, edit: impl FnOnce(&mut Vec<RepositoryRecord>)) {
        let format = ManifestFormat::resolve(&self.manifest, None, ManifestFormat::default());
        let mut records = self.manifest_records();
        edit(&mut records);
        manifest::save(&self.manifest, &records, format, Default::default()).unwrap();
    }
}

fn relative_paths(records: &[RepositoryRecord]) -> Vec<&str> {
    records.iter().map(|r| r.relative_path.as_str()).collect()
}

fn local_config(checkout: &Path, key: &str) -> Option<String> {
    let repo = git2::Repository::open(checkout).unwrap();
    let config = repo.config().unwrap().open_level(git2::ConfigLevel::Local).unwrap();
    config.get_string(key).ok()
}

// =============================================================================
// Inventory propagation
// =============================================================================

#[test]
fn test_first_machine_publishes_inventory() {
    let fleet = Fleet::new("repositories.xml");
    let core = fleet.remote("core");
    let cli = fleet.remote("cli");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.clone_by_hand("alpha", "tools/cli", &cli);

    let report = fleet.sync("alpha");

    assert!(report.persisted);
    assert!(report.outcomes.is_empty());
    let records = fleet.manifest_records();
    assert_eq!(relative_paths(&records), vec!["libs/core", "tools/cli"]);
    assert_eq!(records[0].remote_url, core);
    assert_eq!(records[0].remote_name, "origin");
    assert_eq!(records[0].is_remote_accessible, Some(true));
    assert!(records[0].status_date.is_some());
}

#[test]
fn test_second_machine_clones_everything_then_settles() {
    let fleet = Fleet::new("repositories.xml");
    let core = fleet.remote("core");
    let cli = fleet.remote("cli");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.clone_by_hand("alpha", "tools/cli", &cli);
    fleet.sync("alpha");

    let first = fleet.sync("beta");

    assert_eq!(first.outcomes.len(), 2);
    assert!(first.outcomes.iter().all(|o| o.status == CloneStatus::Cloned));
    assert!(fleet.root("beta").join("libs/core/README.md").exists());
    assert!(fleet.root("beta").join("tools/cli/README.md").exists());
    assert!(first.persisted, "rebasing onto beta's root is a change");

    let second = fleet.sync("beta");

    assert!(second.outcomes.is_empty());
    assert!(!second.changed);
    assert!(!second.persisted);
    assert_eq!(relative_paths(&second.records), vec!["libs/core", "tools/cli"]);
}

#[test]
fn test_checkout_added_on_second_machine_reaches_first() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    let docs = fleet.remote("docs");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    fleet.sync("beta");

    fleet.clone_by_hand("beta", "docs", &docs);
    let beta = fleet.sync("beta");
    assert!(beta.changed);

    let alpha = fleet.sync("alpha");

    assert_eq!(alpha.outcomes.len(), 1);
    assert_eq!(alpha.outcomes[0].remote_url, docs);
    assert!(fleet.root("alpha").join("docs/README.md").exists());
    assert_eq!(relative_paths(&alpha.records), vec!["docs", "libs/core"]);
}

#[test]
fn test_drifted_root_is_rewritten_for_current_machine() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    fleet.sync("beta");

    let alpha = fleet.sync("alpha");

    assert!(alpha.changed);
    let alpha_root = fleet.root("alpha").to_string_lossy().replace('\\', "/");
    assert_eq!(fleet.manifest_records()[0].root_path, alpha_root);
}

// =============================================================================
// Gates
// =============================================================================

#[test]
fn test_system_filter_keeps_entry_off_excluded_machine() {
    let fleet = Fleet::new("repositories.yaml");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    fleet.edit_manifest(|records| records[0].system_filter = Some("!build-*".into()));

    let report = fleet.sync("BUILD-07");

    assert_eq!(
        report.outcomes[0].status,
        CloneStatus::Skipped(SkipReason::FilteredOut)
    );
    assert!(!fleet.root("BUILD-07").join("libs/core").exists());
    assert_eq!(
        fleet.manifest_records()[0].system_filter.as_deref(),
        Some("!build-*")
    );
}

#[test]
fn test_unreachable_entry_is_not_queued() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    fleet.edit_manifest(|records| records[0].is_remote_accessible = Some(false));

    let report = fleet.sync("beta");

    assert!(report.outcomes.is_empty());
    assert!(!fleet.root("beta").join("libs/core").exists());
    assert_eq!(relative_paths(&report.records), vec!["libs/core"]);
}

#[test]
fn test_identity_from_manifest_is_applied_after_clone() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    fleet.edit_manifest(|records| {
        records[0].user_name = Some("Build Bot".into());
        records[0].user_email = Some("bot@example.com".into());
    });

    fleet.sync("beta");

    let checkout = fleet.root("beta").join("libs/core");
    assert_eq!(local_config(&checkout, "user.name").as_deref(), Some("Build Bot"));
    assert_eq!(
        local_config(&checkout, "user.email").as_deref(),
        Some("bot@example.com")
    );
}

#[test]
fn test_existing_target_policies() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");

    // A plain directory is not a checkout, so the entry stays queued
    let blocker = fleet.root("beta").join("libs/core");
    fs::create_dir_all(&blocker).unwrap();
    fs::write(blocker.join("notes.txt"), "local work").unwrap();

    let skipped = fleet.sync_with(
        "beta",
        SyncOptions {
            existing: ExistingPolicy::SkipExisting,
            ..SyncOptions::default()
        },
    );
    assert_eq!(
        skipped.outcomes[0].status,
        CloneStatus::Skipped(SkipReason::AlreadyExists)
    );
    assert!(blocker.join("notes.txt").exists());

    let forced = fleet.sync_with(
        "beta",
        SyncOptions {
            existing: ExistingPolicy::Force,
            ..SyncOptions::default()
        },
    );
    assert_eq!(forced.outcomes[0].status, CloneStatus::Cloned);
    assert!(!blocker.join("notes.txt").exists());
    assert!(blocker.join("README.md").exists());
}

#[test]
fn test_dry_run_on_new_machine_changes_nothing() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    let before = fs::read_to_string(&fleet.manifest).unwrap();

    let report = fleet.sync_with(
        "gamma",
        SyncOptions {
            dry_run: true,
            ..SyncOptions::default()
        },
    );

    assert_eq!(report.outcomes[0].status, CloneStatus::WouldClone);
    assert!(!report.persisted);
    assert!(report.actions.iter().all(|a| a.starts_with("[dry-run] Would ")));
    assert!(!fleet.root("gamma").exists());
    assert_eq!(fs::read_to_string(&fleet.manifest).unwrap(), before);
}

#[test]
fn test_failed_clone_does_not_stop_the_batch() {
    let fleet = Fleet::new("repositories.json");
    let core = fleet.remote("core");
    fleet.clone_by_hand("alpha", "libs/core", &core);
    fleet.sync("alpha");
    let missing = fleet.temp.path().join("remotes/missing.git");
    fleet.edit_manifest(|records| {
        let mut broken = records[0].clone();
        broken.relative_path = "libs/broken".into();
        broken.remote_url = missing.to_string_lossy().into_owned();
        records.insert(0, broken);
    });

    let report = fleet.sync("beta");

    assert!(report.has_failures());
    assert!(matches!(report.outcomes[0].status, CloneStatus::Failed { .. }));
    assert_eq!(report.outcomes[1].status, CloneStatus::Cloned);
    assert!(fleet.root("beta").join("libs/core/README.md").exists());
}
