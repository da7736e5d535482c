//! Restoring a machine from an exported manifest
//!
//! A manifest exported from one root is cloned into an empty destination in
//! every supported format.

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use reposync_core::manifest;
use reposync_core::{CloneStatus, ManifestFormat, SkipReason, SyncEngine, SyncOptions};
use reposync_fs::RobustnessConfig;
use reposync_git::{GitCli, VcsClient};
use reposync_test_utils::git::bare_remote_with_commit;
use tempfile::TempDir;

fn seeded_root(temp: &Path) -> std::path::PathBuf {
    let git = GitCli::locate().unwrap();
    let root = temp.join("source");
    for (relative, name) in [("apps/web", "web"), ("libs/core", "core")] {
        let remote = bare_remote_with_commit(&temp.join(format!("{name}.git")));
        let target = root.join(relative);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        let url = remote.to_string_lossy().into_owned();
        assert_eq!(git.clone_recursive(&url, &target).unwrap(), 0);
    }
    root
}

#[test]
fn test_export_then_restore_in_every_format() {
    let temp = TempDir::new().unwrap();
    let root = seeded_root(temp.path());
    let engine = SyncEngine::new(GitCli::locate().unwrap());
    let records = engine.scan(&root, false).unwrap();
    assert_eq!(records.len(), 2);

    for format in ManifestFormat::ALL {
        let manifest_path = temp.path().join(format!("export.{}", format.extension()));
        manifest::save(&manifest_path, &records, format, RobustnessConfig::no_retry()).unwrap();
        let loaded = manifest::load(&manifest_path, format).unwrap();

        let destination = temp.path().join(format!("restored-{format}"));
        let outcomes = engine
            .restore(&loaded, &destination, &SyncOptions::default())
            .unwrap();

        assert!(
            outcomes.iter().all(|o| o.status == CloneStatus::Cloned),
            "{format}: {outcomes:?}"
        );
        assert!(destination.join("apps/web/README.md").exists(), "{format}");
        assert!(destination.join("libs/core/README.md").exists(), "{format}");
    }
}

#[test]
fn test_restore_twice_skips_existing_checkouts() {
    let temp = TempDir::new().unwrap();
    let root = seeded_root(temp.path());
    let engine = SyncEngine::new(GitCli::locate().unwrap());
    let records = engine.scan(&root, false).unwrap();
    let destination = temp.path().join("restored");

    engine
        .restore(&records, &destination, &SyncOptions::default())
        .unwrap();
    let again = engine
        .restore(&records, &destination, &SyncOptions::default())
        .unwrap();

    assert!(
        again
            .iter()
            .all(|o| o.status == CloneStatus::Skipped(SkipReason::AlreadyExists))
    );
}

#[test]
fn test_restore_dry_run_creates_nothing() {
    let temp = TempDir::new().unwrap();
    let root = seeded_root(temp.path());
    let engine = SyncEngine::new(GitCli::locate().unwrap());
    let records = engine.scan(&root, false).unwrap();
    let destination = temp.path().join("restored");

    let outcomes = engine
        .restore(
            &records,
            &destination,
            &SyncOptions {
                dry_run: true,
                ..SyncOptions::default()
            },
        )
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.status == CloneStatus::WouldClone));
    assert!(!destination.exists());
}
