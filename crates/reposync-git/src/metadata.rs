//! Checkout metadata read straight from the `.git` directory

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use git2::{ConfigLevel, Repository};
use reposync_fs::SyncPath;
use walkdir::WalkDir;

use crate::Result;

/// Identity and activity information for one checkout.
///
/// Empty strings and `None` mean the value is not configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutMetadata {
    pub remote_name: String,
    pub remote_url: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub status_date: Option<DateTime<Utc>>,
}

/// Whether `dir` directly contains a `.git` directory.
pub fn has_checkout_marker(dir: &Path) -> bool {
    dir.join(SyncPath::GitDir).is_dir()
}

/// Read remote, identity and status date from the checkout at `checkout`.
///
/// The remote named `preferred_remote` is used when configured, otherwise the
/// first remote. Identity fields only come from the checkout's own config, so
/// a global `user.name` never leaks into the manifest.
pub fn read_metadata(checkout: &Path, preferred_remote: &str) -> Result<CheckoutMetadata> {
    let repo = Repository::open(checkout)?;
    let (remote_name, remote_url) = select_remote(&repo, preferred_remote)?;
    let (user_name, user_email) = local_identity(&repo);

    Ok(CheckoutMetadata {
        remote_name,
        remote_url,
        user_name,
        user_email,
        status_date: last_ref_update(repo.path()),
    })
}

fn select_remote(repo: &Repository, preferred: &str) -> Result<(String, String)> {
    let remotes = repo.remotes()?;
    let name = if remotes.iter().flatten().any(|name| name == preferred) {
        Some(preferred.to_string())
    } else {
        remotes.iter().flatten().next().map(str::to_string)
    };

    let Some(name) = name else {
        return Ok((String::new(), String::new()));
    };

    let url = repo
        .find_remote(&name)?
        .url()
        .unwrap_or_default()
        .to_string();
    Ok((name, url))
}

fn local_identity(repo: &Repository) -> (Option<String>, Option<String>) {
    let Ok(local) = repo
        .config()
        .and_then(|config| config.open_level(ConfigLevel::Local))
    else {
        return (None, None);
    };

    let read = |key: &str| {
        local
            .get_string(key)
            .ok()
            .filter(|value| !value.trim().is_empty())
    };
    (read("user.name"), read("user.email"))
}

/// Most recent ref update inside `git_dir`.
///
/// Considers every file under `refs/` plus `packed-refs`, `logs/HEAD` and
/// `FETCH_HEAD`. Falls back to the modification time of `git_dir` itself.
pub fn last_ref_update(git_dir: &Path) -> Option<DateTime<Utc>> {
    let ref_files = WalkDir::new(git_dir.join("refs"))
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok()?.modified().ok());

    let loose = ["packed-refs", "logs/HEAD", "FETCH_HEAD"]
        .iter()
        .filter_map(|name| modified(&git_dir.join(name)));

    ref_files
        .chain(loose)
        .max()
        .or_else(|| modified(git_dir))
        .map(DateTime::<Utc>::from)
}

fn modified(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
