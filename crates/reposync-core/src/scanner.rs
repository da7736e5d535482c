//! Breadth-first discovery of checkouts under a root directory

use std::collections::VecDeque;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use reposync_fs::{NormalizedPath, RelativePath, SyncPath};
use reposync_git::{CheckoutMetadata, VcsClient, has_checkout_marker, last_ref_update, read_metadata};

use crate::record::{RepositoryRecord, absolute_root};
use crate::{Error, Result};

/// Default remote consulted for each checkout.
pub const DEFAULT_REMOTE: &str = "origin";

/// Default bound on one reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Walks a directory tree and describes every checkout it finds.
///
/// A directory containing `.git` is a checkout root and a leaf: nothing below
/// it is enumerated, so submodules and vendored checkouts are never reported
/// separately. Symbolic links are not followed.
pub struct RepositoryScanner<'a> {
    client: &'a dyn VcsClient,
    remote_name: String,
    probe_timeout: Duration,
}

impl<'a> RepositoryScanner<'a> {
    /// Create a scanner that probes remotes through `client`.
    pub fn new(client: &'a dyn VcsClient) -> Self {
        Self {
            client,
            remote_name: DEFAULT_REMOTE.to_string(),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Prefer this remote name when a checkout has several.
    pub fn with_remote_name(mut self, remote_name: impl Into<String>) -> Self {
        self.remote_name = remote_name.into();
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Scan `root` and return one record per checkout, ordered by relative path.
    ///
    /// Directories that cannot be enumerated are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootNotFound`] if `root` is not a directory.
    pub fn scan(&self, root: &Path, check_remote: bool) -> Result<Vec<RepositoryRecord>> {
        if !root.is_dir() {
            return Err(Error::RootNotFound {
                path: root.to_path_buf(),
            });
        }

        let root_path = absolute_root(root)?;
        let mut records = Vec::new();
        let mut queue = VecDeque::from([root.to_path_buf()]);

        while let Some(dir) = queue.pop_front() {
            if has_checkout_marker(&dir) {
                let relative = relative_to(root, &dir);
                tracing::debug!(path = %relative, "Found checkout");
                records.push(self.describe(&root_path, &relative, &dir, check_remote));
                continue;
            }

            queue.extend(child_directories(&dir));
        }

        records.sort_by_key(RepositoryRecord::relative);
        Ok(records)
    }

    fn describe(
        &self,
        root: &NormalizedPath,
        relative: &RelativePath,
        dir: &Path,
        check_remote: bool,
    ) -> RepositoryRecord {
        let metadata = read_metadata(dir, &self.remote_name).unwrap_or_else(|e| {
            tracing::warn!(path = %dir.display(), error = %e, "Could not read checkout metadata");
            CheckoutMetadata {
                status_date: last_ref_update(&dir.join(SyncPath::GitDir)),
                ..CheckoutMetadata::default()
            }
        });

        let is_remote_accessible = check_remote.then(|| {
            if metadata.remote_url.trim().is_empty() {
                return false;
            }
            self.client.probe_remote(&metadata.remote_url, self.probe_timeout)
        });

        RepositoryRecord {
            remote_name: metadata.remote_name,
            remote_url: metadata.remote_url,
            user_name: metadata.user_name,
            user_email: metadata.user_email,
            status_date: metadata.status_date,
            is_remote_accessible,
            ..RepositoryRecord::new(root, relative)
        }
    }
}

/// Subdirectories of `dir`, excluding `.git` and symbolic links.
fn child_directories(dir: &Path) -> Vec<PathBuf> {
    tracing::debug!(path = %dir.display(), "Enumerating directory");

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable directory");
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(path = %dir.display(), error = %e, "Skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_ok_and(|file_type| file_type.is_dir()))
        .filter(|entry| entry.file_name() != SyncPath::GitDir.as_str())
        .map(|entry| entry.path())
        .collect()
}

/// Path of `dir` relative to `root`; the root itself is `"."`.
fn relative_to(root: &Path, dir: &Path) -> RelativePath {
    let Ok(stripped) = dir.strip_prefix(root) else {
        return RelativePath::root();
    };

    let segments: Vec<String> = stripped
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    RelativePath::normalize(&segments.join("/"))
}
