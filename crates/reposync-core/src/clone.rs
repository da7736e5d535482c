//! Materializing manifest-only checkouts
//!
//! Every request passes the same gates in order: remote URL and path present,
//! system filter, path safety, then the existing-target policy. A request that
//! fails a gate is reported and the batch moves on.

use std::fs;
use std::path::{Path, PathBuf};

use reposync_fs::{RelativePath, resolve_within_root};
use reposync_git::VcsClient;

use crate::filter;
use crate::record::{CloneOutcome, CloneRequest, CloneStatus, SkipReason};

/// What to do when a clone target already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExistingPolicy {
    /// Leave it alone and warn
    #[default]
    Plain,
    /// Leave it alone quietly
    SkipExisting,
    /// Delete it and clone again
    Force,
}

/// Clones queued records into a destination root.
pub struct CloneOrchestrator<'a> {
    client: &'a dyn VcsClient,
    machine: &'a str,
    policy: ExistingPolicy,
    dry_run: bool,
}

impl<'a> CloneOrchestrator<'a> {
    /// Create an orchestrator evaluating system filters against `machine`.
    pub fn new(client: &'a dyn VcsClient, machine: &'a str) -> Self {
        Self {
            client,
            machine,
            policy: ExistingPolicy::default(),
            dry_run: false,
        }
    }

    pub fn with_policy(mut self, policy: ExistingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Report [`CloneStatus::WouldClone`] instead of touching the disk.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Process `queue` in order, returning one outcome per request.
    pub fn materialize(&self, queue: &[CloneRequest], destination: &Path) -> Vec<CloneOutcome> {
        queue
            .iter()
            .map(|request| {
                let (target_path, status) = self.materialize_one(request, destination);
                CloneOutcome {
                    remote_url: request.remote_url.clone(),
                    target_path,
                    status,
                }
            })
            .collect()
    }

    fn materialize_one(&self, request: &CloneRequest, destination: &Path) -> (PathBuf, CloneStatus) {
        let relative = RelativePath::normalize(&request.relative_path);
        let naive_target = destination.join(relative.to_native());
        let skip = |reason| (naive_target.clone(), CloneStatus::Skipped(reason));

        if request.remote_url.trim().is_empty() {
            tracing::warn!(path = %relative, "Skipping clone: no remote URL");
            return skip(SkipReason::MissingRemoteUrl);
        }
        // Blank input normalizes to the root, which is never a clone target
        if relative.is_root() {
            tracing::warn!(url = %request.remote_url, "Skipping clone: empty relative path");
            return skip(SkipReason::EmptyPath);
        }
        if !filter::matches(request.system_filter.as_deref(), self.machine) {
            tracing::info!(
                path = %relative,
                filter = request.system_filter.as_deref().unwrap_or_default(),
                machine = self.machine,
                "Skipping clone: excluded by system filter"
            );
            return skip(SkipReason::FilteredOut);
        }

        // A dry run may target a root that was never created
        if self.dry_run && !destination.exists() {
            if relative.is_unsafe() {
                tracing::warn!(path = %relative, "Skipping clone: target out of scope");
                return skip(SkipReason::OutOfScope);
            }
            return (naive_target, CloneStatus::WouldClone);
        }

        let target = match resolve_within_root(destination, &relative) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(path = %relative, error = %e, "Skipping clone: target out of scope");
                return skip(SkipReason::OutOfScope);
            }
        };

        if target.exists() {
            match self.policy {
                ExistingPolicy::SkipExisting => {
                    tracing::info!(path = %target.display(), "Skipping clone: target exists");
                    return (target, CloneStatus::Skipped(SkipReason::AlreadyExists));
                }
                ExistingPolicy::Plain => {
                    tracing::warn!(
                        path = %target.display(),
                        "Target exists and was not cloned; use force to replace it"
                    );
                    return (target, CloneStatus::Skipped(SkipReason::AlreadyExists));
                }
                ExistingPolicy::Force if !self.dry_run => {
                    if is_destination(&target, destination) {
                        tracing::warn!(path = %target.display(), "Refusing to remove the destination root");
                        return (target, CloneStatus::Skipped(SkipReason::OutOfScope));
                    }
                    if let Err(e) = remove_existing(&target) {
                        tracing::warn!(path = %target.display(), error = %e, "Could not remove existing target");
                        return (target, CloneStatus::Skipped(SkipReason::RemovalFailed));
                    }
                    tracing::info!(path = %target.display(), "Removed existing target");
                }
                ExistingPolicy::Force => {}
            }
        }

        if self.dry_run {
            return (target, CloneStatus::WouldClone);
        }

        let status = match self.client.clone_recursive(&request.remote_url, &target) {
            Ok(0) => {
                self.configure_identity(request, &target);
                tracing::info!(url = %request.remote_url, path = %target.display(), "Cloned");
                CloneStatus::Cloned
            }
            Ok(exit_code) => {
                tracing::warn!(url = %request.remote_url, exit_code, "Clone failed");
                CloneStatus::Failed { exit_code }
            }
            Err(e) => {
                tracing::warn!(url = %request.remote_url, error = %e, "Clone could not run");
                CloneStatus::Failed { exit_code: -1 }
            }
        };
        (target, status)
    }

    fn configure_identity(&self, request: &CloneRequest, target: &Path) {
        let identity = [
            ("user.name", request.user_name.as_deref()),
            ("user.email", request.user_email.as_deref()),
        ];

        for (key, value) in identity {
            let Some(value) = value.filter(|v| !v.trim().is_empty()) else {
                continue;
            };
            if let Err(e) = self.client.set_local_config(target, key, value) {
                tracing::warn!(path = %target.display(), key, error = %e, "Could not set identity");
            }
        }
    }
}

fn is_destination(target: &Path, destination: &Path) -> bool {
    resolve_within_root(destination, &RelativePath::root()).is_ok_and(|root| root == target)
}

fn remove_existing(target: &Path) -> std::io::Result<()> {
    if target.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    }
}
