//! Merging scanned checkouts with manifest entries
//!
//! The local scan is authoritative for anything it knows. The manifest fills
//! gaps and contributes entries this machine does not have yet; those are
//! queued for cloning.

use std::collections::BTreeMap;

use reposync_fs::{NormalizedPath, RelativePath};

use crate::record::{CloneRequest, RepositoryRecord};

/// Outcome of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Authoritative record set, ordered by relative path
    pub records: Vec<RepositoryRecord>,
    /// Whether the manifest needs to be rewritten
    pub changed: bool,
    /// Manifest-only entries to materialize on this machine
    pub to_clone: Vec<CloneRequest>,
}

/// Merge `local` scan results with `manifest` entries for the root `root`.
///
/// Manifest entries with unsafe relative paths are dropped. Within each side
/// the first entry for a given (case-insensitive) relative path wins.
pub fn reconcile(
    local: Vec<RepositoryRecord>,
    manifest: Vec<RepositoryRecord>,
    root: &NormalizedPath,
) -> Reconciliation {
    let local_map = index(local, "local scan");
    let mut file_map = index(
        manifest.into_iter().filter(|record| {
            let unsafe_path = record.relative().is_unsafe();
            if unsafe_path {
                tracing::warn!(
                    path = %record.relative_path,
                    url = %record.remote_url,
                    "Dropping manifest entry with unsafe relative path"
                );
            }
            !unsafe_path
        }),
        "manifest",
    );

    let mut result = Reconciliation::default();
    let mut merged = BTreeMap::new();

    for (key, mut record) in local_map {
        match file_map.remove(&key) {
            Some(entry) => {
                if merge_into(&mut record, entry, root) {
                    result.changed = true;
                }
            }
            None => {
                tracing::info!(path = %record.relative_path, "New local checkout not in manifest");
                result.changed = true;
            }
        }
        merged.insert(key, record);
    }

    for (key, mut record) in file_map {
        result.changed = true;
        record.rebase(root);

        if record.remote_url.trim().is_empty() {
            tracing::warn!(path = %record.relative_path, "Manifest entry has no remote URL, not cloning");
        } else if record.is_remote_accessible == Some(false) {
            tracing::warn!(
                path = %record.relative_path,
                url = %record.remote_url,
                "Manifest entry marked unreachable, not cloning"
            );
        } else {
            result.to_clone.push(CloneRequest::from_record(&record));
        }
        merged.insert(key, record);
    }

    result.records = merged.into_values().collect();
    result.records.sort_by_key(RepositoryRecord::relative);
    result
        .to_clone
        .sort_by_key(|request| RelativePath::normalize(&request.relative_path));
    result
}

fn index(
    records: impl IntoIterator<Item = RepositoryRecord>,
    source: &str,
) -> BTreeMap<String, RepositoryRecord> {
    let mut map = BTreeMap::new();
    for mut record in records {
        record.relative_path = record.relative().as_str().to_string();
        let key = record.key();
        if map.contains_key(&key) {
            tracing::warn!(path = %record.relative_path, source, "Ignoring duplicate entry");
            continue;
        }
        map.insert(key, record);
    }
    map
}

/// Fill gaps in `local` from `entry`.
///
/// Returns whether the manifest needs rewriting: values taken from the
/// manifest are already there, so only values the entry lacks and root drift
/// count.
fn merge_into(local: &mut RepositoryRecord, entry: RepositoryRecord, root: &NormalizedPath) -> bool {
    if local.remote_url.trim().is_empty() {
        if !entry.remote_url.trim().is_empty() {
            local.remote_url = entry.remote_url.clone();
        }
    } else if !entry.remote_url.trim().is_empty() && local.remote_url != entry.remote_url {
        tracing::warn!(
            path = %local.relative_path,
            local = %local.remote_url,
            manifest = %entry.remote_url,
            "Remote URL differs from manifest, keeping local value"
        );
    }

    if local.remote_name.is_empty() {
        local.remote_name = entry.remote_name.clone();
    }
    fill(&mut local.user_name, entry.user_name.clone());
    fill(&mut local.user_email, entry.user_email.clone());
    fill(&mut local.status_date, entry.status_date);
    fill(&mut local.is_remote_accessible, entry.is_remote_accessible);
    fill(&mut local.system_filter, entry.system_filter.clone());

    let mut changed = adds_to_manifest(local, &entry);
    if changed {
        tracing::info!(path = %local.relative_path, "Local checkout knows more than the manifest");
    }

    if entry.has_drifted(root) {
        tracing::info!(
            path = %local.relative_path,
            recorded = %entry.root_path,
            current = %root,
            "Root moved since manifest was written"
        );
        changed = true;
    }

    changed
}

/// Whether `merged` holds a value where `entry` has none.
///
/// Conflicting values do not count; the local side wins without escalation.
fn adds_to_manifest(merged: &RepositoryRecord, entry: &RepositoryRecord) -> bool {
    let text = |merged: &str, entry: &str| entry.trim().is_empty() && !merged.trim().is_empty();

    text(&merged.remote_url, &entry.remote_url)
        || text(&merged.remote_name, &entry.remote_name)
        || (entry.user_name.is_none() && merged.user_name.is_some())
        || (entry.user_email.is_none() && merged.user_email.is_some())
        || (entry.status_date.is_none() && merged.status_date.is_some())
        || (entry.is_remote_accessible.is_none() && merged.is_remote_accessible.is_some())
}

fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
    if slot.is_none() {
        *slot = value;
    }
}
