//! Inventory records and clone results

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reposync_fs::{NormalizedPath, RelativePath};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One checkout, as found on disk or as listed in a manifest.
///
/// Paths are stored in forward-slash form so a manifest written on one
/// platform reads the same on another. Empty strings and `None` mean the
/// value is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RepositoryRecord {
    #[serde(default)]
    pub root_path: String,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default)]
    pub full_path: String,
    #[serde(default)]
    pub remote_name: String,
    #[serde(default)]
    pub remote_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_remote_accessible: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_filter: Option<String>,
}

impl RepositoryRecord {
    /// Create a record located at `relative` under `root`.
    pub fn new(root: &NormalizedPath, relative: &RelativePath) -> Self {
        let mut record = Self {
            relative_path: relative.as_str().to_string(),
            ..Self::default()
        };
        record.rebase(root);
        record
    }

    /// Set the remote URL.
    pub fn with_remote(mut self, name: &str, url: &str) -> Self {
        self.remote_name = name.to_string();
        self.remote_url = url.to_string();
        self
    }

    /// The normalized relative path.
    pub fn relative(&self) -> RelativePath {
        RelativePath::normalize(&self.relative_path)
    }

    /// Case-insensitive identity key.
    pub fn key(&self) -> String {
        self.relative().key()
    }

    /// Point the record at `root`, rewriting the root and full path.
    pub fn rebase(&mut self, root: &NormalizedPath) {
        let relative = self.relative();
        self.relative_path = relative.as_str().to_string();
        self.root_path = root.as_str().to_string();
        self.full_path = root.join(relative.as_str()).as_str().to_string();
    }

    /// Whether the stored root or full path differs from where `root` puts it.
    pub fn has_drifted(&self, root: &NormalizedPath) -> bool {
        let expected_full = root.join(self.relative().as_str());
        !NormalizedPath::new(&self.root_path).eq_ignore_case(root)
            || !NormalizedPath::new(&self.full_path).eq_ignore_case(&expected_full)
    }
}

/// Resolve `path` to an absolute, forward-slash root.
pub(crate) fn absolute_root(path: &Path) -> Result<NormalizedPath> {
    Ok(NormalizedPath::new(std::path::absolute(path)?))
}

/// A manifest-only record queued for cloning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    /// Relative path exactly as supplied; validated by the orchestrator
    pub relative_path: String,
    pub remote_url: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub system_filter: Option<String>,
}

impl CloneRequest {
    pub fn from_record(record: &RepositoryRecord) -> Self {
        Self {
            relative_path: record.relative_path.clone(),
            remote_url: record.remote_url.clone(),
            user_name: record.user_name.clone(),
            user_email: record.user_email.clone(),
            system_filter: record.system_filter.clone(),
        }
    }
}

/// Why a clone was not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkipReason {
    MissingRemoteUrl,
    EmptyPath,
    FilteredOut,
    OutOfScope,
    AlreadyExists,
    RemovalFailed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::MissingRemoteUrl => "no remote URL",
            Self::EmptyPath => "empty relative path",
            Self::FilteredOut => "excluded by system filter",
            Self::OutOfScope => "target outside destination root",
            Self::AlreadyExists => "target already exists",
            Self::RemovalFailed => "existing target could not be removed",
        };
        f.write_str(text)
    }
}

/// Result of trying to materialize one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CloneStatus {
    Cloned,
    /// Dry run: every gate passed and a clone would have run
    WouldClone,
    Skipped(SkipReason),
    Failed { exit_code: i32 },
}

impl CloneStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for CloneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cloned => write!(f, "cloned"),
            Self::WouldClone => write!(f, "would clone"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
            Self::Failed { exit_code } => write!(f, "failed (exit code {exit_code})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CloneOutcome {
    pub remote_url: String,
    pub target_path: PathBuf,
    pub status: CloneStatus,
}
