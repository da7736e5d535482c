//! Persistent settings
//!
//! Loaded from `<config dir>/reposync/settings.toml` unless a path is given.
//! A missing file means defaults; command-line flags override any value here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reposync_fs::{ConfigStore, NormalizedPath, SyncPath};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::manifest::ManifestFormat;
use crate::scanner::DEFAULT_REMOTE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Identity matched against system filters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
    /// Used when neither a flag nor the manifest extension decides
    pub manifest_format: ManifestFormat,
    /// Remote read from each checkout
    pub remote_name: String,
    pub probe_timeout_secs: u64,
    /// Probe remotes while scanning
    pub check_remote: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            machine_name: None,
            manifest_format: ManifestFormat::default(),
            remote_name: DEFAULT_REMOTE.to_string(),
            probe_timeout_secs: 10,
            check_remote: true,
            local_path: None,
            manifest_path: None,
        }
    }
}

impl Settings {
    /// The per-user settings file, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SyncPath::ConfigDir).join(SyncPath::SettingsFile))
    }

    /// Load settings from `path`, or defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(ConfigStore::new().load_or_default(&NormalizedPath::new(path))?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        Ok(ConfigStore::new().save(&NormalizedPath::new(path), self)?)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
