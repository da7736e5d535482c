//! Well-known file and directory names.

use std::path::Path;

/// Standard filesystem markers and file names used by reposync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPath {
    /// The `.git` directory marking a checkout root
    GitDir,
    /// The per-user configuration directory name
    ConfigDir,
    /// The settings file inside [`SyncPath::ConfigDir`]
    SettingsFile,
    /// Default manifest file name when none is configured
    DefaultManifest,
}

impl SyncPath {
    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GitDir => ".git",
            Self::ConfigDir => "reposync",
            Self::SettingsFile => "settings.toml",
            Self::DefaultManifest => "repositories.json",
        }
    }
}

impl AsRef<Path> for SyncPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for SyncPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SyncPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
