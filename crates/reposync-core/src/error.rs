//! Error types for reposync-core

use std::path::PathBuf;

/// Result type for reposync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a whole run.
///
/// Problems with a single record or directory are not errors; they surface as
/// [`crate::CloneStatus`] values and log entries instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Manifest exists but could not be decoded
    #[error("Failed to parse {format} manifest at {path}: {message}")]
    ManifestParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    /// Records could not be encoded
    #[error("Failed to encode {format} manifest: {message}")]
    ManifestEncode { format: String, message: String },

    /// Unknown manifest format name
    #[error("Unsupported manifest format: {value}")]
    UnsupportedFormat { value: String },

    /// Scan root does not exist
    #[error("Scan root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// Filesystem error from reposync-fs
    #[error(transparent)]
    Fs(#[from] reposync_fs::Error),

    /// Git error from reposync-git
    #[error(transparent)]
    Git(#[from] reposync_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
