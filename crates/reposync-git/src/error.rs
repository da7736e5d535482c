//! Error types for reposync-git

/// Result type for reposync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in reposync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error(transparent)]
    Fs(#[from] reposync_fs::Error),

    #[error("Executable '{name}' not found on PATH")]
    ExecutableNotFound { name: String },

    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Probe runtime error: {0}")]
    Runtime(#[source] std::io::Error),

    #[error("Setting '{key}' failed with exit code {code}")]
    ConfigFailed { key: String, code: i32 },
}
