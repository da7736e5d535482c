//! Error types for reposync-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from reposync-core
    #[error(transparent)]
    Core(#[from] reposync_core::Error),

    /// Error from reposync-fs
    #[error(transparent)]
    Fs(#[from] reposync_fs::Error),

    /// Error from reposync-git
    #[error(transparent)]
    Git(#[from] reposync_git::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
