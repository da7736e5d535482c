//! Filesystem primitives for reposync
//!
//! Provides normalized path handling, path-safety checks for manifest-supplied
//! relative paths, and atomic I/O suitable for manifests living on shared drives.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;
pub mod safety;

pub use config::{ConfigFormat, ConfigStore};
pub use constants::SyncPath;
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::NormalizedPath;
pub use safety::{RelativePath, is_unsafe, resolve_within_root};
