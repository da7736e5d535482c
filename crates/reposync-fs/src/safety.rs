//! Path safety for manifest-supplied relative paths
//!
//! Manifests travel between machines, so every relative path read from one is
//! untrusted input. This module normalizes such paths, rejects traversal
//! attempts, and resolves them against a destination root with a final
//! canonical prefix check. Everything here is pure apart from the
//! canonicalization in [`resolve_within_root`].

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Canonical separator used in normalized relative paths.
pub const SEPARATOR: char = '/';

/// Relative path denoting the scan root itself.
pub const ROOT: &str = ".";

/// A relative path in canonical single-separator form.
///
/// Normalization strips line breaks, tabs and other non-space padding around
/// the path, maps `\` to `/`, collapses repeated separators and drops `.`
/// segments and trailing separators. Spaces are legal in directory names, so
/// a name like `"proj "` is kept verbatim. A leading separator and `..`
/// segments are kept so that [`is_unsafe`] can still reject them. Identity
/// comparisons go through [`RelativePath::key`], which is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath {
    inner: String,
}

impl RelativePath {
    /// Normalize a raw relative path. Blank input and `"."` map to `"."`.
    pub fn normalize(raw: &str) -> Self {
        let unified = raw.trim_matches(is_padding).replace('\\', "/");
        let rooted = unified.starts_with(SEPARATOR);
        let mut segments: Vec<&str> = unified
            .split(SEPARATOR)
            .filter(|segment| !segment.is_empty() && *segment != ".")
            .collect();

        // Padding belongs to the whole path, not to the first/last name
        loop {
            if let Some(first) = segments.first_mut() {
                *first = first.trim_start_matches(is_padding);
            }
            if let Some(last) = segments.last_mut() {
                *last = last.trim_end_matches(is_padding);
            }
            let before = segments.len();
            segments.retain(|segment| !segment.is_empty() && *segment != ".");
            if segments.len() == before {
                break;
            }
        }

        let body = segments.join("/");
        let inner = if rooted {
            format!("{SEPARATOR}{body}")
        } else if body.trim().is_empty() {
            ROOT.to_string()
        } else {
            body
        };

        Self { inner }
    }

    /// The root of the scan, `"."`.
    pub fn root() -> Self {
        Self {
            inner: ROOT.to_string(),
        }
    }

    /// Get the normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether this path denotes the root itself.
    pub fn is_root(&self) -> bool {
        self.inner == ROOT
    }

    /// Case-insensitive identity key.
    pub fn key(&self) -> String {
        self.inner.to_lowercase()
    }

    /// See [`is_unsafe`].
    pub fn is_unsafe(&self) -> bool {
        is_unsafe(&self.inner)
    }

    /// Convert to a platform-native relative path.
    pub fn to_native(&self) -> PathBuf {
        if self.is_root() {
            return PathBuf::from(ROOT);
        }
        self.inner.split(SEPARATOR).collect()
    }
}

fn is_padding(c: char) -> bool {
    c.is_whitespace() && c != ' '
}

impl PartialOrd for RelativePath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RelativePath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key()
            .cmp(&other.key())
            .then_with(|| self.inner.cmp(&other.inner))
    }
}

impl std::fmt::Display for RelativePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for RelativePath {
    fn from(s: &str) -> Self {
        Self::normalize(s)
    }
}

/// Returns true if a relative path could escape the directory it is joined to.
///
/// A path is unsafe when it begins with a separator (rooted or UNC), contains
/// a drive designator (`C:`) in any segment, or contains a `..` segment.
pub fn is_unsafe(relative: &str) -> bool {
    let unified = relative.trim().replace('\\', "/");
    if unified.starts_with(SEPARATOR) {
        return true;
    }

    unified
        .split(SEPARATOR)
        .any(|segment| segment.trim() == ".." || has_drive_designator(segment))
}

fn has_drive_designator(segment: &str) -> bool {
    let bytes = segment.trim_start().as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Join `relative` onto `root` and verify the canonical result stays inside `root`.
///
/// The deepest existing ancestor of the joined path is canonicalized, so a
/// symlink inside the root that points elsewhere is caught even when the final
/// target does not exist yet.
///
/// # Errors
///
/// Returns [`Error::OutOfScope`] when the path is unsafe or resolves outside
/// `root`, and [`Error::Io`] when `root` itself cannot be canonicalized.
pub fn resolve_within_root(root: &Path, relative: &RelativePath) -> Result<PathBuf> {
    if relative.is_unsafe() {
        return Err(Error::OutOfScope {
            root: root.to_path_buf(),
            path: PathBuf::from(relative.as_str()),
        });
    }

    let canonical_root = dunce::canonicalize(root).map_err(|e| Error::io(root, e))?;
    let resolved = canonicalize_lenient(&canonical_root.join(relative.to_native()))?;

    if !starts_with_ignore_case(&resolved, &canonical_root) {
        tracing::warn!(
            root = %canonical_root.display(),
            path = %resolved.display(),
            "Resolved path escapes destination root"
        );
        return Err(Error::OutOfScope {
            root: canonical_root,
            path: resolved,
        });
    }

    Ok(resolved)
}

/// Canonicalize the deepest existing ancestor and re-append the missing tail.
fn canonicalize_lenient(path: &Path) -> Result<PathBuf> {
    let mut existing = path;
    let mut tail: Vec<&OsStr> = Vec::new();

    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name);
                existing = parent;
            }
            _ => break,
        }
    }

    let mut resolved = dunce::canonicalize(existing).map_err(|e| Error::io(existing, e))?;
    for name in tail.iter().rev() {
        resolved.push(name);
    }
    Ok(resolved)
}

fn starts_with_ignore_case(path: &Path, root: &Path) -> bool {
    let mut components = path.components();
    root.components().all(|root_component| {
        components.next().is_some_and(|component| {
            component
                .as_os_str()
                .to_string_lossy()
                .eq_ignore_ascii_case(&root_component.as_os_str().to_string_lossy())
        })
    })
}
