//! Forward-slash absolute paths for scan roots and manifest files

use std::path::{Path, PathBuf};

/// An absolute path as it is written into a manifest.
///
/// Roots and full paths are stored with `/` on every platform so that a
/// manifest produced on one machine compares cleanly on another. A leading
/// `//` share prefix survives; `.` and `..` are folded lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        Self { inner: fold(&raw) }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Platform-native form for I/O.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Append a relative path such as a record's `RelativePath`.
    ///
    /// Names are appended verbatim; a `"."` relative yields `self`.
    pub fn join(&self, relative: &str) -> Self {
        let relative = relative.replace('\\', "/");
        Self {
            inner: fold(&format!("{}/{relative}", self.inner.trim_end_matches('/'))),
        }
    }

    /// Extension of the last name, used to pick a file format.
    pub fn extension(&self) -> Option<&str> {
        let name = self.inner.rsplit('/').next()?;
        match name.rfind('.') {
            Some(idx) if idx > 0 => Some(&name[idx + 1..]),
            _ => None,
        }
    }

    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Root comparison used for drift detection: ASCII case and a trailing
    /// separator are ignored.
    pub fn eq_ignore_case(&self, other: &NormalizedPath) -> bool {
        self.inner
            .trim_end_matches('/')
            .eq_ignore_ascii_case(other.inner.trim_end_matches('/'))
    }
}

fn fold(path: &str) -> String {
    let prefix = if path.starts_with("//") && !path.starts_with("///") {
        "//"
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    };

    let mut names: Vec<&str> = Vec::new();
    for name in path[prefix.len()..].split('/') {
        match name {
            "" | "." => {}
            ".." => {
                names.pop();
            }
            name => names.push(name),
        }
    }

    match (prefix, names.is_empty()) {
        ("", true) if path.is_empty() => String::new(),
        ("", true) => ".".to_string(),
        _ => format!("{prefix}{}", names.join("/")),
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.inner)
    }
}
