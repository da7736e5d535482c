//! [`CheckoutTree`] builder for scanner and sync scenarios.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::git::{checkout_with_remote, fake_git_dir, real_git_repo};

/// A temporary directory tree populated with checkouts.
///
/// # Example
///
/// ```rust,no_run
/// use reposync_test_utils::CheckoutTree;
///
/// let tree = CheckoutTree::new()
///     .checkout("app/api", "https://example.com/api.git")
///     .fake_checkout("broken")
///     .dir("docs");
/// tree.assert_exists("app/api/.git");
/// ```
pub struct CheckoutTree {
    temp_dir: TempDir,
}

impl Default for CheckoutTree {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutTree {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `relative` under the root.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Add a real checkout at `relative` whose `origin` is `url`.
    pub fn checkout(self, relative: &str, url: &str) -> Self {
        let path = self.join(relative);
        fs::create_dir_all(&path).unwrap();
        checkout_with_remote(&path, url);
        self
    }

    /// Add a real checkout with no remote.
    pub fn checkout_without_remote(self, relative: &str) -> Self {
        let path = self.join(relative);
        fs::create_dir_all(&path).unwrap();
        real_git_repo(&path);
        self
    }

    /// Add a `.git` marker that is not a readable repository.
    pub fn fake_checkout(self, relative: &str) -> Self {
        let path = self.join(relative);
        fs::create_dir_all(&path).unwrap();
        fake_git_dir(&path);
        self
    }

    /// Add a plain directory.
    pub fn dir(self, relative: &str) -> Self {
        fs::create_dir_all(self.join(relative)).unwrap();
        self
    }

    /// Add a file with `content`, creating parent directories.
    pub fn file(self, relative: &str, content: &str) -> Self {
        let path = self.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
        self
    }

    /// Assert that `relative` exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_exists(&self, relative: &str) {
        let full_path = self.join(relative);
        assert!(
            full_path.exists(),
            "Expected path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `relative` does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_not_exists(&self, relative: &str) {
        let full_path = self.join(relative);
        assert!(
            !full_path.exists(),
            "Expected path NOT to exist: {}",
            full_path.display()
        );
    }
}
