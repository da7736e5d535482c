//! [`RecordingClient`]: a [`VcsClient`] that never touches the network.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reposync_git::{Error, Result, VcsClient};

/// Records every call and fabricates checkouts on "clone".
///
/// A successful clone initialises an empty repository at the target with
/// `origin` set to the cloned URL, and config calls write to that repository,
/// so a later scan reads back what was "cloned".
#[derive(Debug, Default)]
pub struct RecordingClient {
    clones: RefCell<Vec<(String, PathBuf)>>,
    configs: RefCell<Vec<(PathBuf, String, String)>>,
    probes: RefCell<Vec<String>>,
    failures: HashMap<String, i32>,
    unreachable: HashSet<String>,
    config_fails: bool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make clones of `url` exit with `exit_code`.
    pub fn failing(mut self, url: &str, exit_code: i32) -> Self {
        self.failures.insert(url.to_string(), exit_code);
        self
    }

    /// Make probes of `url` report unreachable.
    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// Make every local config call fail.
    pub fn failing_config(mut self) -> Self {
        self.config_fails = true;
        self
    }

    /// `(url, target)` for every clone attempt, in order.
    pub fn clones(&self) -> Vec<(String, PathBuf)> {
        self.clones.borrow().clone()
    }

    /// `(checkout, key, value)` for every config call, in order.
    pub fn configs(&self) -> Vec<(PathBuf, String, String)> {
        self.configs.borrow().clone()
    }

    /// URLs probed, in order.
    pub fn probes(&self) -> Vec<String> {
        self.probes.borrow().clone()
    }
}

impl VcsClient for RecordingClient {
    fn clone_recursive(&self, url: &str, target: &Path) -> Result<i32> {
        self.clones
            .borrow_mut()
            .push((url.to_string(), target.to_path_buf()));

        if let Some(code) = self.failures.get(url) {
            return Ok(*code);
        }

        fs::create_dir_all(target).map_err(|e| reposync_fs::Error::io(target, e))?;
        let repo = git2::Repository::init(target)?;
        repo.remote("origin", url)?;
        Ok(0)
    }

    fn set_local_config(&self, checkout: &Path, key: &str, value: &str) -> Result<()> {
        self.configs.borrow_mut().push((
            checkout.to_path_buf(),
            key.to_string(),
            value.to_string(),
        ));

        if self.config_fails {
            return Err(Error::ConfigFailed {
                key: key.to_string(),
                code: 1,
            });
        }
        let repo = git2::Repository::open(checkout)?;
        repo.config()?.set_str(key, value)?;
        Ok(())
    }

    fn probe_remote(&self, url: &str, _timeout: Duration) -> bool {
        self.probes.borrow_mut().push(url.to_string());
        !self.unreachable.contains(url)
    }
}
