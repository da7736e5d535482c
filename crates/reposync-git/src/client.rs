//! External version-control client
//!
//! Cloning and remote probes go through the real `git` executable so that
//! credential helpers, submodule handling and proxies behave as they do for
//! the user. Only the exit code is interpreted.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use crate::{Error, Result};

/// Operations reposync needs from a version-control client.
pub trait VcsClient {
    /// Clone `url` into `target`, recursing into submodules. Returns the exit code.
    fn clone_recursive(&self, url: &str, target: &Path) -> Result<i32>;

    /// Set `key` to `value` in the checkout's local config.
    fn set_local_config(&self, checkout: &Path, key: &str, value: &str) -> Result<()>;

    /// Whether `url` answers within `timeout`. Never fails; any problem is `false`.
    fn probe_remote(&self, url: &str, timeout: Duration) -> bool;
}

/// [`VcsClient`] backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl GitCli {
    const NAME: &'static str = "git";

    /// Find `git` on `PATH`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExecutableNotFound`] when no candidate exists. This is
    /// fatal for a sync run.
    pub fn locate() -> Result<Self> {
        let candidates: &[&str] = if cfg!(windows) {
            &["git.exe", "git.cmd"]
        } else {
            &[Self::NAME]
        };

        env::var_os("PATH")
            .iter()
            .flat_map(env::split_paths)
            .flat_map(|dir| candidates.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
            .map(Self::with_program)
            .ok_or_else(|| Error::ExecutableNotFound {
                name: Self::NAME.to_string(),
            })
    }

    /// Use a specific executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null());
        command
    }

    fn spawn_error(&self, source: std::io::Error) -> Error {
        Error::Spawn {
            program: self.program.display().to_string(),
            source,
        }
    }

    /// Run `git ls-remote --heads <url>` bounded by `timeout`.
    ///
    /// The child is killed when the timeout elapses.
    pub fn ls_remote(&self, url: &str, timeout: Duration) -> Result<bool> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(Error::Runtime)?;

        runtime.block_on(async {
            let mut child = tokio::process::Command::new(&self.program)
                .args(["ls-remote", "--heads", "--", url])
                .env("GIT_TERMINAL_PROMPT", "0")
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| self.spawn_error(e))?;

            match tokio::time::timeout(timeout, child.wait()).await {
                Ok(Ok(status)) => Ok(status.success()),
                Ok(Err(e)) => Err(Error::Runtime(e)),
                Err(_) => {
                    tracing::debug!(url = %url, timeout_secs = timeout.as_secs(), "Remote probe timed out");
                    let _ = child.kill().await;
                    Ok(false)
                }
            }
        })
    }
}

impl VcsClient for GitCli {
    fn clone_recursive(&self, url: &str, target: &Path) -> Result<i32> {
        let output = self
            .command()
            .args(["clone", "--recurse-submodules", "--", url])
            .arg(target)
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            tracing::debug!(
                url = %url,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git clone failed"
            );
        }
        Ok(output.status.code().unwrap_or(-1))
    }

    fn set_local_config(&self, checkout: &Path, key: &str, value: &str) -> Result<()> {
        let status = self
            .command()
            .arg("-C")
            .arg(checkout)
            .args(["config", "--local", key, value])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::ConfigFailed {
                key: key.to_string(),
                code: status.code().unwrap_or(-1),
            })
        }
    }

    fn probe_remote(&self, url: &str, timeout: Duration) -> bool {
        if url.trim().is_empty() {
            return false;
        }
        match self.ls_remote(url, timeout) {
            Ok(reachable) => {
                tracing::debug!(url = %url, reachable, "Remote probe finished");
                reachable
            }
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Remote probe could not run");
                false
            }
        }
    }
}
