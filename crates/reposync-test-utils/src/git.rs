//! Git checkout fixtures at three realism levels.
//!
//! Choose the lowest-realism fixture that satisfies your test's needs;
//! fakes are faster and have fewer external dependencies.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Creates a minimal `.git` directory structure **without** initialising a real
/// git repository.
///
/// Realism level: **FAKE**. The scanner sees a checkout marker, but metadata
/// reads fail and the record keeps empty fields.
///
/// # Panics
/// Panics if the filesystem operations fail.
pub fn fake_git_dir(path: &Path) {
    fs::create_dir_all(path.join(".git/refs/heads"))
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to create .git: {e}"));
    fs::write(path.join(".git/HEAD"), "ref: refs/heads/main\n")
        .unwrap_or_else(|e| panic!("fake_git_dir: failed to write HEAD: {e}"));
}

/// Initialises a real git repository using `git2` (no commit, no remote).
///
/// Realism level: **REAL**. Valid git object store, empty history.
///
/// # Panics
/// Panics if `git2::Repository::init` fails.
pub fn real_git_repo(path: &Path) -> git2::Repository {
    git2::Repository::init(path).unwrap_or_else(|e| {
        panic!(
            "real_git_repo: failed to init repository at {}: {e}",
            path.display()
        )
    })
}

/// Initialises a real git repository with an `origin` remote pointing at `url`.
///
/// # Panics
/// Panics if the repository or remote cannot be created.
pub fn checkout_with_remote(path: &Path, url: &str) -> git2::Repository {
    let repo = real_git_repo(path);
    repo.remote("origin", url)
        .unwrap_or_else(|e| panic!("checkout_with_remote: failed to add origin {url}: {e}"));
    repo
}

/// Creates a bare repository at `path` holding one commit on `main`, using the
/// `git` CLI.
///
/// Realism level: **REAL WITH HISTORY**. Suitable as a local clone source for
/// end-to-end tests. Returns `path`.
///
/// # Panics
/// Panics if any git operation fails.
pub fn bare_remote_with_commit(path: &Path) -> PathBuf {
    let seed = path.with_extension("seed");
    fs::create_dir_all(&seed)
        .unwrap_or_else(|e| panic!("bare_remote_with_commit: failed to create seed: {e}"));

    let run = |dir: &Path, args: &[&str]| {
        let output = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap_or_else(|e| panic!("bare_remote_with_commit: failed to run `git {args:?}`: {e}"));
        if !output.status.success() {
            panic!(
                "bare_remote_with_commit: `git {args:?}` failed:\n{}",
                String::from_utf8_lossy(&output.stderr)
            );
        }
    };

    run(&seed, &["init"]);
    run(&seed, &["config", "user.email", "test@test.com"]);
    run(&seed, &["config", "user.name", "Test User"]);
    run(&seed, &["config", "commit.gpgsign", "false"]);
    fs::write(seed.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("bare_remote_with_commit: failed to write README.md: {e}"));
    run(&seed, &["add", "."]);
    run(&seed, &["commit", "-m", "Initial commit"]);

    let parent = path.parent().unwrap_or(Path::new("."));
    let seed_arg = seed.to_string_lossy().into_owned();
    let path_arg = path.to_string_lossy().into_owned();
    run(parent, &["clone", "--bare", &seed_arg, &path_arg]);

    path.to_path_buf()
}
