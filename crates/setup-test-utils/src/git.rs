//! Git repository fixtures.
//!
//! Repositories are created with the `git` CLI so that the code under test
//! (which uses `git2`) is checked against repositories produced by real git.

use std::fs;
use std::path::Path;
use std::process::Command;

/// Run `git` in `path`, panicking with stderr on failure. Returns stdout.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "`git {args:?}` failed in {}:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Configure a commit identity so `git commit` works without global config.
pub fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

/// Initialises a git repository on branch `main` with one commit.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    fs::create_dir_all(path)
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to create dir: {e}"));
    git(path, &["init"]);
    configure_identity(path);
    // Older git versions do not support `init -b`
    git(path, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    fs::write(path.join("README.md"), "# Test")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
}

/// Write `file` (relative, parents created) and commit it.
pub fn commit_file(path: &Path, file: &str, contents: &str, message: &str) {
    let target = path.join(file);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&target, contents).unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", message]);
}

/// Create a bare clone of `source` at `dest`, usable as a push target.
pub fn bare_clone(source: &Path, dest: &Path) {
    let parent = dest.parent().unwrap_or(dest);
    fs::create_dir_all(parent).unwrap();
    git(
        parent,
        &["clone", "--bare", &source.to_string_lossy(), &dest.to_string_lossy()],
    );
}

/// Clone `source` to `dest` with a commit identity configured.
pub fn clone(source: &Path, dest: &Path) {
    let parent = dest.parent().unwrap_or(dest);
    fs::create_dir_all(parent).unwrap();
    git(parent, &["clone", &source.to_string_lossy(), &dest.to_string_lossy()]);
    configure_identity(dest);
}

/// Commit id HEAD points at.
pub fn head(path: &Path) -> String {
    git(path, &["rev-parse", "HEAD"])
}

/// Commit id of `reference` in the repository at `path` (bare or not).
pub fn rev_parse(path: &Path, reference: &str) -> String {
    git(path, &["rev-parse", reference])
}

/// Initialises an empty repository using `git2`.
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
