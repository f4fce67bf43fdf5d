//! [`Sandbox`] temporary directory for installer scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding a components root, remote repositories
/// and an environment store, with assertion helpers.
///
/// ```rust,no_run
/// use setup_test_utils::sandbox::Sandbox;
///
/// let sandbox = Sandbox::new();
/// let remote = sandbox.remote_with_files("base", &[("Source/Base.pas", "unit Base;")]);
/// sandbox.assert_file_not_exists("components/base");
/// ```
pub struct Sandbox {
    temp_dir: TempDir,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::new()
    }
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Components root inside the sandbox (not created).
    pub fn components(&self) -> PathBuf {
        self.root().join("components")
    }

    /// Environment store directory inside the sandbox (not created).
    pub fn store_dir(&self) -> PathBuf {
        self.root().join("store")
    }

    /// Create a git repository under `remotes/<name>` containing `files`,
    /// committed on `main`. Returns its path, usable as a clone URL.
    pub fn remote_with_files(&self, name: &str, files: &[(&str, &str)]) -> PathBuf {
        let path = self.root().join("remotes").join(name);
        crate::git::real_git_repo_with_commit(&path);
        for (file, contents) in files {
            let target = path.join(file);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(target, contents).unwrap();
        }
        if !files.is_empty() {
            crate::git::git(&path, &["add", "."]);
            crate::git::git(&path, &["commit", "-m", "Add sources"]);
        }
        path
    }

    /// Write `contents` to `path` relative to the sandbox root.
    pub fn write(&self, path: &str, contents: &str) -> PathBuf {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, contents).unwrap();
        full_path
    }

    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_file_not_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            !full_path.exists(),
            "Expected file NOT to exist: {}",
            full_path.display()
        );
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}
