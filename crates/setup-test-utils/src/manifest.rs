//! [`ManifestBuilder`] for manifest text in tests.

use std::fmt::Write as _;

/// Builds manifest text one package at a time.
///
/// # Example
///
/// ```rust
/// use setup_test_utils::manifest::ManifestBuilder;
///
/// let text = ManifestBuilder::new()
///     .option("DefaultIDE", "D29")
///     .package("Base", "https://example.com/base", "Base")
///     .key("SearchPath", "\"Source\"")
///     .key("D29", "\"Packages/Base.dproj\"")
///     .build();
/// assert!(text.contains("[Package - 1]"));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ManifestBuilder {
    options: Vec<(String, String)>,
    packages: Vec<Vec<(String, String)>>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key to the `[Options]` section.
    pub fn option(mut self, key: &str, value: &str) -> Self {
        self.options.push((key.to_string(), value.to_string()));
        self
    }

    /// Start a new package section with its required keys.
    pub fn package(mut self, name: &str, git: &str, folder: &str) -> Self {
        self.packages.push(vec![
            ("Name".to_string(), name.to_string()),
            ("Git".to_string(), git.to_string()),
            ("Folder".to_string(), folder.to_string()),
        ]);
        self
    }

    /// Add a key to the most recently started package.
    ///
    /// # Panics
    /// Panics if no package has been started.
    pub fn key(mut self, key: &str, value: &str) -> Self {
        self.packages
            .last_mut()
            .expect("ManifestBuilder::key called before ManifestBuilder::package")
            .push((key.to_string(), value.to_string()));
        self
    }

    pub fn build(&self) -> String {
        let mut out = String::new();
        if !self.options.is_empty() {
            out.push_str("[Options]\n");
            for (key, value) in &self.options {
                let _ = writeln!(out, "{key}={value}");
            }
            out.push('\n');
        }
        for (idx, keys) in self.packages.iter().enumerate() {
            let _ = writeln!(out, "[Package - {}]", idx + 1);
            for (key, value) in keys {
                let _ = writeln!(out, "{key}={value}");
            }
            out.push('\n');
        }
        out
    }
}
