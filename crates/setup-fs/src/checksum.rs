//! SHA-256 checksum utilities
//!
//! Used by the copy primitives to skip rewriting destinations that already
//! hold identical content, which keeps re-runs cheap and idempotent.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of a byte slice.
///
/// Returns a string in the canonical format `"sha256:<hex>"`.
pub fn compute_bytes_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn compute_file_checksum(path: &Path) -> std::io::Result<String> {
    let content = std::fs::read(path)?;
    Ok(compute_bytes_checksum(&content))
}

/// Whether two files exist and have identical contents.
pub fn files_match(a: &Path, b: &Path) -> bool {
    if !a.is_file() || !b.is_file() {
        return false;
    }
    match (compute_file_checksum(a), compute_file_checksum(b)) {
        (Ok(x), Ok(y)) => x == y,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_has_prefix() {
        assert!(compute_bytes_checksum(b"hello world").starts_with("sha256:"));
    }

    #[test]
    fn checksum_known_value() {
        assert_eq!(
            compute_bytes_checksum(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn files_match_detects_difference() {
        let dir = tempfile::TempDir::new().unwrap();
        let a = dir.path().join("a");
        let b = dir.path().join("b");
        std::fs::write(&a, "same").unwrap();
        std::fs::write(&b, "same").unwrap();
        assert!(files_match(&a, &b));

        std::fs::write(&b, "different").unwrap();
        assert!(!files_match(&a, &b));
        assert!(!files_match(&a, &dir.path().join("missing")));
    }
}
