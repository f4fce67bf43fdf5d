//! Error types for setup-manifest

use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// A malformed manifest, located as precisely as the parser could manage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line number, when the problem is tied to one line
    pub line: Option<usize>,
    /// Section the problem occurred in
    pub section: Option<String>,
    /// Offending key
    pub key: Option<String>,
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            line: None,
            section: None,
            key: None,
            message: message.into(),
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn in_section(mut self, section: impl Into<String>) -> Self {
        self.section = Some(section.into());
        self
    }

    pub fn for_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(line) = self.line {
            write!(f, "line {line}: ")?;
        }
        if let Some(section) = &self.section {
            write!(f, "[{section}] ")?;
        }
        if let Some(key) = &self.key {
            write!(f, "{key}: ")?;
        }
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] setup_fs::Error),

    #[error("Invalid manifest {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Manifest too large: {path} is {size} bytes (max {max})")]
    ManifestTooLarge { path: PathBuf, size: u64, max: u64 },
}

impl Error {
    /// The underlying parse error, if this is one.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let err = ParseError::new("expected 0, 1 or 2")
            .at_line(7)
            .in_section("Package - 2")
            .for_key("Installable");
        assert_eq!(
            err.to_string(),
            "line 7: [Package - 2] Installable: expected 0, 1 or 2"
        );
    }

    #[test]
    fn display_without_location() {
        assert_eq!(ParseError::new("empty").to_string(), "empty");
    }
}
