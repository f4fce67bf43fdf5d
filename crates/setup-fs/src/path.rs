//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Manifests are written on Windows with backslashes and consumed on any
/// platform, so all paths are stored with forward slashes, redundant `.`
/// segments and repeated separators removed, and converted to the native
/// form only at I/O boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        Self {
            inner: clean(&path_str.replace('\\', "/")),
        }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment.
    ///
    /// An empty segment (or `.`) yields this path unchanged; a manifest
    /// search path of `""` denotes the component root itself.
    pub fn join(&self, segment: &str) -> Self {
        let segment = segment.replace('\\', "/");
        if segment.is_empty() || clean(&segment) == "." {
            return self.clone();
        }
        if self.inner.is_empty() || self.inner == "." {
            return Self { inner: clean(&segment) };
        }
        let joined = if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment.trim_start_matches('/'))
        } else {
            format!("{}/{}", self.inner, segment.trim_start_matches('/'))
        };
        Self {
            inner: clean(&joined),
        }
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the file name without its extension.
    pub fn file_stem(&self) -> Option<&str> {
        let name = self.file_name()?;
        match name.rfind('.') {
            Some(idx) if idx > 0 => Some(&name[..idx]),
            _ => Some(name),
        }
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }

    /// Whether the path is rooted (`/x`, `//server/share` or `C:/x`).
    pub fn is_absolute(&self) -> bool {
        self.inner.starts_with('/') || has_drive(&self.inner)
    }

    /// Resolve against `base` unless already absolute.
    pub fn resolve_against(&self, base: &NormalizedPath) -> Self {
        if self.is_absolute() {
            self.clone()
        } else {
            base.join(&self.inner)
        }
    }

    /// Make the path absolute relative to the current directory.
    ///
    /// Existing paths are canonicalized (without UNC prefixes on Windows)
    /// so the same directory always produces the same string.
    pub fn absolutize(&self) -> Result<Self> {
        let native = self.to_native();
        if native.exists() {
            let canonical = dunce::canonicalize(&native).map_err(|e| Error::io(&native, e))?;
            return Ok(Self::new(canonical));
        }
        if self.is_absolute() {
            return Ok(self.clone());
        }
        let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(Self::new(cwd).join(&self.inner))
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }
}

/// Collapse repeated separators and `.` segments and resolve `..`
/// lexically, keeping a leading `/`, `//` (UNC) or drive prefix intact.
///
/// `..` never climbs above a rooted prefix; on a relative path, leading
/// `..` segments are kept.
fn clean(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    let prefix = if path.starts_with("//") {
        "//"
    } else if path.starts_with('/') {
        "/"
    } else {
        ""
    };
    let drive = prefix.is_empty() && has_drive(path);

    let mut segments: Vec<&str> = Vec::new();
    for seg in path.split('/') {
        match seg {
            "" | "." => {}
            ".." => {
                let floor = usize::from(drive);
                match segments.last() {
                    Some(&last) if last != ".." && segments.len() > floor => {
                        segments.pop();
                    }
                    _ if !prefix.is_empty() || drive => {}
                    _ => segments.push(".."),
                }
            }
            _ => segments.push(seg),
        }
    }

    let body = segments.join("/");
    if body.is_empty() && prefix.is_empty() {
        return ".".to_string();
    }
    format!("{prefix}{body}")
}

fn has_drive(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Validate a package destination folder.
///
/// The folder must be relative and must stay beneath the components root.
pub fn validate_relative_folder(folder: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidFolder {
        folder: folder.to_string(),
        reason: reason.to_string(),
    };

    let normalized = folder.replace('\\', "/");
    if normalized.trim().is_empty() {
        return Err(invalid("folder must not be empty"));
    }
    if NormalizedPath::new(&normalized).is_absolute() {
        return Err(invalid("folder must be relative to the components root"));
    }
    if normalized.split('/').any(|seg| seg == "..") {
        return Err(invalid("folder must not contain '..'"));
    }
    Ok(())
}

/// Validate a search path entry.
///
/// An empty entry is the package folder itself. Anything else must be
/// relative and, once `..` segments are resolved, stay inside the package
/// folder.
pub fn validate_search_path(entry: &str) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidSearchPath {
        path: entry.to_string(),
        reason: reason.to_string(),
    };

    if entry.trim().is_empty() {
        return Ok(());
    }
    let normalized = NormalizedPath::new(entry);
    if normalized.is_absolute() {
        return Err(invalid("search path must be relative to the package folder"));
    }
    if normalized.as_str() == ".." || normalized.as_str().starts_with("../") {
        return Err(invalid("search path must stay inside the package folder"));
    }
    Ok(())
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}

impl<'de> serde::Deserialize<'de> for NormalizedPath {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        <String as serde::Deserialize>::deserialize(deserializer).map(Self::new)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}
