//! Installer settings files
//!
//! Settings live next to the manifest as `setup.toml`, `setup.json` or
//! `setup.yaml`; the extension picks the format. They are read once per run
//! and never written back.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::{Error, NormalizedPath, Result, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

impl ConfigFormat {
    /// Format named by the extension of `path`, ignoring case.
    pub fn from_path(path: &NormalizedPath) -> Result<Self> {
        let extension = path.extension().unwrap_or("");
        match extension.to_ascii_lowercase().as_str() {
            "toml" => Ok(Self::Toml),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn decode<T: DeserializeOwned>(self, text: &str) -> std::result::Result<T, String> {
        match self {
            Self::Toml => toml::from_str(text).map_err(|e| e.to_string()),
            Self::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
            Self::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Toml => "TOML",
            Self::Json => "JSON",
            Self::Yaml => "YAML",
        })
    }
}

/// Read a settings file.
///
/// An unknown extension is rejected before the file is read.
pub fn load_settings<T: DeserializeOwned>(path: &NormalizedPath) -> Result<T> {
    let format = ConfigFormat::from_path(path)?;
    let text = io::read_text(path)?;
    format.decode(&text).map_err(|message| Error::ConfigParse {
        path: path.to_native(),
        format: format.to_string(),
        message,
    })
}

/// [`load_settings`], or `T::default()` when there is no settings file.
pub fn load_settings_or_default<T: DeserializeOwned + Default>(path: &NormalizedPath) -> Result<T> {
    if path.is_file() {
        load_settings(path)
    } else {
        Ok(T::default())
    }
}
