//! Filesystem primitives for Component Setup
//!
//! Provides normalized path handling, atomic writes, rollback-safe copy and
//! removal, and format-agnostic configuration loading.

pub mod checksum;
pub mod config;
pub mod error;
pub mod io;
pub mod path;
pub mod transfer;

pub use config::{ConfigFormat, load_settings, load_settings_or_default};
pub use error::{Error, Result};
pub use io::RobustnessConfig;
pub use path::{NormalizedPath, validate_relative_folder, validate_search_path};
pub use transfer::{CopyOutcome, copy_path, remove_path};
