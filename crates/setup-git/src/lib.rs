//! Version-control collaborator for Component Setup
//!
//! The installer core only needs two operations from version control:
//! materialize a working copy at a path, and update an existing one. Both sit
//! behind [`SourceControl`] so the pipeline can be driven by fakes in tests;
//! [`GitSource`] is the git2-backed implementation. Upstream synchronization
//! and release tagging are maintenance operations layered on the same helpers.

pub mod error;
pub mod helpers;
pub mod release;
pub mod source;
pub mod upstream;

pub use error::{Error, Result};
pub use release::{tag_release, TagOutcome};
pub use source::{same_remote, GitSource, SourceControl, UpdateOutcome};
pub use upstream::{sync_with_upstream, SyncStatus};
