//! Shared test utilities for the component-setup workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`git`]: git repository fixtures driven by the `git` CLI
//! - [`manifest`]: [`ManifestBuilder`](manifest::ManifestBuilder) for manifest text
//! - [`sandbox`]: [`Sandbox`](sandbox::Sandbox) temporary components root

pub mod git;
pub mod manifest;
pub mod sandbox;
