//! Component manifest model, parser and writer
//!
//! A manifest is INI-style text: one `[Options]` section plus one section per
//! package, where section order is the install order.
//!
//! ```text
//! [Options]
//! MinimumIDEVersion=27
//! DefaultIDE=D29
//!
//! [Package - 1]
//! Name=SynEdit
//! Git=https://github.com/pyscripter/SynEdit
//! Folder=SynEdit
//! SearchPath="Source", ""
//! D29="Packages\SynEdit_R.dproj", "Packages\SynEdit_D.dproj"
//! LibSuffix=%d0
//! ```

pub mod error;
pub mod list;
pub mod model;
pub mod parser;
pub mod template;
pub mod writer;

pub use error::{Error, ParseError, Result};
pub use model::{
    ActionKind, ArtifactKind, ExecuteEntry, Installable, Manifest, Options, PackageDefinition,
    SourceRef, TargetArtifacts, TargetVersion,
};
pub use template::{expand_base_folder, format_lib_suffix};
