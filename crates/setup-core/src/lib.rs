//! Installer engine for Component Setup
//!
//! Turns a parsed manifest into installed packages for one IDE target:
//!
//! ```text
//! Manifest ─► Pipeline ─┬─► RepositoryFetcher ─► SourceControl      (concurrent)
//!                       └─► PackageInstaller ─┬─► registrar ─► EnvironmentStore
//!                                             ├─► Compiler               (sequential)
//!                                             └─► ActionRunner
//! ```
//!
//! The version-control system, the compiler and the IDE's persisted
//! settings are collaborators behind traits; the CLI wires the real ones
//! and tests wire fakes.

pub mod actions;
pub mod cancel;
pub mod compiler;
pub mod context;
pub mod error;
pub mod fetcher;
pub mod installer;
pub mod pipeline;
pub mod plan;
pub mod process;
pub mod registrar;
pub mod resolver;
pub mod store;
pub mod summary;

pub use actions::{ActionEffect, ActionReport, ActionRunner};
pub use cancel::CancelToken;
pub use compiler::{CommandCompiler, CompileOutput, CompileRequest, Compiler};
pub use context::{RunContext, DEFAULT_JOBS};
pub use error::{Error, ErrorKind, Result};
pub use fetcher::{FetchStatus, RepositoryFetcher};
pub use installer::{InstallResult, PackageInstaller};
pub use pipeline::{select_packages, Pipeline};
pub use plan::{PackagePlan, PathState, Plan, PlanStep};
pub use registrar::{package_paths, register_package, PathEntry, RegistrationReport};
pub use resolver::{check_target, resolve, ResolvedArtifact, ResolvedTarget};
pub use store::{
    EnvironmentState, EnvironmentStore, FileEnvironmentStore, MemoryEnvironmentStore, PathList,
};
pub use summary::{ActionSummary, Failure, PackageReport, PackageStatus, RunSummary};
