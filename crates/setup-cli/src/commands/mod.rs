//! Command implementations for setup-cli

pub mod install;
pub mod list;
pub mod plan;
pub mod tag;
pub mod upstream;
pub mod validate;

pub use install::{run_install, InstallOptions};
pub use list::run_list;
pub use plan::run_plan;
pub use tag::run_tag;
pub use upstream::run_sync_upstream;
pub use validate::run_validate;
