//! Compiler collaborator
//!
//! The installer asks for one artifact at a time and only needs to know
//! whether it built and what the tool printed.

use setup_fs::NormalizedPath;
use setup_manifest::{ArtifactKind, TargetVersion};

use crate::process::{run_captured, shell_command};
use crate::Result;

/// Everything the compiler is told about one artifact.
#[derive(Debug, Clone)]
pub struct CompileRequest {
    pub package: String,
    /// Absolute artifact path
    pub artifact: NormalizedPath,
    pub kind: ArtifactKind,
    pub target: TargetVersion,
    pub lib_suffix: Option<String>,
    /// Search paths registered in the target environment at the time of the
    /// request, in registration order
    pub search_paths: Vec<NormalizedPath>,
    /// Package folder
    pub working_dir: NormalizedPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOutput {
    pub success: bool,
    pub diagnostics: String,
}

pub trait Compiler: Send {
    /// Compile one artifact. `Err` means the tool could not be run at all;
    /// a build failure is `Ok` with `success == false`.
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput>;
}

/// Runs a configured command line per artifact.
///
/// The template may use `{artifact}`, `{suffix}`, `{target}`,
/// `{search_path}` (entries joined with `;`) and `{package}`. The same values
/// are exported as `SETUP_ARTIFACT`, `SETUP_LIB_SUFFIX`, `SETUP_TARGET`,
/// `SETUP_SEARCH_PATH` and `SETUP_PACKAGE`.
#[derive(Debug, Clone)]
pub struct CommandCompiler {
    template: String,
}

impl CommandCompiler {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn render(&self, request: &CompileRequest) -> String {
        self.template
            .replace("{artifact}", &request.artifact.to_native().to_string_lossy())
            .replace("{suffix}", request.lib_suffix.as_deref().unwrap_or(""))
            .replace("{target}", &request.target.to_string())
            .replace("{search_path}", &joined_search_path(request))
            .replace("{package}", &request.package)
    }
}

fn joined_search_path(request: &CompileRequest) -> String {
    request
        .search_paths
        .iter()
        .map(|p| p.to_native().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(";")
}

impl Compiler for CommandCompiler {
    fn compile(&self, request: &CompileRequest) -> Result<CompileOutput> {
        if !request.artifact.is_file() {
            return Ok(CompileOutput {
                success: false,
                diagnostics: format!("artifact not found: {}", request.artifact),
            });
        }

        let command_line = self.render(request);
        tracing::debug!(command = %command_line, "Running compiler");

        let mut cmd = shell_command(&command_line);
        cmd.current_dir(request.working_dir.to_native())
            .env("SETUP_PACKAGE", &request.package)
            .env("SETUP_ARTIFACT", request.artifact.to_native())
            .env("SETUP_TARGET", request.target.to_string())
            .env("SETUP_LIB_SUFFIX", request.lib_suffix.as_deref().unwrap_or(""))
            .env("SETUP_SEARCH_PATH", joined_search_path(request));

        let captured = run_captured(&mut cmd, &command_line)?;
        Ok(CompileOutput {
            success: captured.success,
            diagnostics: captured.output,
        })
    }
}
