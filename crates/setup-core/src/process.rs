//! Spawning external tools

use std::path::Path;
use std::process::Command;

use crate::{Error, Result};

/// Build a command that runs `cmd_str` through the platform shell.
///
/// On Unix: `sh -c "{cmd_str}"`
/// On Windows: `cmd /C "{cmd_str}"`
pub fn shell_command(cmd_str: &str) -> Command {
    #[cfg(windows)]
    {
        let mut c = Command::new("cmd");
        c.args(["/C", cmd_str]);
        c
    }
    #[cfg(not(windows))]
    {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd_str);
        c
    }
}

/// Build a command that executes the file at `program`.
///
/// Batch files on Windows have to go through `cmd`.
pub fn program_command(program: &Path) -> Command {
    #[cfg(windows)]
    {
        let is_batch = program
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("bat") || e.eq_ignore_ascii_case("cmd"));
        if is_batch {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(program);
            return c;
        }
    }
    Command::new(program)
}

/// Output of a finished process.
#[derive(Debug, Clone)]
pub struct Captured {
    pub success: bool,
    pub exit_code: Option<i32>,
    /// stdout followed by stderr
    pub output: String,
}

/// Run `cmd` to completion, capturing its output.
///
/// Only a failure to start is an error; a non-zero exit is reported in
/// [`Captured`]. `display` names the command in errors.
pub fn run_captured(cmd: &mut Command, display: &str) -> Result<Captured> {
    let output = cmd
        .stdin(std::process::Stdio::null())
        .output()
        .map_err(|e| Error::Execution {
            command: display.to_string(),
            exit_code: None,
            message: e.to_string(),
        })?;

    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&stderr);
    }

    Ok(Captured {
        success: output.status.success(),
        exit_code: output.status.code(),
        output: text,
    })
}
