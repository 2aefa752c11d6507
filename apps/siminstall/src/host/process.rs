//! Spawning external tools and mapping their outcome to [`ToolFailure`].

use siminstall_core::ToolFailure;
use std::fs::File;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Name of the program a command runs, for diagnostics.
fn program_of(cmd: &Command) -> String {
    cmd.get_program().to_string_lossy().into_owned()
}

fn spawn_failure(cmd: &Command, err: &std::io::Error) -> ToolFailure {
    ToolFailure::Spawn {
        program: program_of(cmd),
        reason: err.to_string(),
    }
}

fn exit_failure(cmd: &Command, status: std::process::ExitStatus) -> ToolFailure {
    ToolFailure::Exit {
        program: program_of(cmd),
        status: status.to_string(),
    }
}

/// Run to completion with captured output; a nonzero exit is an error.
pub fn run_captured(cmd: &mut Command) -> Result<Output, ToolFailure> {
    let output = capture(cmd)?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(exit_failure(cmd, output.status))
    }
}

/// Run to completion with captured output, whatever the exit status.
pub fn capture(cmd: &mut Command) -> Result<Output, ToolFailure> {
    tracing::debug!(command = ?cmd, "running");
    cmd.stdin(Stdio::null())
        .output()
        .map_err(|e| spawn_failure(cmd, &e))
}

/// Run to completion with stdout and stderr appended to `log`.
pub fn run_logged(cmd: &mut Command, log: &Path) -> Result<(), ToolFailure> {
    let file = File::options()
        .create(true)
        .append(true)
        .open(log)
        .map_err(|e| ToolFailure::io(&format!("open {}", log.display()), &e))?;
    let stderr = file
        .try_clone()
        .map_err(|e| ToolFailure::io(&format!("open {}", log.display()), &e))?;

    tracing::debug!(command = ?cmd, log = %log.display(), "running");
    let status = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::from(file))
        .stderr(Stdio::from(stderr))
        .status()
        .map_err(|e| spawn_failure(cmd, &e))?;

    if status.success() {
        Ok(())
    } else {
        Err(exit_failure(cmd, status))
    }
}

/// Run to completion with inherited stdio; a nonzero exit is an error.
pub fn run_inherited(cmd: &mut Command) -> Result<(), ToolFailure> {
    tracing::debug!(command = ?cmd, "running");
    let status = cmd
        .stdin(Stdio::null())
        .status()
        .map_err(|e| spawn_failure(cmd, &e))?;
    if status.success() {
        Ok(())
    } else {
        Err(exit_failure(cmd, status))
    }
}
