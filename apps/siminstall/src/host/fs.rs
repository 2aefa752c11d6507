//! Filesystem effects, desktop registries and the scratch directory.

use super::process::run_captured;
use siminstall_core::{FileSystem, RegistryUpdater, ScratchDir, ToolFailure};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

/// Mode of installed executables.
pub const EXECUTABLE_MODE: u32 = 0o755;

// =============================================================================
// FILESYSTEM
// =============================================================================

/// The real filesystem.
#[derive(Debug, Default)]
pub struct SystemFs;

fn io_failure(op: &str, path: &Path, err: &std::io::Error) -> ToolFailure {
    ToolFailure::io(&format!("{} {}", op, path.display()), err)
}

impl FileSystem for SystemFs {
    fn create_dir_all(&self, path: &Path) -> Result<(), ToolFailure> {
        fs::create_dir_all(path).map_err(|e| io_failure("create", path, &e))
    }

    fn install_executable(&self, from: &Path, to: &Path) -> Result<(), ToolFailure> {
        fs::copy(from, to).map_err(|e| io_failure("copy to", to, &e))?;
        fs::set_permissions(to, fs::Permissions::from_mode(EXECUTABLE_MODE))
            .map_err(|e| io_failure("chmod", to, &e))?;
        tracing::info!(path = %to.display(), "installed");
        Ok(())
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<(), ToolFailure> {
        if fs::rename(from, to).is_ok() {
            return Ok(());
        }
        // Scratch lives under /tmp, often a different filesystem.
        fs::copy(from, to).map_err(|e| io_failure("copy to", to, &e))?;
        fs::remove_file(from).map_err(|e| io_failure("remove", from, &e))
    }
}

// =============================================================================
// DESKTOP REGISTRIES
// =============================================================================

/// Runs registry refresh programs such as `update-mime-database`.
#[derive(Debug, Default)]
pub struct CommandRegistry;

impl RegistryUpdater for CommandRegistry {
    fn update(&self, program: &str, target: &Path) -> Result<(), ToolFailure> {
        run_captured(Command::new(program).arg(target))?;
        tracing::info!(program, target = %target.display(), "registry updated");
        Ok(())
    }
}

// =============================================================================
// SCRATCH DIRECTORY
// =============================================================================

/// A fresh temporary directory under the system temp location.
#[derive(Debug)]
pub struct TempScratch {
    dir: TempDir,
}

impl TempScratch {
    /// Create `<tmp>/siminstall-<package>-XXXXXX`.
    pub fn create(package: &str) -> Result<Self, ToolFailure> {
        let dir = tempfile::Builder::new()
            .prefix(&format!("siminstall-{}-", package))
            .tempdir()
            .map_err(|e| ToolFailure::io("create working directory", &e))?;
        tracing::debug!(path = %dir.path().display(), "working directory created");
        Ok(Self { dir })
    }
}

impl ScratchDir for TempScratch {
    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn remove(self: Box<Self>) -> Result<(), ToolFailure> {
        self.dir
            .close()
            .map_err(|e| ToolFailure::io("remove working directory", &e))
    }
}
