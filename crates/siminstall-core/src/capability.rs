//! # Capability Interfaces
//!
//! Every external effect of an installation goes through one of these
//! traits. The binary wires real implementations (package database, fetch
//! tools, tar, cmake, filesystem); tests wire in-memory doubles.
//!
//! All methods take `&self`: collaborators are queried and invoked, never
//! reconfigured, during a run.

use crate::ToolFailure;
use std::path::{Path, PathBuf};

// =============================================================================
// PRECONDITION QUERIES
// =============================================================================

/// Whether the process runs with elevated privileges.
pub trait PrivilegeCheck {
    fn is_elevated(&self) -> bool;
}

/// Install status lookup in the system package database.
pub trait PackageQuery {
    /// Returns `Ok(true)` only when the package is fully installed.
    fn is_installed(&self, package: &str) -> Result<bool, ToolFailure>;
}

/// Executable lookup (e.g. on `PATH`).
pub trait ToolLocator {
    fn is_available(&self, command: &str) -> bool;
}

// =============================================================================
// PIPELINE ACTIONS
// =============================================================================

/// A mechanism that retrieves a URL into a local file.
pub trait Fetcher {
    /// Name of the tool backing this fetcher; matches a precondition name.
    fn tool(&self) -> &str;

    fn fetch(&self, url: &str, dest: &Path) -> Result<(), ToolFailure>;
}

/// Archive expansion.
pub trait Extractor {
    /// Expand `archive` inside `into` and return the root of the extracted
    /// source tree.
    fn extract(&self, archive: &Path, into: &Path) -> Result<PathBuf, ToolFailure>;
}

/// Parameters for one configure + compile run of the build tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Directory holding the top-level build description.
    pub source_dir: PathBuf,
    /// Out-of-tree build directory.
    pub build_dir: PathBuf,
    /// Name of the boolean build option toggling the GUI.
    pub gui_option: String,
    /// Value passed for `gui_option`.
    pub gui: bool,
    /// Parallel job count; `None` lets the build tool decide.
    pub jobs: Option<u32>,
    /// Extra `NAME=VALUE` definitions for the configure run.
    pub defines: Vec<String>,
    /// File receiving the build tool's combined output.
    pub log_file: PathBuf,
}

/// Build orchestration tool.
pub trait Builder {
    fn build(&self, request: &BuildRequest) -> Result<(), ToolFailure>;

    /// Raw output of the tool's version query.
    fn version_output(&self) -> Result<String, ToolFailure>;
}

/// Filesystem mutations performed by the pipeline.
pub trait FileSystem {
    fn create_dir_all(&self, path: &Path) -> Result<(), ToolFailure>;

    /// Copy an executable to `to` and mark it world-executable.
    fn install_executable(&self, from: &Path, to: &Path) -> Result<(), ToolFailure>;

    /// Move a file to `to`, across filesystems if needed.
    fn relocate(&self, from: &Path, to: &Path) -> Result<(), ToolFailure>;
}

/// System-wide desktop registries (mime database, desktop-file database).
pub trait RegistryUpdater {
    fn update(&self, program: &str, target: &Path) -> Result<(), ToolFailure>;
}

/// Scoped temporary working directory owned by one run.
pub trait ScratchDir {
    fn path(&self) -> &Path;

    /// Remove the directory and everything below it.
    fn remove(self: Box<Self>) -> Result<(), ToolFailure>;
}

// =============================================================================
// HOST
// =============================================================================

/// The full set of collaborators an installation runs against.
///
/// Fetchers are listed in preference order.
pub struct Host<'a> {
    pub privilege: &'a dyn PrivilegeCheck,
    pub packages: &'a dyn PackageQuery,
    pub tools: &'a dyn ToolLocator,
    pub fetchers: Vec<&'a dyn Fetcher>,
    pub extractor: &'a dyn Extractor,
    pub builder: &'a dyn Builder,
    pub fs: &'a dyn FileSystem,
    pub registry: &'a dyn RegistryUpdater,
}
