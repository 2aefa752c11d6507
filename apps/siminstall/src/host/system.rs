//! Precondition probes: privilege, package database, executable lookup.

use super::process::{capture, run_captured};
use siminstall_core::{PackageQuery, PrivilegeCheck, ToolFailure, ToolLocator};
use std::ffi::OsString;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::Command;

// =============================================================================
// PRIVILEGE
// =============================================================================

/// Effective user id 0, as reported by `id -u`.
#[derive(Debug, Default)]
pub struct RootCheck;

impl PrivilegeCheck for RootCheck {
    fn is_elevated(&self) -> bool {
        match run_captured(Command::new("id").arg("-u")) {
            Ok(output) => String::from_utf8_lossy(&output.stdout).trim() == "0",
            Err(e) => {
                tracing::warn!(error = %e, "cannot determine effective user id");
                false
            }
        }
    }
}

// =============================================================================
// PACKAGE DATABASE
// =============================================================================

/// Package status from `dpkg-query`.
#[derive(Debug, Default)]
pub struct DpkgQuery;

/// `true` when every `${Status}` line says the package is fully installed.
///
/// A multi-arch package prints one line per installed architecture.
pub fn is_installed_status(status: &str) -> bool {
    let mut lines = status
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .peekable();
    lines.peek().is_some() && lines.all(|l| l == "install ok installed")
}

impl PackageQuery for DpkgQuery {
    fn is_installed(&self, package: &str) -> Result<bool, ToolFailure> {
        let output = capture(
            Command::new("dpkg-query")
                .args(["-W", "-f=${Status}\n"])
                .arg(package),
        )?;
        // dpkg-query exits 1 for packages it has never heard of.
        if !output.status.success() {
            return Ok(false);
        }
        Ok(is_installed_status(&String::from_utf8_lossy(&output.stdout)))
    }
}

// =============================================================================
// EXECUTABLE LOOKUP
// =============================================================================

/// Looks commands up in a `PATH`-style directory list.
#[derive(Debug, Clone)]
pub struct PathLocator {
    search_path: Option<OsString>,
}

impl PathLocator {
    /// Search the process `PATH`.
    pub fn from_env() -> Self {
        Self::with_search_path(std::env::var_os("PATH"))
    }

    pub fn with_search_path(search_path: Option<OsString>) -> Self {
        Self { search_path }
    }
}

fn is_executable_file(path: &Path) -> bool {
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

impl ToolLocator for PathLocator {
    fn is_available(&self, command: &str) -> bool {
        if command.contains('/') {
            return is_executable_file(Path::new(command));
        }
        let Some(search_path) = &self.search_path else {
            return false;
        };
        std::env::split_paths(search_path).any(|dir| is_executable_file(&dir.join(command)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn installed_status() {
        assert!(is_installed_status("install ok installed"));
        assert!(!is_installed_status("deinstall ok config-files"));
        assert!(!is_installed_status("install ok half-configured"));
        assert!(!is_installed_status(""));
    }

    #[test]
    fn multiarch_status_needs_every_line_installed() {
        assert!(is_installed_status("install ok installed\ninstall ok installed\n"));
        assert!(!is_installed_status("install ok installed\ndeinstall ok config-files\n"));
        assert!(!is_installed_status("\n\n"));
    }

    #[test]
    fn locator_requires_executable_bit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tool = dir.path().join("wget");
        fs::write(&tool, "#!/bin/sh\n").expect("write");
        let locator = PathLocator::with_search_path(Some(dir.path().as_os_str().to_owned()));

        fs::set_permissions(&tool, fs::Permissions::from_mode(0o644)).expect("chmod");
        assert!(!locator.is_available("wget"));

        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod");
        assert!(locator.is_available("wget"));
        assert!(!locator.is_available("curl"));
    }

    #[test]
    fn locator_without_path_finds_nothing() {
        assert!(!PathLocator::with_search_path(None).is_available("sh"));
    }

    #[test]
    fn locator_searches_every_entry() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        let tool = second.path().join("curl");
        fs::write(&tool, "").expect("write");
        fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod");

        let joined = std::env::join_paths([first.path(), second.path()]).expect("join");
        assert!(PathLocator::with_search_path(Some(joined)).is_available("curl"));
    }
}
