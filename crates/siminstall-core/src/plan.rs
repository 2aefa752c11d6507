//! # Install Plan
//!
//! Declarative description of one installation: what to fetch, what must be
//! present beforehand, how to build, and where the results go.
//!
//! Plans are deserialized (the binary reads TOML) and must pass
//! [`InstallPlan::validate`] before an [`crate::Installer`] accepts them.

use crate::InstallError;
use crate::gate::ToolVersion;
use crate::precondition::Precondition;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

// =============================================================================
// PLAN SECTIONS
// =============================================================================

/// Build tool invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSettings {
    /// Name of the build tool, used in diagnostics.
    #[serde(default = "default_build_tool")]
    pub tool: String,
    /// Directory holding the build description, relative to the source root.
    #[serde(default)]
    pub source_subdir: PathBuf,
    /// Build directory name inside the scratch directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    /// Boolean build option that toggles the GUI.
    pub gui_option: String,
    #[serde(default = "default_true")]
    pub gui: bool,
    pub jobs: Option<u32>,
    /// Extra `NAME=VALUE` cache definitions passed at configure time.
    #[serde(default)]
    pub defines: Vec<String>,
}

fn default_build_tool() -> String {
    "cmake".to_string()
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_true() -> bool {
    true
}

/// One desktop-integration file to relocate from the source tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesktopFile {
    /// Path relative to the extracted source root.
    pub source: PathBuf,
    /// Absolute destination directory.
    pub target_dir: PathBuf,
}

impl DesktopFile {
    /// File name of the source; the placed file keeps it.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Where the file ends up once placed.
    #[must_use]
    pub fn target(&self) -> PathBuf {
        self.target_dir.join(self.file_name())
    }
}

/// A registry refresh command run after desktop files are placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryUpdate {
    pub name: String,
    pub program: String,
    pub target: PathBuf,
}

/// Desktop-integration branch, gated on the build tool version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DesktopSettings {
    /// Build tool version from which the branch runs.
    pub minimum_build_tool: ToolVersion,
    #[serde(default)]
    pub files: Vec<DesktopFile>,
    #[serde(default)]
    pub registries: Vec<RegistryUpdate>,
}

/// Standard system locations written by the installer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetPaths {
    pub bin_dir: PathBuf,
    pub log_dir: PathBuf,
}

// =============================================================================
// INSTALL PLAN
// =============================================================================

/// Complete installation description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstallPlan {
    /// Short package name, used in file names and messages.
    pub package: String,
    pub archive_url: String,
    /// File name the archive is saved under in the scratch directory.
    pub archive_name: String,
    #[serde(default)]
    pub preconditions: Vec<Precondition>,
    /// Fetch tools in preference order; each must name a precondition.
    pub fetchers: Vec<String>,
    pub build: BuildSettings,
    /// Executables to install, as paths relative to the build directory.
    pub binaries: Vec<PathBuf>,
    pub desktop: DesktopSettings,
    pub paths: TargetPaths,
}

impl InstallPlan {
    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), InstallError> {
        if self.package.trim().is_empty() {
            return Err(invalid("package name is empty"));
        }
        if self.archive_url.trim().is_empty() {
            return Err(invalid("archive_url is empty"));
        }
        if !is_plain_file_name(Path::new(&self.archive_name)) {
            return Err(invalid(format!(
                "archive_name `{}` must be a plain file name",
                self.archive_name
            )));
        }

        let mut names = BTreeSet::new();
        for p in &self.preconditions {
            if !names.insert(p.name.as_str()) {
                return Err(invalid(format!("duplicate precondition `{}`", p.name)));
            }
        }

        if self.fetchers.is_empty() {
            return Err(invalid("at least one fetcher is required"));
        }
        for fetcher in &self.fetchers {
            if !names.contains(fetcher.as_str()) {
                return Err(invalid(format!(
                    "fetcher `{}` has no precondition of the same name",
                    fetcher
                )));
            }
        }

        if self.binaries.is_empty() {
            return Err(invalid("no binaries to install"));
        }
        for binary in &self.binaries {
            if !is_relative_inside(binary) {
                return Err(invalid(format!(
                    "binary `{}` must be relative to the build directory",
                    binary.display()
                )));
            }
        }
        let mut targets = BTreeSet::new();
        for target in self.installed_binaries() {
            if !targets.insert(target.clone()) {
                return Err(invalid(format!("two binaries install to `{}`", target.display())));
            }
        }

        if !is_plain_file_name(Path::new(&self.build.build_dir)) {
            return Err(invalid("build.build_dir must be a plain directory name"));
        }
        if !self.build.source_subdir.as_os_str().is_empty()
            && !is_relative_inside(&self.build.source_subdir)
        {
            return Err(invalid("build.source_subdir must be relative"));
        }
        for define in &self.build.defines {
            if !matches!(define.split_once('='), Some((name, _)) if !name.is_empty()) {
                return Err(invalid(format!(
                    "build define `{}` must have the form NAME=VALUE",
                    define
                )));
            }
        }

        require_absolute(&self.paths.bin_dir, "paths.bin_dir")?;
        require_absolute(&self.paths.log_dir, "paths.log_dir")?;

        for file in &self.desktop.files {
            if !is_relative_inside(&file.source) {
                return Err(invalid(format!(
                    "desktop file `{}` must be relative to the source root",
                    file.source.display()
                )));
            }
            require_absolute(&file.target_dir, "desktop target_dir")?;
            let target = file.target();
            if !targets.insert(target.clone()) {
                return Err(invalid(format!("two files are placed at `{}`", target.display())));
            }
        }
        for registry in &self.desktop.registries {
            require_absolute(&registry.target, "registry target")?;
        }

        Ok(())
    }

    /// Installed location of each binary, in declared order.
    #[must_use]
    pub fn installed_binaries(&self) -> Vec<PathBuf> {
        self.binaries
            .iter()
            .filter_map(|b| b.file_name())
            .map(|name| self.paths.bin_dir.join(name))
            .collect()
    }
}

fn invalid(msg: impl Into<String>) -> InstallError {
    InstallError::InvalidPlan(msg.into())
}

fn require_absolute(path: &Path, field: &str) -> Result<(), InstallError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} `{}` must be absolute",
            field,
            path.display()
        )))
    }
}

fn is_plain_file_name(path: &Path) -> bool {
    let mut components = path.components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn is_relative_inside(path: &Path) -> bool {
    path.components().next().is_some()
        && path.components().all(|c| matches!(c, Component::Normal(_)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::precondition::Probe;

    fn plan() -> InstallPlan {
        InstallPlan {
            package: "lammps".into(),
            archive_url: "https://download.lammps.org/tars/lammps-stable.tar.gz".into(),
            archive_name: "lammps-stable.tar.gz".into(),
            preconditions: vec![
                Precondition::package("cmake", "apt install cmake"),
                Precondition {
                    name: "wget".into(),
                    probe: Probe::Command("wget".into()),
                    remediation: "apt install wget".into(),
                    required: false,
                },
            ],
            fetchers: vec!["wget".into()],
            build: BuildSettings {
                tool: "cmake".into(),
                source_subdir: PathBuf::from("cmake"),
                build_dir: "build".into(),
                gui_option: "BUILD_LAMMPS_GUI".into(),
                gui: true,
                jobs: None,
                defines: Vec::new(),
            },
            binaries: vec![PathBuf::from("lmp"), PathBuf::from("lammps-gui")],
            desktop: DesktopSettings {
                minimum_build_tool: ToolVersion::new(3, 20, 0),
                files: vec![DesktopFile {
                    source: PathBuf::from("tools/lammps-gui/lammps-gui.desktop"),
                    target_dir: PathBuf::from("/usr/share/applications"),
                }],
                registries: Vec::new(),
            },
            paths: TargetPaths {
                bin_dir: PathBuf::from("/usr/local/bin"),
                log_dir: PathBuf::from("/var/log"),
            },
        }
    }

    #[test]
    fn valid_plan_passes() {
        assert!(plan().validate().is_ok());
    }

    #[test]
    fn fetcher_needs_precondition() {
        let mut p = plan();
        p.fetchers.push("curl".into());
        assert!(matches!(p.validate(), Err(InstallError::InvalidPlan(m)) if m.contains("curl")));
    }

    #[test]
    fn duplicate_precondition_rejected() {
        let mut p = plan();
        p.preconditions.push(Precondition::package("cmake", "again"));
        assert!(p.validate().is_err());
    }

    #[test]
    fn relative_targets_rejected() {
        let mut p = plan();
        p.paths.bin_dir = PathBuf::from("bin");
        assert!(p.validate().is_err());

        let mut p = plan();
        p.desktop.files[0].source = PathBuf::from("../escape.desktop");
        assert!(p.validate().is_err());
    }

    #[test]
    fn archive_name_must_be_plain() {
        let mut p = plan();
        p.archive_name = "nested/archive.tar.gz".into();
        assert!(p.validate().is_err());
    }

    #[test]
    fn build_defines_need_a_name() {
        let mut p = plan();
        p.build.defines = vec!["BUILD_TOOLS=ON".into(), "PKG_MOLECULE=".into()];
        assert!(p.validate().is_ok());

        p.build.defines.push("=ON".into());
        assert!(p.validate().is_err());

        p.build.defines = vec!["BUILD_TOOLS".into()];
        assert!(p.validate().is_err());
    }

    #[test]
    fn installed_binaries_land_in_bin_dir() {
        assert_eq!(
            plan().installed_binaries(),
            vec![
                PathBuf::from("/usr/local/bin/lmp"),
                PathBuf::from("/usr/local/bin/lammps-gui"),
            ]
        );
    }

    #[test]
    fn binaries_sharing_a_file_name_rejected() {
        let mut p = plan();
        p.binaries = vec![PathBuf::from("bin/lmp"), PathBuf::from("tools/lmp")];
        assert!(matches!(
            p.validate(),
            Err(InstallError::InvalidPlan(m)) if m.contains("/usr/local/bin/lmp")
        ));
    }

    #[test]
    fn desktop_files_sharing_a_target_rejected() {
        let mut p = plan();
        p.desktop.files.push(DesktopFile {
            source: PathBuf::from("share/lammps-gui.desktop"),
            target_dir: PathBuf::from("/usr/share/applications"),
        });
        assert!(matches!(
            p.validate(),
            Err(InstallError::InvalidPlan(m)) if m.contains("applications/lammps-gui.desktop")
        ));

        p.desktop.files[1].target_dir = PathBuf::from("/usr/local/share/applications");
        assert!(p.validate().is_ok());
    }

    #[test]
    fn desktop_file_name_and_target() {
        let file = &plan().desktop.files[0];
        assert_eq!(file.file_name(), "lammps-gui.desktop");
        assert_eq!(
            file.target(),
            PathBuf::from("/usr/share/applications/lammps-gui.desktop")
        );
    }
}
