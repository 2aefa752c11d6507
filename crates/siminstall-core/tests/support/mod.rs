//! In-memory host used by the integration tests.
//!
//! Every collaborator call is appended to a shared call log so tests can
//! assert on exactly which side effects happened, and in which order.

// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use siminstall_core::{
    BuildRequest, BuildSettings, Builder, DesktopFile, DesktopSettings, Extractor, Fetcher,
    FileSystem, Host, InstallError, InstallPlan, InstallSummary, Installer, MemoryReporter,
    PackageQuery, Precondition, PrivilegeCheck, Probe, RegistryUpdate, RegistryUpdater,
    ScratchDir, TargetPaths, ToolFailure, ToolLocator, ToolVersion,
};
use chrono::NaiveDate;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub const SCRATCH: &str = "/tmp/siminstall-test";
pub const REQUIRED: [&str; 3] = ["build-essential", "cmake", "qt6-base-dev"];

// =============================================================================
// CALL LOG
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Fetch { tool: String, url: String, dest: PathBuf },
    Extract { archive: PathBuf, into: PathBuf },
    Build(BuildRequest),
    Version,
    CreateDir(PathBuf),
    InstallExecutable { from: PathBuf, to: PathBuf },
    Relocate { from: PathBuf, to: PathBuf },
    Registry { program: String, target: PathBuf },
    RemoveScratch,
}

impl Call {
    /// Calls that change the system outside the scratch directory, or
    /// reach the network.
    pub fn is_side_effect(&self) -> bool {
        !matches!(self, Call::Version)
    }
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

// =============================================================================
// WORLD
// =============================================================================

/// A scriptable fake host.
pub struct World {
    pub elevated: bool,
    pub packages: BTreeSet<String>,
    pub on_path: BTreeSet<String>,
    pub fetch_fails: bool,
    pub build_fails: bool,
    pub version_output: Result<String, ToolFailure>,
    /// Relocations whose destination file name matches this fail.
    pub relocate_fails_for: Option<String>,
    pub scratch_create_fails: bool,
    pub scratch_remove_fails: bool,
    pub scratch_created: Cell<bool>,
    pub log: CallLog,
}

impl Default for World {
    fn default() -> Self {
        Self {
            elevated: true,
            packages: REQUIRED.iter().map(|s| s.to_string()).collect(),
            on_path: ["wget", "curl"].iter().map(|s| s.to_string()).collect(),
            fetch_fails: false,
            build_fails: false,
            version_output: Ok("cmake version 3.28.3\n".to_string()),
            relocate_fails_for: None,
            scratch_create_fails: false,
            scratch_remove_fails: false,
            scratch_created: Cell::new(false),
            log: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl World {
    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }

    pub fn fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Fetch { tool, .. } => Some(tool),
                _ => None,
            })
            .collect()
    }

    pub fn relocations(&self) -> Vec<(PathBuf, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Relocate { from, to } => Some((from, to)),
                _ => None,
            })
            .collect()
    }

    pub fn registry_updates(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Registry { program, .. } => Some(program),
                _ => None,
            })
            .collect()
    }

    pub fn installed_executables(&self) -> Vec<PathBuf> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::InstallExecutable { to, .. } => Some(to),
                _ => None,
            })
            .collect()
    }
}

fn exit(program: &str) -> ToolFailure {
    ToolFailure::Exit {
        program: program.to_string(),
        status: "exit status: 1".to_string(),
    }
}

impl PrivilegeCheck for World {
    fn is_elevated(&self) -> bool {
        self.elevated
    }
}

impl PackageQuery for World {
    fn is_installed(&self, package: &str) -> Result<bool, ToolFailure> {
        Ok(self.packages.contains(package))
    }
}

impl ToolLocator for World {
    fn is_available(&self, command: &str) -> bool {
        self.on_path.contains(command)
    }
}

impl Extractor for World {
    fn extract(&self, archive: &Path, into: &Path) -> Result<PathBuf, ToolFailure> {
        self.record(Call::Extract {
            archive: archive.to_path_buf(),
            into: into.to_path_buf(),
        });
        Ok(into.join("lammps-stable"))
    }
}

impl Builder for World {
    fn build(&self, request: &BuildRequest) -> Result<(), ToolFailure> {
        self.record(Call::Build(request.clone()));
        if self.build_fails {
            Err(exit("cmake"))
        } else {
            Ok(())
        }
    }

    fn version_output(&self) -> Result<String, ToolFailure> {
        self.record(Call::Version);
        self.version_output.clone()
    }
}

impl FileSystem for World {
    fn create_dir_all(&self, path: &Path) -> Result<(), ToolFailure> {
        self.record(Call::CreateDir(path.to_path_buf()));
        Ok(())
    }

    fn install_executable(&self, from: &Path, to: &Path) -> Result<(), ToolFailure> {
        self.record(Call::InstallExecutable {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        Ok(())
    }

    fn relocate(&self, from: &Path, to: &Path) -> Result<(), ToolFailure> {
        self.record(Call::Relocate {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
        });
        let name = to.file_name().map(|n| n.to_string_lossy().into_owned());
        match (&self.relocate_fails_for, name) {
            (Some(bad), Some(name)) if *bad == name => Err(ToolFailure::Io(format!(
                "rename {}: permission denied",
                to.display()
            ))),
            _ => Ok(()),
        }
    }
}

impl RegistryUpdater for World {
    fn update(&self, program: &str, target: &Path) -> Result<(), ToolFailure> {
        self.record(Call::Registry {
            program: program.to_string(),
            target: target.to_path_buf(),
        });
        Ok(())
    }
}

// =============================================================================
// FETCHERS AND SCRATCH
// =============================================================================

pub struct FakeFetcher<'w> {
    pub tool: &'static str,
    pub world: &'w World,
}

impl Fetcher for FakeFetcher<'_> {
    fn tool(&self) -> &str {
        self.tool
    }

    fn fetch(&self, url: &str, dest: &Path) -> Result<(), ToolFailure> {
        self.world.record(Call::Fetch {
            tool: self.tool.to_string(),
            url: url.to_string(),
            dest: dest.to_path_buf(),
        });
        if self.world.fetch_fails {
            Err(exit(self.tool))
        } else {
            Ok(())
        }
    }
}

pub struct FakeScratch {
    path: PathBuf,
    fails: bool,
    log: CallLog,
}

impl ScratchDir for FakeScratch {
    fn path(&self) -> &Path {
        &self.path
    }

    fn remove(self: Box<Self>) -> Result<(), ToolFailure> {
        self.log.borrow_mut().push(Call::RemoveScratch);
        if self.fails {
            Err(ToolFailure::Io("directory not empty".to_string()))
        } else {
            Ok(())
        }
    }
}

// =============================================================================
// PLAN
// =============================================================================

pub fn plan() -> InstallPlan {
    let mut preconditions: Vec<Precondition> = REQUIRED
        .iter()
        .map(|p| Precondition::package(*p, format!("sudo apt install {}", p)))
        .collect();
    for tool in ["wget", "curl"] {
        preconditions.push(Precondition {
            name: tool.to_string(),
            probe: Probe::Command(tool.to_string()),
            remediation: format!("sudo apt install {}", tool),
            required: false,
        });
    }

    let desktop_file = |source: &str, target: &str| DesktopFile {
        source: PathBuf::from(source),
        target_dir: PathBuf::from(target),
    };

    InstallPlan {
        package: "lammps".to_string(),
        archive_url: "https://download.lammps.org/tars/lammps-stable.tar.gz".to_string(),
        archive_name: "lammps-stable.tar.gz".to_string(),
        preconditions,
        fetchers: vec!["wget".to_string(), "curl".to_string()],
        build: BuildSettings {
            tool: "cmake".to_string(),
            source_subdir: PathBuf::from("cmake"),
            build_dir: "build".to_string(),
            gui_option: "BUILD_LAMMPS_GUI".to_string(),
            gui: true,
            jobs: Some(4),
            defines: vec!["BUILD_TOOLS=ON".to_string()],
        },
        binaries: vec![
            PathBuf::from("lmp"),
            PathBuf::from("msi2lmp"),
            PathBuf::from("lammps-gui"),
        ],
        desktop: DesktopSettings {
            minimum_build_tool: ToolVersion::new(3, 20, 0),
            files: vec![
                desktop_file(
                    "tools/lammps-gui/lammps.png",
                    "/usr/share/icons/hicolor/128x128/apps",
                ),
                desktop_file(
                    "tools/lammps-gui/lammps-input.png",
                    "/usr/share/icons/hicolor/128x128/mimetypes",
                ),
                desktop_file("tools/lammps-gui/lammps-input.xml", "/usr/share/mime/packages"),
                desktop_file(
                    "tools/lammps-gui/lammps-gui.desktop",
                    "/usr/share/applications",
                ),
                desktop_file(
                    "tools/lammps-gui/lammps-gui.appdata.xml",
                    "/usr/share/metainfo",
                ),
            ],
            registries: vec![
                RegistryUpdate {
                    name: "mime".to_string(),
                    program: "update-mime-database".to_string(),
                    target: PathBuf::from("/usr/share/mime"),
                },
                RegistryUpdate {
                    name: "desktop".to_string(),
                    program: "update-desktop-database".to_string(),
                    target: PathBuf::from("/usr/share/applications"),
                },
            ],
        },
        paths: TargetPaths {
            bin_dir: PathBuf::from("/usr/local/bin"),
            log_dir: PathBuf::from("/var/log"),
        },
    }
}

// =============================================================================
// RUNNER
// =============================================================================

pub fn started_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|d| d.and_hms_opt(14, 25, 1))
        .expect("valid timestamp")
}

/// Run the standard plan against `world`.
pub fn run(world: &World) -> (Result<InstallSummary, InstallError>, MemoryReporter) {
    run_plan(world, &plan())
}

pub fn run_plan(
    world: &World,
    plan: &InstallPlan,
) -> (Result<InstallSummary, InstallError>, MemoryReporter) {
    let wget = FakeFetcher { tool: "wget", world };
    let curl = FakeFetcher { tool: "curl", world };
    let host = Host {
        privilege: world,
        packages: world,
        tools: world,
        fetchers: vec![&wget as &dyn Fetcher, &curl],
        extractor: world,
        builder: world,
        fs: world,
        registry: world,
    };

    let mut reporter = MemoryReporter::new();
    let installer = Installer::new(plan).expect("plan is valid");
    let result = installer.run(
        &host,
        || {
            if world.scratch_create_fails {
                return Err(ToolFailure::Io("no space left on device".to_string()));
            }
            world.scratch_created.set(true);
            Ok(Box::new(FakeScratch {
                path: PathBuf::from(SCRATCH),
                fails: world.scratch_remove_fails,
                log: Rc::clone(&world.log),
            }) as Box<dyn ScratchDir>)
        },
        started_at(),
        &mut reporter,
    );
    (result, reporter)
}
