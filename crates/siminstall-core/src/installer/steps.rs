//! Concrete installation steps.
//!
//! Every step is a small struct implementing [`Step`] over
//! [`InstallContext`]; all effects go through the context's collaborators.

use super::InstallContext;
use crate::ToolFailure;
use crate::capability::BuildRequest;
use crate::gate::CapabilityGate;
use crate::plan::{DesktopFile, InstallPlan, RegistryUpdate};
use crate::sequencer::Step;
use chrono::NaiveDateTime;
use std::path::PathBuf;

/// Boxed step over the install context.
pub type InstallStep<'c> = Box<dyn Step<InstallContext<'c>>>;

/// File name of the preserved build log, e.g. `lammps-build-20261019-142501.log`.
#[must_use]
pub fn diagnostic_log_name(package: &str, at: NaiveDateTime) -> String {
    format!("{}-build-{}.log", package, at.format("%Y%m%d-%H%M%S"))
}

// =============================================================================
// STEP LISTS
// =============================================================================

/// Steps installing the package itself, ending with the build tool version
/// check that feeds the desktop gate.
#[must_use]
pub fn core_steps<'c>(plan: &InstallPlan) -> Vec<InstallStep<'c>> {
    let mut steps: Vec<InstallStep<'c>> = vec![
        Box::new(FetchArchive),
        Box::new(ExtractArchive),
        Box::new(CreateBuildDir),
        Box::new(BuildSources),
    ];
    for binary in &plan.binaries {
        steps.push(Box::new(InstallBinary::new(binary.clone())));
    }
    steps.push(Box::new(CheckBuildToolVersion {
        gate: CapabilityGate::new(plan.build.tool.clone(), plan.desktop.minimum_build_tool),
    }));
    steps
}

/// File relocations followed by registry refreshes.
#[must_use]
pub fn desktop_steps<'c>(plan: &InstallPlan) -> Vec<InstallStep<'c>> {
    let mut steps: Vec<InstallStep<'c>> = Vec::new();
    for file in &plan.desktop.files {
        steps.push(Box::new(PlaceDesktopFile::new(file.clone())));
    }
    for registry in &plan.desktop.registries {
        steps.push(Box::new(UpdateRegistry::new(registry.clone())));
    }
    steps
}

// =============================================================================
// CORE STEPS
// =============================================================================

struct FetchArchive;

impl Step<InstallContext<'_>> for FetchArchive {
    fn id(&self) -> &str {
        "fetch"
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        ctx.fetcher.fetch(&ctx.plan.archive_url, &ctx.archive)
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Failed to download the source archive: {}", failure)
    }
}

struct ExtractArchive;

impl Step<InstallContext<'_>> for ExtractArchive {
    fn id(&self) -> &str {
        "extract"
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        let into = ctx.work_dir.join("src");
        let root = ctx.extractor.extract(&ctx.archive, &into)?;
        ctx.source_root = Some(root);
        Ok(())
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Failed to extract the source archive: {}", failure)
    }
}

struct CreateBuildDir;

impl Step<InstallContext<'_>> for CreateBuildDir {
    fn id(&self) -> &str {
        "create-build-dir"
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        ctx.fs.create_dir_all(&ctx.build_dir)
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Failed to create the build directory: {}", failure)
    }
}

struct BuildSources;

impl Step<InstallContext<'_>> for BuildSources {
    fn id(&self) -> &str {
        "build"
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        let root = ctx.source_root()?;
        let request = BuildRequest {
            source_dir: root.join(&ctx.plan.build.source_subdir),
            build_dir: ctx.build_dir.clone(),
            gui_option: ctx.plan.build.gui_option.clone(),
            gui: ctx.plan.build.gui,
            jobs: ctx.plan.build.jobs,
            defines: ctx.plan.build.defines.clone(),
            log_file: ctx.build_log.clone(),
        };
        ctx.builder.build(&request)
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Build failed: {}", failure)
    }

    /// Move the build log out of the scratch directory before it is removed.
    fn cleanup(&self, ctx: &mut InstallContext<'_>) -> Option<String> {
        let name = diagnostic_log_name(&ctx.plan.package, ctx.started_at);
        let dest = ctx.plan.paths.log_dir.join(name);

        let saved = ctx
            .fs
            .create_dir_all(&ctx.plan.paths.log_dir)
            .and_then(|()| ctx.fs.relocate(&ctx.build_log, &dest));

        Some(match saved {
            Ok(()) => {
                let msg = format!("Build log saved to {}", dest.display());
                ctx.saved_log = Some(dest);
                msg
            }
            Err(e) => format!("Could not save the build log: {}", e),
        })
    }
}

struct InstallBinary {
    id: String,
    binary: PathBuf,
}

impl InstallBinary {
    fn new(binary: PathBuf) -> Self {
        let name = binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            id: format!("install:{}", name),
            binary,
        }
    }
}

impl Step<InstallContext<'_>> for InstallBinary {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        let from = ctx.build_dir.join(&self.binary);
        let name = self
            .binary
            .file_name()
            .ok_or_else(|| ToolFailure::Io(format!("{} has no file name", self.binary.display())))?;
        let to = ctx.plan.paths.bin_dir.join(name);

        ctx.fs.install_executable(&from, &to)?;
        ctx.installed.push(to);
        Ok(())
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Failed to install {}: {}", self.binary.display(), failure)
    }
}

struct CheckBuildToolVersion {
    gate: CapabilityGate,
}

impl Step<InstallContext<'_>> for CheckBuildToolVersion {
    fn id(&self) -> &str {
        "version-check"
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        let decision = self.gate.evaluate(ctx.builder.version_output())?;
        ctx.gate = Some(decision);
        Ok(())
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Could not determine the build tool version: {}", failure)
    }
}

// =============================================================================
// DESKTOP STEPS
// =============================================================================

struct PlaceDesktopFile {
    id: String,
    file: DesktopFile,
}

impl PlaceDesktopFile {
    fn new(file: DesktopFile) -> Self {
        Self {
            id: format!("place:{}", file.file_name()),
            file,
        }
    }
}

impl Step<InstallContext<'_>> for PlaceDesktopFile {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        let from = ctx.source_root()?.join(&self.file.source);
        let to = self.file.target();

        ctx.fs.create_dir_all(&self.file.target_dir)?;
        ctx.fs.relocate(&from, &to)?;
        ctx.placed.push(to);
        Ok(())
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!(
            "Failed to place {} in {}: {}",
            self.file.file_name(),
            self.file.target_dir.display(),
            failure
        )
    }
}

struct UpdateRegistry {
    id: String,
    update: RegistryUpdate,
}

impl UpdateRegistry {
    fn new(update: RegistryUpdate) -> Self {
        Self {
            id: format!("registry:{}", update.name),
            update,
        }
    }
}

impl Step<InstallContext<'_>> for UpdateRegistry {
    fn id(&self) -> &str {
        &self.id
    }

    fn run(&self, ctx: &mut InstallContext<'_>) -> Result<(), ToolFailure> {
        ctx.registry.update(&self.update.program, &self.update.target)
    }

    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("Failed to update the {} registry: {}", self.update.name, failure)
    }
}

// =============================================================================
// TESTS
// =============================================================================
