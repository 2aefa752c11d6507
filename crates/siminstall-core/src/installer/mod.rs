//! # Installer
//!
//! Drives one installation end to end:
//!
//! ```text
//! privilege ──▶ preconditions ──▶ fetcher selection ──▶ scratch dir
//!                                                          │
//!     ┌────────────────────────────────────────────────────┘
//!     ▼
//! fetch ▶ extract ▶ build dir ▶ build ▶ install:* ▶ version-check
//!                                                        │
//!                           gate enabled? ──yes──▶ place:* ▶ registry:*
//!                                │ no                           │
//!                                ▼                              ▼
//!                           remove scratch ◀────────────────────┘
//! ```
//!
//! Nothing mutates the system before the privilege check, the precondition
//! report and the fetcher selection have all passed. The scratch directory is
//! removed on success and on halt alike.

mod steps;

pub use steps::diagnostic_log_name;

use crate::capability::{Builder, Extractor, Fetcher, FileSystem, Host, RegistryUpdater, ScratchDir};
use crate::gate::{GateDecision, ToolVersion};
use crate::plan::InstallPlan;
use crate::precondition::{Decision, PrecheckReport, PreconditionChecker};
use crate::report::Reporter;
use crate::selector::{Alternative, select_first_available};
use crate::sequencer::{GuardedSequencer, PipelineResult, StepRecord};
use crate::{InstallError, ToolFailure};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Step name used when the scratch directory cannot be created.
const SCRATCH_STEP: &str = "scratch-dir";

// =============================================================================
// CONTEXT
// =============================================================================

/// Mutable state shared by the steps of one run.
pub struct InstallContext<'a> {
    pub plan: &'a InstallPlan,
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a dyn Extractor,
    pub builder: &'a dyn Builder,
    pub fs: &'a dyn FileSystem,
    pub registry: &'a dyn RegistryUpdater,
    pub work_dir: PathBuf,
    pub archive: PathBuf,
    pub build_dir: PathBuf,
    pub build_log: PathBuf,
    pub started_at: NaiveDateTime,
    /// Set by the extract step.
    pub source_root: Option<PathBuf>,
    /// Set by the version-check step.
    pub gate: Option<GateDecision>,
    pub installed: Vec<PathBuf>,
    pub placed: Vec<PathBuf>,
    /// Where the build log was preserved after a failed build.
    pub saved_log: Option<PathBuf>,
}

impl<'a> InstallContext<'a> {
    fn new(
        plan: &'a InstallPlan,
        host: &'a Host<'_>,
        fetcher: &'a dyn Fetcher,
        work_dir: &Path,
        started_at: NaiveDateTime,
    ) -> Self {
        Self {
            plan,
            fetcher,
            extractor: host.extractor,
            builder: host.builder,
            fs: host.fs,
            registry: host.registry,
            work_dir: work_dir.to_path_buf(),
            archive: work_dir.join(&plan.archive_name),
            build_dir: work_dir.join(&plan.build.build_dir),
            build_log: work_dir.join(format!("{}-build.log", plan.package)),
            started_at,
            source_root: None,
            gate: None,
            installed: Vec::new(),
            placed: Vec::new(),
            saved_log: None,
        }
    }

    /// Root of the extracted source tree.
    pub fn source_root(&self) -> Result<PathBuf, ToolFailure> {
        self.source_root
            .clone()
            .ok_or_else(|| ToolFailure::Io("source archive has not been extracted".to_string()))
    }
}

// =============================================================================
// SUMMARY
// =============================================================================

/// What happened to the desktop-integration branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DesktopOutcome {
    Installed {
        detected: ToolVersion,
        minimum: ToolVersion,
        files: Vec<PathBuf>,
    },
    Skipped {
        detected: ToolVersion,
        minimum: ToolVersion,
    },
}

/// Result of a successful installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallSummary {
    pub package: String,
    /// Tool that downloaded the archive.
    pub fetcher: String,
    pub binaries: Vec<PathBuf>,
    pub desktop: DesktopOutcome,
    pub steps: Vec<StepRecord>,
    /// Scratch directory removal failure, if any. Never fatal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleanup_warning: Option<String>,
}

// =============================================================================
// INSTALLER
// =============================================================================

/// Runs a validated [`InstallPlan`] against a [`Host`].
pub struct Installer<'p> {
    plan: &'p InstallPlan,
}

impl<'p> Installer<'p> {
    /// Accept a plan after validating it.
    pub fn new(plan: &'p InstallPlan) -> Result<Self, InstallError> {
        plan.validate()?;
        Ok(Self { plan })
    }

    /// Evaluate every precondition and report each unsatisfied one.
    pub fn precheck(&self, host: &Host<'_>, reporter: &mut dyn Reporter) -> PrecheckReport {
        let report =
            PreconditionChecker::new(host.packages, host.tools).evaluate(&self.plan.preconditions);
        for missing in report.unsatisfied() {
            reporter.remediation(missing);
        }
        report
    }

    /// Run the whole pipeline.
    ///
    /// `make_scratch` is called only once every guard has passed.
    pub fn run<F>(
        &self,
        host: &Host<'_>,
        make_scratch: F,
        started_at: NaiveDateTime,
        reporter: &mut dyn Reporter,
    ) -> Result<InstallSummary, InstallError>
    where
        F: FnOnce() -> Result<Box<dyn ScratchDir>, ToolFailure>,
    {
        let plan = self.plan;

        if !host.privilege.is_elevated() {
            return Err(InstallError::NotElevated);
        }

        let report = self.precheck(host, reporter);
        if report.decision() == Decision::Abort {
            return Err(InstallError::PrecheckFailure(report.missing_required()));
        }

        let alternatives: Vec<_> = host
            .fetchers
            .iter()
            .map(|f| Alternative {
                label: f.tool(),
                available: report.is_satisfied(f.tool()).unwrap_or(false),
                mechanism: *f,
            })
            .collect();
        let fetcher = select_first_available(&alternatives, "download the source archive")?;
        reporter.note(&format!("Downloading with {}", fetcher.tool()));

        let scratch = make_scratch().map_err(|failure| {
            let reason = format!("Could not create a working directory: {}", failure);
            reporter.step_failed(SCRATCH_STEP, &reason);
            InstallError::StepFailure {
                step: SCRATCH_STEP.to_string(),
                reason,
            }
        })?;

        let mut ctx = InstallContext::new(plan, host, fetcher, scratch.path(), started_at);
        let mut sequencer = GuardedSequencer::new();

        let core = steps::core_steps(plan);
        let outcome = sequencer.run(&core, &mut ctx, reporter);
        let mut records = outcome.records;
        if let PipelineResult::Halted { step, reason, .. } = outcome.result {
            let _ = remove_scratch(scratch, reporter);
            let reason = match &ctx.saved_log {
                Some(log) => format!("{} (build log: {})", reason, log.display()),
                None => reason,
            };
            return Err(InstallError::StepFailure { step, reason });
        }

        let gate = ctx.gate;
        let desktop = match gate {
            Some(GateDecision::Enabled { detected, minimum }) => {
                reporter.note(&format!(
                    "{} {} >= {}: installing desktop integration",
                    plan.build.tool, detected, minimum
                ));
                let desktop = steps::desktop_steps(plan);
                let outcome = sequencer.run(&desktop, &mut ctx, reporter);
                records.extend(outcome.records);
                if let PipelineResult::Halted { step, reason, .. } = outcome.result {
                    let _ = remove_scratch(scratch, reporter);
                    return Err(InstallError::StepFailure { step, reason });
                }
                DesktopOutcome::Installed {
                    detected,
                    minimum,
                    files: std::mem::take(&mut ctx.placed),
                }
            }
            Some(GateDecision::Skipped { detected, minimum }) => {
                reporter.note(&format!(
                    "{} {} < {}: skipping desktop integration",
                    plan.build.tool, detected, minimum
                ));
                DesktopOutcome::Skipped { detected, minimum }
            }
            None => {
                let reason = "build tool version was never checked".to_string();
                let _ = remove_scratch(scratch, reporter);
                return Err(InstallError::StepFailure {
                    step: "version-check".to_string(),
                    reason,
                });
            }
        };

        let cleanup_warning = remove_scratch(scratch, reporter);
        reporter.note(&format!("{} installed successfully", plan.package));

        Ok(InstallSummary {
            package: plan.package.clone(),
            fetcher: fetcher.tool().to_string(),
            binaries: std::mem::take(&mut ctx.installed),
            desktop,
            steps: records,
            cleanup_warning,
        })
    }
}

/// Remove the scratch directory; a failure is reported and returned, never raised.
fn remove_scratch(scratch: Box<dyn ScratchDir>, reporter: &mut dyn Reporter) -> Option<String> {
    let path = scratch.path().display().to_string();
    match scratch.remove() {
        Ok(()) => None,
        Err(failure) => {
            let warning = format!("Could not remove working directory {}: {}", path, failure);
            reporter.warning(&warning);
            Some(warning)
        }
    }
}
