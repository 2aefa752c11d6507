//! # siminstall-core
//!
//! The guarded pipeline engine for siminstall - THE LOGIC.
//!
//! This crate decides *what* runs and in which order when building and
//! installing a simulation package from source. It never touches the system
//! itself: every external effect goes through a capability trait in
//! [`capability`], implemented by the binary for real hosts and by in-memory
//! doubles in tests.
//!
//! ## Pipeline Model
//!
//! 1. **Preconditions** ([`precondition`]): all evaluated, all reported;
//!    any missing *required* one aborts before mutation.
//! 2. **Alternative selection** ([`selector`]): the first available fetch
//!    tool is chosen once; its failure is final.
//! 3. **Guarded sequence** ([`sequencer`]): ordered, fail-fast steps with
//!    per-step diagnostics and cleanup.
//! 4. **Capability gate** ([`gate`]): the build tool's version decides
//!    whether the desktop-integration sub-sequence runs.
//!
//! ## Architectural Constraints
//!
//! - No async, no process spawning, no logging framework
//! - Strictly sequential; no step is retried or rolled back
//! - Diagnostics flow through [`report::Reporter`]

// =============================================================================
// MODULES
// =============================================================================

pub mod capability;
pub mod gate;
pub mod installer;
pub mod plan;
pub mod precondition;
pub mod report;
pub mod selector;
pub mod sequencer;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types
// =============================================================================

pub use types::{InstallError, ToolFailure};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use capability::{
    BuildRequest, Builder, Extractor, Fetcher, FileSystem, Host, PackageQuery, PrivilegeCheck,
    RegistryUpdater, ScratchDir, ToolLocator,
};
pub use gate::{CapabilityGate, GateDecision, ToolVersion};
pub use installer::{DesktopOutcome, InstallContext, InstallSummary, Installer, diagnostic_log_name};
pub use plan::{
    BuildSettings, DesktopFile, DesktopSettings, InstallPlan, RegistryUpdate, TargetPaths,
};
pub use precondition::{
    Decision, PrecheckReport, Precondition, PreconditionChecker, PreconditionResult, Probe,
};
pub use report::{MemoryReporter, Report, Reporter};
pub use selector::{Alternative, select_first_available};
pub use sequencer::{
    GuardedSequencer, PipelineResult, SequenceOutcome, Step, StepRecord, StepStatus,
};
