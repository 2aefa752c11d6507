//! # Core Type Definitions
//!
//! This module contains the error types shared by every stage of the
//! pipeline:
//! - `ToolFailure`: what an external collaborator reports when it fails
//! - `InstallError`: why an installation run stopped
//!
//! ## Failure Taxonomy
//!
//! | Variant | Raised when | Side effects already performed |
//! |---------|-------------|--------------------------------|
//! | `NotElevated` | privilege check fails | none |
//! | `PrecheckFailure` | a required dependency is absent | none |
//! | `ResourceUnavailable` | no fetch mechanism is available | none |
//! | `StepFailure` | any fallible step fails | steps before it, never rolled back |
//!
//! A failure to remove the scratch directory at the very end is NOT an
//! error; it is carried as a warning in the install summary.

use thiserror::Error;

// =============================================================================
// TOOL FAILURE
// =============================================================================

/// Failure reported by an external collaborator (package database, fetch
/// tool, archive tool, build tool, filesystem, desktop registry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolFailure {
    /// The tool could not be started at all.
    #[error("`{program}` could not be started: {reason}")]
    Spawn { program: String, reason: String },

    /// The tool ran and exited unsuccessfully.
    #[error("`{program}` exited unsuccessfully ({status})")]
    Exit { program: String, status: String },

    /// The tool ran but its output could not be interpreted.
    #[error("unexpected output from `{program}`: {output}")]
    UnexpectedOutput { program: String, output: String },

    /// A filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl ToolFailure {
    /// Wrap a `std::io::Error` together with the operation that raised it.
    #[must_use]
    pub fn io(context: &str, err: &std::io::Error) -> Self {
        Self::Io(format!("{}: {}", context, err))
    }
}

// =============================================================================
// INSTALL ERROR
// =============================================================================

/// Errors that stop an installation run.
///
/// - No silent failures
/// - Every variant carries operator-facing text
/// - No variant is ever retried
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstallError {
    /// The process lacks elevated privileges.
    #[error("this installer must be run with elevated privileges (e.g. via sudo)")]
    NotElevated,

    /// One or more required preconditions are unsatisfied.
    #[error("missing required dependencies: {}", .0.join(", "))]
    PrecheckFailure(Vec<String>),

    /// None of the alternative mechanisms for an action is available.
    #[error("neither {} is available to {action}", .candidates.join(" nor "))]
    ResourceUnavailable {
        action: String,
        candidates: Vec<String>,
    },

    /// A pipeline step failed; the pipeline halted at that step.
    #[error("step `{step}` failed: {reason}")]
    StepFailure { step: String, reason: String },

    /// The install plan is inconsistent.
    #[error("invalid install plan: {0}")]
    InvalidPlan(String),
}

// =============================================================================
// TESTS
// =============================================================================
