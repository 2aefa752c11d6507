//! # Precondition Checker
//!
//! Evaluates every declared precondition, independently and in declared
//! order, before any mutating action runs.
//!
//! ## Rules
//!
//! - All preconditions are evaluated; the report never short-circuits.
//! - A precondition whose query itself fails counts as unsatisfied.
//! - The decision is `Abort` iff at least one *required* precondition is
//!   unsatisfied. Optional ones are reported and otherwise ignored.

use crate::capability::{PackageQuery, ToolLocator};
use serde::{Deserialize, Serialize};

// =============================================================================
// PRECONDITION
// =============================================================================

/// How a precondition is checked against the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Probe {
    /// A package must be installed in the package database.
    Package(String),
    /// An executable must be reachable.
    Command(String),
}

/// A named external fact checked before mutation begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Precondition {
    pub name: String,
    pub probe: Probe,
    /// Operator-facing advice printed when the check fails.
    pub remediation: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl Precondition {
    /// A required package precondition named after the package.
    #[must_use]
    pub fn package(name: impl Into<String>, remediation: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            probe: Probe::Package(name.clone()),
            name,
            remediation: remediation.into(),
            required: true,
        }
    }
}

// =============================================================================
// REPORT
// =============================================================================

/// Outcome of evaluating one precondition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreconditionResult {
    pub name: String,
    pub satisfied: bool,
    pub required: bool,
    /// Present only for unsatisfied preconditions.
    pub remediation: Option<String>,
}

/// Whether the pipeline may start mutating the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Proceed,
    Abort,
}

/// Aggregated results, in declared order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckReport {
    results: Vec<PreconditionResult>,
}

impl PrecheckReport {
    #[must_use]
    pub fn results(&self) -> &[PreconditionResult] {
        &self.results
    }

    #[must_use]
    pub fn decision(&self) -> Decision {
        if self.results.iter().any(|r| r.required && !r.satisfied) {
            Decision::Abort
        } else {
            Decision::Proceed
        }
    }

    /// Every unsatisfied precondition, required or not.
    pub fn unsatisfied(&self) -> impl Iterator<Item = &PreconditionResult> {
        self.results.iter().filter(|r| !r.satisfied)
    }

    /// Names of unsatisfied required preconditions.
    #[must_use]
    pub fn missing_required(&self) -> Vec<String> {
        self.unsatisfied()
            .filter(|r| r.required)
            .map(|r| r.name.clone())
            .collect()
    }

    /// `Some(satisfied)` for a known name, `None` otherwise.
    #[must_use]
    pub fn is_satisfied(&self, name: &str) -> Option<bool> {
        self.results
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.satisfied)
    }
}

// =============================================================================
// CHECKER
// =============================================================================

/// Evaluates preconditions against the host's package database and tools.
pub struct PreconditionChecker<'a> {
    packages: &'a dyn PackageQuery,
    tools: &'a dyn ToolLocator,
}

impl<'a> PreconditionChecker<'a> {
    #[must_use]
    pub fn new(packages: &'a dyn PackageQuery, tools: &'a dyn ToolLocator) -> Self {
        Self { packages, tools }
    }

    /// Evaluate a single precondition.
    #[must_use]
    pub fn check(&self, precondition: &Precondition) -> PreconditionResult {
        let satisfied = match &precondition.probe {
            Probe::Package(package) => self.packages.is_installed(package).unwrap_or(false),
            Probe::Command(command) => self.tools.is_available(command),
        };

        PreconditionResult {
            name: precondition.name.clone(),
            satisfied,
            required: precondition.required,
            remediation: (!satisfied).then(|| precondition.remediation.clone()),
        }
    }

    /// Evaluate all preconditions.
    #[must_use]
    pub fn evaluate(&self, preconditions: &[Precondition]) -> PrecheckReport {
        PrecheckReport {
            results: preconditions.iter().map(|p| self.check(p)).collect(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
