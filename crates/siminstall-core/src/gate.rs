//! # Capability Gate
//!
//! Decides whether the desktop-integration branch runs, based on the version
//! the build tool reports about itself.
//!
//! | Detected vs minimum | Decision |
//! |---------------------|----------|
//! | `detected >= minimum` | `Enabled` |
//! | `detected < minimum` | `Skipped` (not a failure) |
//! | query failed / output unparseable | error |

use crate::ToolFailure;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =============================================================================
// TOOL VERSION
// =============================================================================

/// A `major.minor.patch` version. Missing components are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ToolVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Find the first version-looking token in free-form tool output,
    /// e.g. `"cmake version 3.28.3"` or `"3.31.0-rc2"`.
    #[must_use]
    pub fn find_in(output: &str) -> Option<Self> {
        output
            .split_whitespace()
            .find_map(|token| token.parse::<ToolVersion>().ok())
    }
}

impl FromStr for ToolVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('v');
        // Drop pre-release / build suffixes: "3.31.0-rc2", "3.28.3+dfsg".
        let core = s.split(['-', '+']).next().unwrap_or_default();

        let mut parts = core.split('.');
        let mut next = |required: bool| -> Result<u32, String> {
            match parts.next() {
                Some(p) => p
                    .parse::<u32>()
                    .map_err(|_| format!("invalid version component `{}` in `{}`", p, s)),
                None if required => Err(format!("empty version `{}`", s)),
                None => Ok(0),
            }
        };

        let major = next(true)?;
        let minor = next(false)?;
        let patch = next(false)?;
        if parts.next().is_some() {
            return Err(format!("too many version components in `{}`", s));
        }
        Ok(Self::new(major, minor, patch))
    }
}

impl TryFrom<String> for ToolVersion {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ToolVersion> for String {
    fn from(v: ToolVersion) -> Self {
        v.to_string()
    }
}

impl fmt::Display for ToolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

// =============================================================================
// GATE
// =============================================================================

/// Outcome of evaluating the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateDecision {
    Enabled {
        detected: ToolVersion,
        minimum: ToolVersion,
    },
    Skipped {
        detected: ToolVersion,
        minimum: ToolVersion,
    },
}

impl GateDecision {
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        matches!(self, GateDecision::Enabled { .. })
    }
}

/// Minimum-version gate over a tool's self-reported version.
#[derive(Debug, Clone)]
pub struct CapabilityGate {
    program: String,
    minimum: ToolVersion,
}

impl CapabilityGate {
    #[must_use]
    pub fn new(program: impl Into<String>, minimum: ToolVersion) -> Self {
        Self {
            program: program.into(),
            minimum,
        }
    }

    /// Evaluate the raw result of the tool's version query.
    ///
    /// A failed query, or output without a recognizable version, is an error.
    pub fn evaluate(
        &self,
        version_output: Result<String, ToolFailure>,
    ) -> Result<GateDecision, ToolFailure> {
        let output = version_output?;
        let detected =
            ToolVersion::find_in(&output).ok_or_else(|| ToolFailure::UnexpectedOutput {
                program: self.program.clone(),
                output: output.trim().to_string(),
            })?;

        let minimum = self.minimum;
        Ok(if detected >= minimum {
            GateDecision::Enabled { detected, minimum }
        } else {
            GateDecision::Skipped { detected, minimum }
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
