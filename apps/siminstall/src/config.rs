//! # Plan Configuration
//!
//! Resolves and loads the [`InstallPlan`] a run executes.
//!
//! ## Resolution Order
//!
//! 1. `--config <PATH>`
//! 2. `SIMINSTALL_CONFIG` environment variable
//! 3. Built-in default plan (`config/default.toml`)
//!
//! Every loaded plan is validated before it is returned.

use siminstall_core::{InstallError, InstallPlan};
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming a plan file.
pub const CONFIG_ENV: &str = "SIMINSTALL_CONFIG";

/// The plan used when no file is given.
pub const DEFAULT_PLAN: &str = include_str!("../config/default.toml");

/// Plans larger than this are refused (1 MiB).
const MAX_PLAN_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read plan {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("plan {path} is {size} bytes, more than the {max} byte limit")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("cannot parse plan {source_name}: {reason}")]
    Parse { source_name: String, reason: String },

    #[error("plan {source_name} is invalid: {error}")]
    Invalid {
        source_name: String,
        error: InstallError,
    },

    #[error("unsupported fetch tool `{0}` (expected wget or curl)")]
    UnknownFetcher(String),
}

// =============================================================================
// PLAN SOURCE
// =============================================================================

/// Where a plan comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanSource {
    Builtin,
    File(PathBuf),
}

impl PlanSource {
    /// Pick the source from the command-line flag and the environment value.
    ///
    /// An empty environment value is treated as unset.
    pub fn resolve(flag: Option<PathBuf>, env: Option<OsString>) -> Self {
        match (flag, env) {
            (Some(path), _) => Self::File(path),
            (None, Some(value)) if !value.is_empty() => Self::File(PathBuf::from(value)),
            _ => Self::Builtin,
        }
    }

    /// Resolve against the real process environment.
    pub fn from_env(flag: Option<PathBuf>) -> Self {
        Self::resolve(flag, std::env::var_os(CONFIG_ENV))
    }

    pub fn load(&self) -> Result<InstallPlan, ConfigError> {
        match self {
            Self::Builtin => parse_plan(DEFAULT_PLAN, &self.to_string()),
            Self::File(path) => {
                let text = read_plan_file(path)?;
                parse_plan(&text, &self.to_string())
            }
        }
    }
}

impl fmt::Display for PlanSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "<built-in>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Parse and validate a TOML plan. `source_name` only appears in errors.
pub fn parse_plan(text: &str, source_name: &str) -> Result<InstallPlan, ConfigError> {
    let plan: InstallPlan = toml::from_str(text).map_err(|e| ConfigError::Parse {
        source_name: source_name.to_string(),
        reason: e.to_string(),
    })?;

    plan.validate().map_err(|error| ConfigError::Invalid {
        source_name: source_name.to_string(),
        error,
    })?;

    Ok(plan)
}

fn read_plan_file(path: &Path) -> Result<String, ConfigError> {
    let read_error = |e: std::io::Error| ConfigError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let size = std::fs::metadata(path).map_err(read_error)?.len();
    if size > MAX_PLAN_FILE_SIZE {
        return Err(ConfigError::TooLarge {
            path: path.to_path_buf(),
            size,
            max: MAX_PLAN_FILE_SIZE,
        });
    }

    std::fs::read_to_string(path).map_err(read_error)
}
