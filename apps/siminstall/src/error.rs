//! Top-level error type of the binary.

use crate::config::ConfigError;
use siminstall_core::InstallError;
use thiserror::Error;

/// Anything that makes `siminstall` exit with a nonzero status.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Install(#[from] InstallError),
}

impl AppError {
    /// Step failures are printed by the reporter as they happen.
    #[must_use]
    pub fn already_reported(&self) -> bool {
        matches!(self, Self::Install(InstallError::StepFailure { .. }))
    }
}
