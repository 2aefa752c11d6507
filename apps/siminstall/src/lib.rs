//! # siminstall
//!
//! Library half of the `siminstall` binary: CLI, plan loading, host
//! collaborators and console reporting. The pipeline itself lives in
//! `siminstall-core`.

pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod reporter;

pub use error::AppError;
