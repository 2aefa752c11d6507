//! # siminstall CLI Module
//!
//! This module implements the command-line interface.
//!
//! ## Available Commands
//!
//! - `install` - Run the full pipeline (default when no command is given)
//! - `check` - Report preconditions only; changes nothing
//! - `plan` - Print the resolved plan

mod commands;

use crate::config::PlanSource;
use crate::error::AppError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// siminstall - build and install a simulation package from source
///
/// Downloads the source archive, builds it with cmake, installs the
/// executables and, when cmake is recent enough, the desktop integration.
/// Must be run as root.
#[derive(Parser, Debug)]
#[command(name = "siminstall")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// List every step as it starts
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML install plan (default: $SIMINSTALL_CONFIG, then the built-in plan)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Download, build and install (default)
    Install,

    /// Check preconditions without changing anything
    Check,

    /// Print the resolved install plan
    Plan,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), AppError> {
    let source = PlanSource::from_env(cli.config);
    tracing::debug!(source = %source, "loading plan");
    let plan = source.load()?;

    match cli.command.unwrap_or(Commands::Install) {
        Commands::Install => cmd_install(&plan, cli.json_mode, cli.verbose),
        Commands::Check => cmd_check(&plan, cli.json_mode),
        Commands::Plan => cmd_plan(&plan, &source, cli.json_mode),
    }
}
