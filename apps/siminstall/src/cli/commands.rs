//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::PlanSource;
use crate::error::AppError;
use crate::host::{SystemHost, TempScratch};
use crate::reporter::ConsoleReporter;
use chrono::Local;
use siminstall_core::{
    Decision, DesktopOutcome, InstallError, InstallPlan, InstallSummary, Installer, ScratchDir,
};

// =============================================================================
// INSTALL COMMAND
// =============================================================================

/// Run the full pipeline against the real system.
pub fn cmd_install(plan: &InstallPlan, json_mode: bool, verbose: bool) -> Result<(), AppError> {
    let system = SystemHost::for_plan(plan)?;
    let host = system.host();
    let installer = Installer::new(plan)?;
    let mut reporter = ConsoleReporter::stdio(json_mode, verbose);

    tracing::info!(package = %plan.package, url = %plan.archive_url, "starting installation");
    let summary = installer.run(
        &host,
        || TempScratch::create(&plan.package).map(|s| Box::new(s) as Box<dyn ScratchDir>),
        Local::now().naive_local(),
        &mut reporter,
    )?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).unwrap_or_default()
        );
    } else {
        print_summary(&summary);
    }
    Ok(())
}

fn print_summary(summary: &InstallSummary) {
    println!();
    println!("Installed {}", summary.package);
    println!("==========={}", "=".repeat(summary.package.len()));
    for binary in &summary.binaries {
        println!("  {}", binary.display());
    }
    match &summary.desktop {
        DesktopOutcome::Installed { files, .. } => {
            println!();
            println!("Desktop integration:");
            for file in files {
                println!("  {}", file.display());
            }
        }
        DesktopOutcome::Skipped { detected, minimum } => {
            println!();
            println!(
                "Desktop integration skipped (build tool {} < {})",
                detected, minimum
            );
        }
    }
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Report every precondition; fails when a required one is missing.
pub fn cmd_check(plan: &InstallPlan, json_mode: bool) -> Result<(), AppError> {
    let system = SystemHost::for_plan(plan)?;
    let host = system.host();
    let installer = Installer::new(plan)?;
    let mut reporter = ConsoleReporter::stdio(json_mode, false);

    let report = installer.precheck(&host, &mut reporter);

    if json_mode {
        let output = serde_json::json!({
            "package": plan.package,
            "decision": report.decision(),
            "results": report.results(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).unwrap_or_default()
        );
    } else {
        println!("Preconditions for {}", plan.package);
        println!("================={}", "=".repeat(plan.package.len()));
        for result in report.results() {
            println!(
                "  [{}] {}{}",
                if result.satisfied { "ok" } else { "--" },
                result.name,
                if result.required { "" } else { " (optional)" }
            );
        }
    }

    match report.decision() {
        Decision::Proceed => Ok(()),
        Decision::Abort => Err(InstallError::PrecheckFailure(report.missing_required()).into()),
    }
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Print the resolved plan as TOML (or JSON).
pub fn cmd_plan(plan: &InstallPlan, source: &PlanSource, json_mode: bool) -> Result<(), AppError> {
    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(plan).unwrap_or_default()
        );
        return Ok(());
    }

    println!("# source: {}", source);
    print!("{}", toml::to_string(plan).unwrap_or_default());
    Ok(())
}
