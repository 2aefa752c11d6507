//! # siminstall - Guarded Source Installer
//!
//! Downloads, builds and installs a simulation package and its GUI on a
//! Debian/Ubuntu system, then wires up desktop integration when the build
//! tool is recent enough.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  apps/siminstall (THE BINARY)               │
//! │                                                             │
//! │  ┌─────────────┐   ┌──────────────┐   ┌─────────────────┐  │
//! │  │    CLI      │   │ Plan config  │   │ Host collabor.  │  │
//! │  │   (clap)    │   │   (toml)     │   │ dpkg/cmake/tar  │  │
//! │  └──────┬──────┘   └──────┬───────┘   └────────┬────────┘  │
//! │         └─────────────────┼────────────────────┘           │
//! │                           ▼                                │
//! │                  ┌─────────────────┐                       │
//! │                  │ siminstall-core │                       │
//! │                  │   (THE LOGIC)   │                       │
//! │                  └─────────────────┘                       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Install with the built-in plan
//! sudo siminstall
//!
//! # Only check dependencies
//! siminstall check
//!
//! # Custom plan, machine-readable summary
//! sudo siminstall --config plan.toml --json-mode install
//! ```

use clap::Parser;
use siminstall::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // Initialize tracing: SIMINSTALL_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("SIMINSTALL_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "siminstall=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        if !e.already_reported() {
            tracing::error!("Error: {}", e);
            eprintln!("siminstall: {}", e);
        }
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  siminstall v{}
  source build + install for simulation packages
"#,
        env!("CARGO_PKG_VERSION")
    );
}
