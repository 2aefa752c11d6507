//! # Console Reporter
//!
//! Turns pipeline reports into operator text and tracing events.
//!
//! Progress and notes go to `out`; remediation advice, step failures and
//! warnings go to `err`. In JSON mode `out` is stderr too, so stdout carries
//! nothing but the final JSON document.

use siminstall_core::{PreconditionResult, Reporter};
use std::io::{self, Write};

pub struct ConsoleReporter<O: Write, E: Write> {
    out: O,
    err: E,
    verbose: bool,
}

impl ConsoleReporter<Box<dyn Write>, io::Stderr> {
    /// Reporter on the process's standard streams.
    pub fn stdio(json_mode: bool, verbose: bool) -> Self {
        let out: Box<dyn Write> = if json_mode {
            Box::new(io::stderr())
        } else {
            Box::new(io::stdout())
        };
        Self::new(out, io::stderr(), verbose)
    }
}

impl<O: Write, E: Write> ConsoleReporter<O, E> {
    pub fn new(out: O, err: E, verbose: bool) -> Self {
        Self { out, err, verbose }
    }

    /// Give back the underlying writers.
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

// Write errors on the console are not worth aborting an install for.
impl<O: Write, E: Write> Reporter for ConsoleReporter<O, E> {
    fn remediation(&mut self, result: &PreconditionResult) {
        let kind = if result.required { "required" } else { "optional" };
        tracing::warn!(
            name = %result.name,
            required = result.required,
            "precondition not satisfied"
        );
        let _ = writeln!(self.err, "Missing {} dependency: {}", kind, result.name);
        if let Some(text) = &result.remediation {
            let _ = writeln!(self.err, "  To fix: {}", text);
        }
    }

    fn step_started(&mut self, index: usize, step: &str) {
        tracing::info!(index, step, "step started");
        if self.verbose {
            let _ = writeln!(self.out, "[{:>2}] {}", index, step);
        }
    }

    fn step_failed(&mut self, step: &str, diagnostic: &str) {
        tracing::error!(step, "{}", diagnostic);
        let _ = writeln!(self.err, "Error: {}", diagnostic);
    }

    fn note(&mut self, message: &str) {
        tracing::info!("{}", message);
        let _ = writeln!(self.out, "{}", message);
    }

    fn warning(&mut self, message: &str) {
        tracing::warn!("{}", message);
        let _ = writeln!(self.err, "Warning: {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    #[test]
    fn remediation_goes_to_err() {
        let mut reporter = ConsoleReporter::new(Vec::new(), Vec::new(), false);
        reporter.remediation(&PreconditionResult {
            name: "cmake".into(),
            satisfied: false,
            required: true,
            remediation: Some("sudo apt install cmake".into()),
        });

        let (out, err) = reporter.into_inner();
        assert!(out.is_empty());
        assert_eq!(
            text(&err),
            "Missing required dependency: cmake\n  To fix: sudo apt install cmake\n"
        );
    }

    #[test]
    fn steps_are_listed_only_when_verbose() {
        let mut quiet = ConsoleReporter::new(Vec::new(), Vec::new(), false);
        quiet.step_started(0, "fetch");
        assert!(quiet.into_inner().0.is_empty());

        let mut verbose = ConsoleReporter::new(Vec::new(), Vec::new(), true);
        verbose.step_started(0, "fetch");
        assert_eq!(text(&verbose.into_inner().0), "[ 0] fetch\n");
    }

    #[test]
    fn failures_and_warnings_go_to_err() {
        let mut reporter = ConsoleReporter::new(Vec::new(), Vec::new(), false);
        reporter.note("Downloading with wget");
        reporter.step_failed("build", "Build failed: `cmake` exited unsuccessfully");
        reporter.warning("Could not remove working directory /tmp/x");

        let (out, err) = reporter.into_inner();
        assert_eq!(text(&out), "Downloading with wget\n");
        assert_eq!(
            text(&err),
            "Error: Build failed: `cmake` exited unsuccessfully\n\
             Warning: Could not remove working directory /tmp/x\n"
        );
    }
}
