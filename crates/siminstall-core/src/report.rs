//! # Operator Reporting
//!
//! The pipeline never prints. It hands every operator-facing message to a
//! `Reporter`; the binary prints and logs them, tests record them.

use crate::precondition::PreconditionResult;

/// Sink for operator-facing diagnostics.
pub trait Reporter {
    /// An unsatisfied precondition and its remediation text.
    fn remediation(&mut self, result: &PreconditionResult);

    /// A step is about to run.
    fn step_started(&mut self, index: usize, step: &str);

    /// A step failed; `diagnostic` is its context-specific message.
    fn step_failed(&mut self, step: &str, diagnostic: &str);

    /// Informational progress.
    fn note(&mut self, message: &str);

    /// Something went wrong without affecting the outcome.
    fn warning(&mut self, message: &str);
}

/// A single recorded report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Remediation { name: String, text: String },
    StepStarted { index: usize, step: String },
    StepFailed { step: String, diagnostic: String },
    Note(String),
    Warning(String),
}

/// Reporter keeping every message in memory, in order.
#[derive(Debug, Default)]
pub struct MemoryReporter {
    pub reports: Vec<Report>,
}

impl MemoryReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the steps that were started, in order.
    #[must_use]
    pub fn started_steps(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::StepStarted { step, .. } => Some(step.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Text of every warning.
    #[must_use]
    pub fn warnings(&self) -> Vec<&str> {
        self.reports
            .iter()
            .filter_map(|r| match r {
                Report::Warning(w) => Some(w.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for MemoryReporter {
    fn remediation(&mut self, result: &PreconditionResult) {
        self.reports.push(Report::Remediation {
            name: result.name.clone(),
            text: result.remediation.clone().unwrap_or_default(),
        });
    }

    fn step_started(&mut self, index: usize, step: &str) {
        self.reports.push(Report::StepStarted {
            index,
            step: step.to_string(),
        });
    }

    fn step_failed(&mut self, step: &str, diagnostic: &str) {
        self.reports.push(Report::StepFailed {
            step: step.to_string(),
            diagnostic: diagnostic.to_string(),
        });
    }

    fn note(&mut self, message: &str) {
        self.reports.push(Report::Note(message.to_string()));
    }

    fn warning(&mut self, message: &str) {
        self.reports.push(Report::Warning(message.to_string()));
    }
}
