//! # Guarded Step Sequencer
//!
//! Runs an ordered list of fallible steps, fail-fast.
//!
//! ## Contract
//!
//! - Steps run strictly in declared order, one at a time.
//! - A step runs only if every earlier step succeeded.
//! - On failure: the step's diagnostic is reported, its cleanup runs, and the
//!   sequence halts. Later steps are recorded as `NotRun`.
//! - Nothing is retried and nothing already done is rolled back.
//!
//! A sequencer can drive several sequences in a row (core install, then the
//! desktop branch); step indices keep counting across them.

use crate::ToolFailure;
use crate::report::Reporter;
use serde::{Deserialize, Serialize};

// =============================================================================
// STEP
// =============================================================================

/// One fallible action of a pipeline, operating on a shared context `C`.
pub trait Step<C: ?Sized> {
    /// Stable identifier, used in diagnostics and records.
    fn id(&self) -> &str;

    fn run(&self, ctx: &mut C) -> Result<(), ToolFailure>;

    /// Operator-facing message for a failure of this step.
    fn diagnostic(&self, failure: &ToolFailure) -> String {
        format!("{} failed: {}", self.id(), failure)
    }

    /// Cleanup to perform after this step failed, before the pipeline stops.
    ///
    /// Returns extra operator text, if any.
    fn cleanup(&self, _ctx: &mut C) -> Option<String> {
        None
    }
}

// =============================================================================
// STEP RECORDS
// =============================================================================

/// Runtime status of a step.
///
/// Valid transitions:
/// - `Pending` -> `Succeeded`
/// - `Pending` -> `Failed`
/// - `Pending` -> `NotRun` (an earlier step failed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Pending,
    Succeeded,
    Failed,
    NotRun,
}

/// What happened to one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: String,
    pub status: StepStatus,
    /// Failure reason for `Failed` steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Terminal state of a sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineResult {
    Completed,
    Halted {
        step_index: usize,
        step: String,
        reason: String,
    },
}

/// Records for every declared step plus the terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceOutcome {
    pub records: Vec<StepRecord>,
    pub result: PipelineResult,
}

impl SequenceOutcome {
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self.result, PipelineResult::Completed)
    }
}

// =============================================================================
// SEQUENCER
// =============================================================================

/// Fail-fast runner for step lists.
#[derive(Debug, Default)]
pub struct GuardedSequencer {
    next_index: usize,
}

impl GuardedSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next executed step will get.
    #[must_use]
    pub fn next_index(&self) -> usize {
        self.next_index
    }

    /// Run `steps` against `ctx`, stopping at the first failure.
    pub fn run<C: ?Sized>(
        &mut self,
        steps: &[Box<dyn Step<C> + '_>],
        ctx: &mut C,
        reporter: &mut dyn Reporter,
    ) -> SequenceOutcome {
        let mut records: Vec<StepRecord> = steps
            .iter()
            .map(|s| StepRecord {
                step: s.id().to_string(),
                status: StepStatus::Pending,
                detail: None,
            })
            .collect();

        for (position, step) in steps.iter().enumerate() {
            let index = self.next_index;
            self.next_index = self.next_index.saturating_add(1);
            reporter.step_started(index, step.id());

            match step.run(ctx) {
                Ok(()) => {
                    if let Some(record) = records.get_mut(position) {
                        record.status = StepStatus::Succeeded;
                    }
                }
                Err(failure) => {
                    let diagnostic = step.diagnostic(&failure);
                    reporter.step_failed(step.id(), &diagnostic);
                    if let Some(extra) = step.cleanup(ctx) {
                        reporter.note(&extra);
                    }

                    for (i, record) in records.iter_mut().enumerate() {
                        if i == position {
                            record.status = StepStatus::Failed;
                            record.detail = Some(failure.to_string());
                        } else if i > position {
                            record.status = StepStatus::NotRun;
                        }
                    }

                    return SequenceOutcome {
                        records,
                        result: PipelineResult::Halted {
                            step_index: index,
                            step: step.id().to_string(),
                            reason: diagnostic,
                        },
                    };
                }
            }
        }

        SequenceOutcome {
            records,
            result: PipelineResult::Completed,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
