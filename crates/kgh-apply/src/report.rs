//! Per-run apply report

use crate::error::ApplyFailure;
use kgh_redirect::RedirectInstruction;
use serde::Serialize;

/// Whether writes were performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyMode {
    /// Instructions computed and printed only
    DryRun,
    /// Instructions written to storage
    Apply,
}

impl std::fmt::Display for ApplyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DryRun => write!(f, "dry run"),
            Self::Apply => write!(f, "apply"),
        }
    }
}

/// What happened to one instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    /// Redirect written and cache invalidated
    Applied {
        /// Attempts across both calls
        attempts: u32,
    },
    /// Gave up on this instruction
    Failed(ApplyFailure),
    /// Not attempted (dry run)
    Skipped,
}

/// Instruction paired with its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstructionOutcome {
    /// The instruction
    pub instruction: RedirectInstruction,
    /// Its outcome
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

/// Result of applying a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Namespace targeted
    pub bucket: String,
    /// Run mode
    pub mode: ApplyMode,
    /// One outcome per instruction, in input order
    pub outcomes: Vec<InstructionOutcome>,
}

impl ApplyReport {
    /// Number of instructions applied
    #[must_use]
    pub fn applied(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Applied { .. }))
    }

    /// Number of instructions that failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Failed(_)))
    }

    /// Number of instructions skipped
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, OutcomeStatus::Skipped))
    }

    /// Failed instructions with their failure
    pub fn failures(&self) -> impl Iterator<Item = (&RedirectInstruction, &ApplyFailure)> {
        self.outcomes.iter().filter_map(|o| match &o.status {
            OutcomeStatus::Failed(failure) => Some((&o.instruction, failure)),
            _ => None,
        })
    }

    /// Whether every instruction went through (or was skipped in dry run)
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&OutcomeStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}
