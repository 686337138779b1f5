//! Redirect applier
//!
//! Thin adapter between computed instructions and a `StorageClient`.
//!
//! # Policy
//!
//! - Dry run (the default) never touches the storage client
//! - Each instruction is independent: a failure is recorded and the batch
//!   moves on to the next instruction
//! - Every call is bounded by the configured timeout and retried with
//!   linear backoff while the error is retryable and budget remains

use crate::config::ApplierConfig;
use crate::error::{ApplyFailure, ApplyStage, StorageError};
use crate::report::{ApplyMode, ApplyReport, InstructionOutcome, OutcomeStatus};
use crate::storage::StorageClient;
use kgh_redirect::RedirectInstruction;
use std::future::Future;
use std::sync::Arc;

/// Applies redirect instructions through a storage collaborator
pub struct Applier {
    config: ApplierConfig,
    storage: Arc<dyn StorageClient>,
}

impl std::fmt::Debug for Applier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Applier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Applier {
    /// Create applier over a storage client
    #[inline]
    #[must_use]
    pub fn new(config: ApplierConfig, storage: Arc<dyn StorageClient>) -> Self {
        Self { config, storage }
    }

    /// Applier configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ApplierConfig {
        &self.config
    }

    /// Mode this applier runs in
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ApplyMode {
        if self.config.dry_run {
            ApplyMode::DryRun
        } else {
            ApplyMode::Apply
        }
    }

    /// Apply a batch of instructions
    ///
    /// Never fails as a whole; inspect the report for per-instruction
    /// outcomes.
    pub async fn apply(&self, instructions: &[RedirectInstruction]) -> ApplyReport {
        let mode = self.mode();
        tracing::info!(
            bucket = %self.config.bucket,
            %mode,
            instructions = instructions.len(),
            "applying redirects"
        );

        let mut outcomes = Vec::with_capacity(instructions.len());
        for instruction in instructions {
            let status = match mode {
                ApplyMode::DryRun => {
                    tracing::info!("dry run, would redirect {instruction}");
                    OutcomeStatus::Skipped
                }
                ApplyMode::Apply => self.apply_one(instruction).await,
            };
            outcomes.push(InstructionOutcome {
                instruction: instruction.clone(),
                status,
            });
        }

        let report = ApplyReport {
            bucket: self.config.bucket.clone(),
            mode,
            outcomes,
        };
        tracing::info!(
            applied = report.applied(),
            failed = report.failed(),
            skipped = report.skipped(),
            "apply finished"
        );
        report
    }

    async fn apply_one(&self, instruction: &RedirectInstruction) -> OutcomeStatus {
        let source = instruction.source_path();
        let target = instruction.target_path();

        let put = self
            .call_with_retry(ApplyStage::PutRedirect, || {
                self.storage.put_redirect(source, target)
            })
            .await;
        let put_attempts = match put {
            Ok(attempts) => attempts,
            Err(failure) => {
                tracing::warn!(key = instruction.object_key(), "{instruction}: {failure}");
                return OutcomeStatus::Failed(failure);
            }
        };

        match self
            .call_with_retry(ApplyStage::Invalidate, || self.storage.invalidate(source))
            .await
        {
            Ok(attempts) => {
                tracing::info!(key = instruction.object_key(), "redirected {instruction}");
                OutcomeStatus::Applied {
                    attempts: put_attempts + attempts,
                }
            }
            Err(failure) => {
                tracing::warn!(key = instruction.object_key(), "{instruction}: {failure}");
                OutcomeStatus::Failed(failure)
            }
        }
    }

    /// Run `op` until it succeeds, fails permanently, or the budget is spent
    ///
    /// Returns the number of attempts made.
    async fn call_with_retry<F, Fut>(&self, stage: ApplyStage, mut op: F) -> Result<u32, ApplyFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(), StorageError>>,
    {
        let policy = self.config.retry_policy();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let result = tokio::time::timeout(self.config.timeout(), op())
                .await
                .unwrap_or(Err(StorageError::Timeout {
                    seconds: self.config.timeout_seconds,
                }));

            match result {
                Ok(()) => return Ok(attempt),
                Err(err) if err.is_retryable() && attempt < policy.max_attempts => {
                    let delay = policy.delay_for_attempt(attempt);
                    tracing::debug!(%stage, attempt, ?delay, "retrying: {err}");
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(ApplyFailure::new(stage, attempt, &err)),
            }
        }
    }
}
