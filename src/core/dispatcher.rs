//! Bounded-concurrency chunk dispatch with per-transaction retry lifecycles
//!
//! The dispatcher runs every transaction of one chunk concurrently, each in
//! its own tokio task, and returns a result per transaction in the chunk's
//! original order. A transaction's failure never cancels or blocks its
//! siblings; the dispatcher waits for all of them to reach a terminal state
//! before returning.
//!
//! # Concurrency Bound
//!
//! In-flight transactions are bounded by a semaphore shared across the
//! whole batch, not per chunk: the chunk size and the concurrency bound are
//! independent knobs. A permit is held for a transaction's entire retry
//! lifecycle.
//!
//! # Retry Lifecycle
//!
//! Each transaction loops: call the executor under a per-call timeout,
//! classify the outcome, consult the retry policy, then either sleep out
//! the backoff and retry or finalize. An elapsed timeout is classified as a
//! transient failure and flows through the normal retry path. Terminal
//! transactions report to the progress aggregator immediately, so progress
//! is observable mid-chunk.
//!
//! # Cancellation
//!
//! Cancellation is cooperative. An attempt already in flight is allowed to
//! finish (a payment call is never interrupted mid-flight, which would
//! leave the charge outcome unknown), but no further retries start and
//! transactions still waiting for admission resolve as cancelled without
//! touching the executor.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::core::progress::{ProgressAggregator, Resolution};
use crate::core::retry::{RetryDecision, RetryPolicy};
use crate::core::traits::PaymentExecutor;
use crate::types::{Transaction, TransactionOutcome};

/// Default bound on in-flight transactions across a batch
pub const DEFAULT_MAX_CONCURRENCY: usize = 100;

/// Default timeout applied to each executor call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// Terminal result for one transaction of a chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionResult {
    /// The transaction as submitted by the caller
    pub transaction: Transaction,

    /// How the transaction's retry lifecycle ended
    pub resolution: Resolution,
}

/// Executes the transactions of a chunk concurrently
///
/// Cloneable; clones share the executor, the semaphore, and the
/// cancellation token, so a dispatcher can be handed to spawned tasks.
#[derive(Clone)]
pub struct ConcurrentDispatcher {
    executor: Arc<dyn PaymentExecutor>,
    retry_policy: RetryPolicy,
    permits: Arc<Semaphore>,
    call_timeout: Duration,
    cancel: CancellationToken,
}

impl ConcurrentDispatcher {
    /// Create a dispatcher
    ///
    /// `permits` bounds in-flight transactions and is shared across every
    /// chunk of the batch. `cancel` stops further retries and admissions
    /// when triggered.
    pub fn new(
        executor: Arc<dyn PaymentExecutor>,
        retry_policy: RetryPolicy,
        permits: Arc<Semaphore>,
        call_timeout: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            executor,
            retry_policy,
            permits,
            call_timeout,
            cancel,
        }
    }

    /// Drive every transaction of `chunk` to a terminal state
    ///
    /// Spawns one task per transaction, waits for all of them, and returns
    /// results in the chunk's original order. Each terminal transaction is
    /// reported to `progress` as it finishes, not when the chunk returns.
    /// The gateway sees references namespaced by `batch_id`; results and
    /// progress retain the caller's original transactions.
    pub async fn dispatch_chunk(
        &self,
        batch_id: &str,
        chunk: Vec<Transaction>,
        progress: Arc<ProgressAggregator>,
    ) -> Vec<TransactionResult> {
        let handles: Vec<_> = chunk
            .iter()
            .cloned()
            .map(|transaction| {
                let dispatcher = self.clone();
                let batch_id = batch_id.to_string();
                let progress = Arc::clone(&progress);
                tokio::spawn(async move {
                    let resolution = dispatcher.process_transaction(&batch_id, &transaction).await;
                    progress.record_terminal(&transaction, &resolution);
                    TransactionResult {
                        transaction,
                        resolution,
                    }
                })
            })
            .collect();

        let mut results = Vec::with_capacity(chunk.len());
        for (joined, original) in join_all(handles).await.into_iter().zip(chunk) {
            match joined {
                Ok(result) => results.push(result),
                Err(join_error) => {
                    // A panicked task never reached record_terminal; count
                    // it here so the batch still completes exactly.
                    tracing::error!(
                        reference = %original.reference,
                        %join_error,
                        "transaction task aborted"
                    );
                    let resolution = Resolution::Failed {
                        reason: format!("internal task failure: {}", join_error),
                    };
                    progress.record_terminal(&original, &resolution);
                    results.push(TransactionResult {
                        transaction: original,
                        resolution,
                    });
                }
            }
        }
        results
    }

    /// Run one transaction's full retry lifecycle
    async fn process_transaction(&self, batch_id: &str, transaction: &Transaction) -> Resolution {
        // Admission: wait for a permit unless cancellation fires first.
        let _permit = tokio::select! {
            permit = self.permits.clone().acquire_owned() => match permit {
                Ok(permit) => permit,
                Err(_) => return Resolution::Cancelled,
            },
            _ = self.cancel.cancelled() => return Resolution::Cancelled,
        };

        let request = Transaction {
            reference: transaction.namespaced_reference(batch_id),
            ..transaction.clone()
        };

        let mut attempt: u32 = 1;
        loop {
            let outcome = self.attempt(&request).await;
            match &outcome {
                TransactionOutcome::Success => return Resolution::Succeeded,
                TransactionOutcome::PermanentFailure { reason } => {
                    return Resolution::Failed {
                        reason: reason.clone(),
                    };
                }
                TransactionOutcome::TransientFailure { reason } => {
                    match self.retry_policy.decide(attempt, &outcome) {
                        RetryDecision::Stop => {
                            return Resolution::Failed {
                                reason: format!(
                                    "retries exhausted after {} attempts: {}",
                                    attempt, reason
                                ),
                            };
                        }
                        RetryDecision::RetryAfter(delay) => {
                            tracing::debug!(
                                reference = %request.reference,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                %reason,
                                "transient failure, retry scheduled"
                            );
                            tokio::select! {
                                _ = sleep(delay) => {}
                                _ = self.cancel.cancelled() => return Resolution::Cancelled,
                            }
                            attempt += 1;
                        }
                    }
                }
            }
        }
    }

    /// One executor call under the per-call timeout
    ///
    /// An elapsed timeout is a transient failure: the charge outcome is
    /// unknown and the call is expected to be retry-safe.
    async fn attempt(&self, request: &Transaction) -> TransactionOutcome {
        match timeout(self.call_timeout, self.executor.execute(request)).await {
            Ok(outcome) => outcome,
            Err(_) => TransactionOutcome::TransientFailure {
                reason: format!(
                    "executor call exceeded {}s timeout",
                    self.call_timeout.as_secs()
                ),
            },
        }
    }
}

impl std::fmt::Debug for ConcurrentDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcurrentDispatcher")
            .field("retry_policy", &self.retry_policy)
            .field("call_timeout", &self.call_timeout)
            .finish_non_exhaustive()
    }
}
