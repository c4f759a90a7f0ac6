//! Top-level batch orchestration
//!
//! Drives a whole batch to completion: validates the job, splits it into
//! chunks, dispatches each chunk under the batch-wide concurrency bound,
//! and returns the final progress report.
//!
//! # State Machine
//!
//! `Chunking -> DispatchingChunk(0) -> DispatchingChunk(1) -> ... -> Completed`
//!
//! Chunks are processed strictly sequentially: chunk N+1 does not start
//! until every transaction of chunk N reached a terminal state. Within a
//! chunk, transactions run concurrently. This bounds peak concurrency and
//! yields incremental, observable progress.
//!
//! # Failure Semantics
//!
//! Transaction-level failures never become orchestrator errors: `run`
//! returns a report and the caller inspects `failed_transactions` for
//! partial failure. The orchestrator itself only errors on structural
//! problems (invalid chunk size, duplicate references, duplicate batch
//! submission when batch dedupe is enabled). Succeeded transactions are
//! never rolled back when later ones fail; compensation, if required, is a
//! collaborator's responsibility.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::core::chunker::{self, DEFAULT_CHUNK_SIZE};
use crate::core::dispatcher::{
    ConcurrentDispatcher, TransactionResult, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_CONCURRENCY,
};
use crate::core::guard::{Admission, DuplicateGuard};
use crate::core::progress::ProgressAggregator;
use crate::core::retry::RetryPolicy;
use crate::core::traits::{PaymentExecutor, ProgressSink};
use crate::types::{BatchJob, BatchProgress, EngineError};

/// Configuration knobs for batch orchestration
///
/// The chunk size and the concurrency bound are independent: the former
/// controls the unit of sequential progression, the latter caps in-flight
/// transactions across the whole batch.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Transactions per chunk (default 100)
    pub chunk_size: usize,

    /// Bound on in-flight transactions across the batch (default 100)
    pub max_concurrency: usize,

    /// Timeout applied to each executor call (default 60s)
    pub call_timeout: Duration,

    /// Retry policy for transient failures
    pub retry_policy: RetryPolicy,

    /// Reject resubmission of a batch ID seen within the dedupe TTL
    ///
    /// Off by default: request-level deduplication is the platform's
    /// standard guarantee, and batch-level dedupe is an integrator
    /// option. Requires a guard via
    /// [`BatchOrchestrator::with_batch_dedupe`].
    pub dedupe_batches: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
            retry_policy: RetryPolicy::default(),
            dedupe_batches: false,
        }
    }
}

/// Drives batches of payment transactions to completion
pub struct BatchOrchestrator {
    executor: Arc<dyn PaymentExecutor>,
    config: OrchestratorConfig,
    sink: Option<Arc<dyn ProgressSink>>,
    batch_guard: Option<DuplicateGuard>,
    cancel: CancellationToken,
    current: Mutex<Option<Arc<ProgressAggregator>>>,
}

impl BatchOrchestrator {
    /// Create an orchestrator over the given executor
    pub fn new(executor: Arc<dyn PaymentExecutor>, config: OrchestratorConfig) -> Self {
        Self {
            executor,
            config,
            sink: None,
            batch_guard: None,
            cancel: CancellationToken::new(),
            current: Mutex::new(None),
        }
    }

    /// Attach a sink that receives every progress snapshot
    pub fn with_progress_sink(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Attach the guard used for batch-level dedupe
    ///
    /// Only consulted when [`OrchestratorConfig::dedupe_batches`] is set.
    pub fn with_batch_dedupe(mut self, guard: DuplicateGuard) -> Self {
        self.batch_guard = Some(guard);
        self
    }

    /// Handle for cancelling the current and future runs cooperatively
    ///
    /// On cancellation, in-flight attempts finish but no further retries
    /// or chunks start; `run` then returns a partial report with
    /// `BatchStatus::Cancelled`.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Live progress of the current (or most recent) run
    ///
    /// Pollable at any time; returns `None` before the first run starts.
    pub fn progress(&self) -> Option<BatchProgress> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
            .map(|aggregator| aggregator.snapshot())
    }

    /// Drive `job` to completion and return the final report
    ///
    /// Validates the job structurally, then dispatches chunk by chunk. A
    /// batch with zero transactions completes immediately with a zero
    /// report. Errors are returned only for structural problems; failed
    /// transactions appear in the report instead.
    pub async fn run(&self, job: BatchJob) -> Result<BatchProgress, EngineError> {
        self.validate_references(&job)?;
        let chunks = chunker::chunk(job.transactions, self.config.chunk_size)?;

        if self.config.dedupe_batches {
            if let Some(guard) = &self.batch_guard {
                if guard.admit(&job.batch_id).await? == Admission::Rejected {
                    return Err(EngineError::duplicate_batch(&job.batch_id));
                }
            }
        }

        let total: usize = chunks.iter().map(Vec::len).sum();
        let progress = Arc::new(ProgressAggregator::new(total, self.sink.clone()));
        *self
            .current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(Arc::clone(&progress));

        let permits = Arc::new(Semaphore::new(self.config.max_concurrency));
        let dispatcher = ConcurrentDispatcher::new(
            Arc::clone(&self.executor),
            self.config.retry_policy,
            permits,
            self.config.call_timeout,
            self.cancel.clone(),
        );

        let chunk_count = chunks.len();
        for (index, chunk) in chunks.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                tracing::info!(
                    batch_id = %job.batch_id,
                    remaining_chunks = chunk_count - index,
                    "batch cancelled, skipping remaining chunks"
                );
                break;
            }

            let results = dispatcher
                .dispatch_chunk(&job.batch_id, chunk, Arc::clone(&progress))
                .await;
            self.log_chunk(&job.batch_id, index, chunk_count, &results, &progress);
        }

        if self.cancel.is_cancelled() {
            progress.mark_cancelled();
        } else {
            progress.mark_completed();
        }
        Ok(progress.snapshot())
    }

    /// Reject batches whose references are not unique
    fn validate_references(&self, job: &BatchJob) -> Result<(), EngineError> {
        let mut seen = HashSet::with_capacity(job.transactions.len());
        for transaction in &job.transactions {
            if !seen.insert(transaction.reference.as_str()) {
                return Err(EngineError::duplicate_reference(
                    &transaction.reference,
                    &job.batch_id,
                ));
            }
        }
        Ok(())
    }

    fn log_chunk(
        &self,
        batch_id: &str,
        index: usize,
        chunk_count: usize,
        results: &[TransactionResult],
        progress: &ProgressAggregator,
    ) {
        let snapshot = progress.snapshot();
        tracing::info!(
            batch_id = %batch_id,
            chunk = index + 1,
            chunks = chunk_count,
            chunk_size = results.len(),
            processed = snapshot.processed_count,
            total = snapshot.total_transactions,
            failures = snapshot.failed_transactions.len(),
            "chunk dispatched"
        );
    }
}

impl std::fmt::Debug for BatchOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchOrchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
