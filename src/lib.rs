//! Payment Batch Engine Library
//! # Overview
//!
//! This library provides the reliable-execution layer of a multi-tenant
//! billing platform: a request-level idempotency guard and a batch
//! orchestration engine that make "send this payment" and "send these
//! 10,000 payments" safe to retry.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Transaction, BatchJob, outcomes, errors)
//! - [`core`] - Business logic components:
//!   - [`core::guard`] - Duplicate suppression for inbound events
//!   - [`core::retry`] - Exponential-backoff retry policy
//!   - [`core::chunker`] - Order-preserving batch chunking
//!   - [`core::dispatcher`] - Bounded-concurrency chunk execution
//!   - [`core::progress`] - Thread-safe progress aggregation
//!   - [`core::orchestrator`] - Top-level batch driver
//! - [`gateway`] - Deterministic sandbox executor for dry runs and tests
//! - [`io`] - CSV batch ingestion and failure-report output
//! - [`cli`] - CLI argument parsing
//!
//! # Reliability Model
//!
//! Payment gateway calls are slow, fail transiently, and may be redelivered.
//! The engine assumes at-least-once delivery end to end:
//!
//! - Inbound events are deduplicated by caller-supplied idempotency keys
//!   via an atomic set-if-absent cache primitive with a TTL.
//! - Batches are split into chunks dispatched strictly in order, while
//!   transactions within a chunk run concurrently under a batch-wide
//!   concurrency bound.
//! - Transient failures are retried with capped exponential backoff;
//!   permanent failures are reported immediately and never retried.
//! - One transaction's failure never aborts its siblings or the batch;
//!   the final report lists every failed transaction for the caller to
//!   inspect.

// Module declarations
pub mod cli;
pub mod core;
pub mod gateway;
pub mod io;
pub mod types;

pub use crate::core::{
    Admission, BatchOrchestrator, ConcurrentDispatcher, DuplicateGuard, IdempotencyCache,
    InMemoryCache, OrchestratorConfig, PaymentExecutor, ProgressAggregator, ProgressSink,
    Resolution, RetryDecision, RetryPolicy, TransactionResult,
};
pub use crate::gateway::SimulatedGateway;
pub use crate::io::{write_failure_report, BatchReader};
pub use crate::types::{
    BatchJob, BatchProgress, BatchStatus, CacheError, EngineError, FailedTransaction, Transaction,
    TransactionOutcome,
};
