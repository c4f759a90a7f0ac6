//! Core business logic module
//!
//! Contains the reliable-execution components of the engine:
//!
//! - [`traits`] - Capability seams consumed from collaborators
//! - [`guard`] - Request-level idempotency admission
//! - [`retry`] - Backoff policy for transient failures
//! - [`chunker`] - Order-preserving batch chunking
//! - [`dispatcher`] - Bounded-concurrency chunk execution
//! - [`progress`] - Thread-safe progress aggregation
//! - [`orchestrator`] - Top-level batch driver
//! - [`memory_cache`] - In-memory idempotency cache implementation

pub mod chunker;
pub mod dispatcher;
pub mod guard;
pub mod memory_cache;
pub mod orchestrator;
pub mod progress;
pub mod retry;
pub mod traits;

pub use chunker::{chunk, DEFAULT_CHUNK_SIZE};
pub use dispatcher::{
    ConcurrentDispatcher, TransactionResult, DEFAULT_CALL_TIMEOUT, DEFAULT_MAX_CONCURRENCY,
};
pub use guard::{Admission, DuplicateGuard, DEFAULT_IDEMPOTENCY_TTL};
pub use memory_cache::InMemoryCache;
pub use orchestrator::{BatchOrchestrator, OrchestratorConfig};
pub use progress::{ProgressAggregator, Resolution};
pub use retry::{RetryDecision, RetryPolicy};
pub use traits::{IdempotencyCache, PaymentExecutor, ProgressSink};
