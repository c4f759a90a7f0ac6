//! Capability traits consumed by the reliable-execution core
//!
//! The core never talks to a payment gateway or a cache service directly.
//! It consumes these trait seams, which collaborators implement: a real
//! gateway adapter and a shared cache client in production, in-memory
//! doubles in tests and dry runs.
//!
//! Collaborators are always passed explicitly as constructor arguments,
//! never through process-wide globals.

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{BatchProgress, CacheError, Transaction, TransactionOutcome};

/// Executes a single payment against the gateway
///
/// `execute` must be safe to call repeatedly with the same transaction
/// content: the engine guarantees at-least-once delivery under retries and
/// redeliveries. Exactly-once charge guarantees, if required, are the
/// implementor's responsibility, typically via an idempotency key derived
/// from the transaction reference.
///
/// Every failure must be classified as transient or permanent; the retry
/// decision is total over [`TransactionOutcome`].
#[async_trait]
pub trait PaymentExecutor: Send + Sync {
    /// Execute one payment and classify the result
    async fn execute(&self, transaction: &Transaction) -> TransactionOutcome;
}

/// Key-value store with atomic set-if-absent semantics and expiry
///
/// Backed by a shared cache service (e.g., Redis) in production. The
/// duplicate guard relies on `set_if_absent` being a single atomic
/// operation: two concurrent calls with the same absent key must not both
/// observe success.
#[async_trait]
pub trait IdempotencyCache: Send + Sync {
    /// Whether the key is currently present (and not expired)
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// Atomically set the key only if it is absent
    ///
    /// Returns `true` if the key was set by this call, `false` if it was
    /// already present. This is the primitive the duplicate guard uses for
    /// admission; it must not be emulated with a separate exists-then-set
    /// pair.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, CacheError>;

    /// Get the value stored under the key, if any
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Unconditionally set the key with an expiry
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;
}

/// Receives batch progress snapshots as they change
///
/// Implementors publish snapshots to external observers (queryable
/// workflow metadata, a metrics pipeline, a dashboard). Publishing is
/// best-effort: the aggregator logs and ignores sink errors, so a failing
/// observer never affects the correctness of the local counters.
pub trait ProgressSink: Send + Sync {
    /// Publish a progress snapshot
    fn publish(&self, progress: &BatchProgress) -> Result<(), String>;
}
