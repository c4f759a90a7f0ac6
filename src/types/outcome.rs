//! Outcome and progress types for batch execution
//!
//! This module defines the tagged outcome returned by payment executors,
//! the per-transaction failure record, and the batch progress snapshot
//! published to observers.
//!
//! # Outcome Classification
//!
//! Every executor call must classify its result into exactly one of three
//! variants. The retry decision is total over this enum, so a misbehaving
//! executor cannot put a transaction into an unretryable-but-retried state:
//!
//! - `Success`: the payment went through; terminal.
//! - `TransientFailure`: expected to possibly succeed on retry (timeout,
//!   rate limit, network blip); retried per policy.
//! - `PermanentFailure`: will not change on retry (invalid card,
//!   insufficient funds); terminal, never retried.

use serde::{Deserialize, Serialize};

use crate::types::Transaction;

/// Result of one payment executor call
///
/// Executors must map every failure onto `TransientFailure` or
/// `PermanentFailure`; there is no untyped error escape hatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionOutcome {
    /// The payment was executed successfully
    Success,

    /// The call failed but may succeed if retried
    TransientFailure {
        /// Gateway- or transport-level description of the failure
        reason: String,
    },

    /// The call failed and retrying will not change the result
    PermanentFailure {
        /// Gateway-level description of the decline
        reason: String,
    },
}

impl TransactionOutcome {
    /// Whether this outcome ends the transaction's retry lifecycle
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionOutcome::TransientFailure { .. })
    }
}

/// A transaction that reached a failed terminal state
///
/// Carries the caller's original transaction (not the namespaced gateway
/// request) together with the last observed error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedTransaction {
    /// The transaction as submitted by the caller
    pub transaction: Transaction,

    /// Description of the terminal failure
    ///
    /// For permanent failures this is the gateway's decline reason; for
    /// exhausted transient failures it carries the last observed reason.
    pub error: String,
}

/// Lifecycle state of a batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    /// The batch is still being dispatched
    Running,

    /// Every transaction reached a terminal state
    Completed,

    /// The run was cancelled; the report is partial
    Cancelled,
}

/// Snapshot of a batch's progress
///
/// Snapshots are immutable copies taken under the aggregator's lock and are
/// safe to hand to external observers at any point, including mid-batch.
/// While the batch is `Running`, successive snapshots are monotone:
/// `processed_count` never decreases and `failed_transactions` never
/// shrinks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchProgress {
    /// Number of transactions in the batch
    pub total_transactions: usize,

    /// Number of transactions that reached a terminal state
    ///
    /// A retried-then-succeeded transaction counts once; a
    /// retried-then-exhausted transaction counts once (as failed).
    pub processed_count: usize,

    /// Transactions that failed terminally, in completion order
    pub failed_transactions: Vec<FailedTransaction>,

    /// Current lifecycle state of the run
    pub status: BatchStatus,
}

impl BatchProgress {
    /// Number of transactions that reached a successful terminal state
    pub fn succeeded_count(&self) -> usize {
        self.processed_count - self.failed_transactions.len()
    }
}
