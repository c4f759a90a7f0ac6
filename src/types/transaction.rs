//! Transaction and batch types for the payment batch engine
//!
//! This module defines the immutable payment data submitted to the engine:
//! individual transactions and the batch jobs that group them.

use serde::{Deserialize, Serialize};

/// A single payment transaction
///
/// Transactions are immutable once submitted to a batch. The `reference`
/// must be unique within a batch so that failure reporting is unambiguous;
/// the orchestrator validates this before dispatching.
///
/// Amounts are integer minor units (e.g., cents) to avoid floating-point
/// rounding in monetary values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque tokenized card identifier understood by the payment gateway
    pub card_token: String,

    /// Amount in integer minor units (e.g., cents)
    pub amount: i64,

    /// ISO 4217 currency code (not interpreted by the engine)
    pub currency: String,

    /// Caller-supplied reference, unique within a batch
    pub reference: String,
}

impl Transaction {
    /// Gateway-facing reference for this transaction within a batch
    ///
    /// The batch ID namespaces the caller's reference so that the same
    /// reference submitted under two different batches produces distinct
    /// gateway references. Reports always retain the caller's original
    /// reference.
    pub fn namespaced_reference(&self, batch_id: &str) -> String {
        format!("{}-{}", batch_id, self.reference)
    }
}

/// A batch of payment transactions to drive to completion
///
/// The `batch_id` is caller-supplied and used to namespace gateway
/// references. Resubmitting the same `batch_id` is not deduplicated by
/// default; batch-level dedupe is an orchestrator configuration option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchJob {
    /// Caller-supplied batch identifier
    pub batch_id: String,

    /// Ordered sequence of transactions to execute
    pub transactions: Vec<Transaction>,
}

impl BatchJob {
    /// Create a new batch job
    pub fn new(batch_id: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            batch_id: batch_id.into(),
            transactions,
        }
    }
}
