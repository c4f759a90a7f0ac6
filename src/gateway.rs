//! Deterministic sandbox payment executor
//!
//! A [`PaymentExecutor`] for dry runs and tests, in the manner of payment
//! sandboxes that map magic test card tokens to fixed behaviors. Outcomes
//! are driven by the card token's prefix, so batches are reproducible
//! without randomness:
//!
//! - `decline:<reason>` - permanent failure with the given reason
//! - `flaky:<n>` - transient failure for the first `n` calls per gateway
//!   reference, success afterwards
//! - `slow:<millis>` - sleeps before succeeding (exercises call timeouts)
//! - anything else - immediate success
//!
//! Flaky call counts are tracked per gateway reference, matching how retry
//! attempts address the same logical payment.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::core::traits::PaymentExecutor;
use crate::types::{Transaction, TransactionOutcome};

/// Sandbox executor with token-prefix-driven outcomes
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    attempts: DashMap<String, u32>,
}

impl SimulatedGateway {
    /// Create a gateway with no recorded attempts
    pub fn new() -> Self {
        Self {
            attempts: DashMap::new(),
        }
    }

    fn record_attempt(&self, reference: &str) -> u32 {
        let mut count = self.attempts.entry(reference.to_string()).or_insert(0);
        *count += 1;
        *count
    }
}

#[async_trait]
impl PaymentExecutor for SimulatedGateway {
    async fn execute(&self, transaction: &Transaction) -> TransactionOutcome {
        let attempt = self.record_attempt(&transaction.reference);

        if let Some(reason) = transaction.card_token.strip_prefix("decline:") {
            return TransactionOutcome::PermanentFailure {
                reason: reason.to_string(),
            };
        }

        if let Some(spec) = transaction.card_token.strip_prefix("flaky:") {
            let failures: u32 = spec.parse().unwrap_or(1);
            if attempt <= failures {
                return TransactionOutcome::TransientFailure {
                    reason: format!("simulated transient failure {}/{}", attempt, failures),
                };
            }
            return TransactionOutcome::Success;
        }

        if let Some(spec) = transaction.card_token.strip_prefix("slow:") {
            let millis: u64 = spec.parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        TransactionOutcome::Success
    }
}
