//! Thread-safe batch progress aggregation
//!
//! Accumulates terminal results across a batch's concurrent transactions
//! and hands out immutable snapshots to observers. The aggregator's mutex
//! is the single point of total ordering for `processed_count` updates, so
//! concurrent increments never lose an update.
//!
//! Snapshots may optionally be pushed to a [`ProgressSink`] after each
//! mutation. Publishing is best-effort: a sink error is logged and the
//! local counters still advance, so an observability outage never affects
//! correctness.

use std::sync::{Arc, Mutex};

use crate::core::traits::ProgressSink;
use crate::types::{BatchProgress, BatchStatus, FailedTransaction, Transaction};

/// Final disposition of one transaction's retry lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The payment executed successfully
    Succeeded,

    /// The payment failed terminally (permanent failure or exhausted
    /// retries)
    Failed {
        /// Last observed failure reason
        reason: String,
    },

    /// The batch was cancelled before this transaction reached a terminal
    /// state; it is not counted as processed
    Cancelled,
}

/// Accumulates processed/failed counts across a batch
///
/// Safe under concurrent `record_terminal` calls from many in-flight
/// transactions. Counters are monotone while the batch is running.
pub struct ProgressAggregator {
    inner: Mutex<BatchProgress>,
    sink: Option<Arc<dyn ProgressSink>>,
}

impl ProgressAggregator {
    /// Create an aggregator for a batch of `total_transactions` items
    pub fn new(total_transactions: usize, sink: Option<Arc<dyn ProgressSink>>) -> Self {
        Self {
            inner: Mutex::new(BatchProgress {
                total_transactions,
                processed_count: 0,
                failed_transactions: Vec::new(),
                status: BatchStatus::Running,
            }),
            sink,
        }
    }

    /// Record that a transaction reached a terminal state
    ///
    /// Increments `processed_count`; failures are appended to the failure
    /// list with their reason. [`Resolution::Cancelled`] transactions never
    /// reached a terminal state and are ignored.
    pub fn record_terminal(&self, transaction: &Transaction, resolution: &Resolution) {
        let snapshot = {
            let mut progress = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            match resolution {
                Resolution::Succeeded => {
                    progress.processed_count += 1;
                }
                Resolution::Failed { reason } => {
                    progress.processed_count += 1;
                    progress.failed_transactions.push(FailedTransaction {
                        transaction: transaction.clone(),
                        error: reason.clone(),
                    });
                }
                Resolution::Cancelled => return,
            }
            progress.clone()
        };
        self.publish(&snapshot);
    }

    /// Mark the batch as completed
    pub fn mark_completed(&self) {
        self.set_status(BatchStatus::Completed);
    }

    /// Mark the batch as cancelled; the report stays partial
    pub fn mark_cancelled(&self) {
        self.set_status(BatchStatus::Cancelled);
    }

    /// Immutable copy of the current progress
    ///
    /// Pollable at any time, including mid-batch.
    pub fn snapshot(&self) -> BatchProgress {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    fn set_status(&self, status: BatchStatus) {
        let snapshot = {
            let mut progress = self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            progress.status = status;
            progress.clone()
        };
        self.publish(&snapshot);
    }

    fn publish(&self, snapshot: &BatchProgress) {
        if let Some(sink) = &self.sink {
            if let Err(error) = sink.publish(snapshot) {
                tracing::warn!(%error, "failed to publish progress snapshot");
            }
        }
    }
}

impl std::fmt::Debug for ProgressAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressAggregator")
            .field("progress", &self.snapshot())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tx(reference: &str) -> Transaction {
        Transaction {
            card_token: "tok_visa".to_string(),
            amount: 100,
            currency: "USD".to_string(),
            reference: reference.to_string(),
        }
    }

    /// Sink double that counts publishes and optionally fails them all
    struct CountingSink {
        publishes: AtomicUsize,
        fail: bool,
    }

    impl CountingSink {
        fn new(fail: bool) -> Self {
            Self {
                publishes: AtomicUsize::new(0),
                fail,
            }
        }
    }

    impl ProgressSink for CountingSink {
        fn publish(&self, _progress: &BatchProgress) -> Result<(), String> {
            self.publishes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err("observer unreachable".to_string())
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_success_and_failure_both_count_as_processed() {
        let aggregator = ProgressAggregator::new(2, None);

        aggregator.record_terminal(&tx("a"), &Resolution::Succeeded);
        aggregator.record_terminal(
            &tx("b"),
            &Resolution::Failed {
                reason: "card declined".to_string(),
            },
        );

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.processed_count, 2);
        assert_eq!(snapshot.failed_transactions.len(), 1);
        assert_eq!(snapshot.failed_transactions[0].transaction.reference, "b");
        assert_eq!(snapshot.failed_transactions[0].error, "card declined");
        assert_eq!(snapshot.status, BatchStatus::Running);
    }

    #[test]
    fn test_cancelled_resolutions_are_not_counted() {
        let aggregator = ProgressAggregator::new(3, None);

        aggregator.record_terminal(&tx("a"), &Resolution::Succeeded);
        aggregator.record_terminal(&tx("b"), &Resolution::Cancelled);

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.processed_count, 1);
        assert!(snapshot.failed_transactions.is_empty());
    }

    #[test]
    fn test_status_transitions() {
        let aggregator = ProgressAggregator::new(0, None);
        assert_eq!(aggregator.snapshot().status, BatchStatus::Running);

        aggregator.mark_completed();
        assert_eq!(aggregator.snapshot().status, BatchStatus::Completed);

        let aggregator = ProgressAggregator::new(0, None);
        aggregator.mark_cancelled();
        assert_eq!(aggregator.snapshot().status, BatchStatus::Cancelled);
    }

    #[test]
    fn test_sink_receives_every_terminal_snapshot() {
        let sink = Arc::new(CountingSink::new(false));
        let aggregator = ProgressAggregator::new(2, Some(sink.clone()));

        aggregator.record_terminal(&tx("a"), &Resolution::Succeeded);
        aggregator.record_terminal(&tx("b"), &Resolution::Succeeded);
        aggregator.mark_completed();

        assert_eq!(sink.publishes.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_sink_failure_does_not_affect_counters() {
        let sink = Arc::new(CountingSink::new(true));
        let aggregator = ProgressAggregator::new(2, Some(sink.clone()));

        aggregator.record_terminal(&tx("a"), &Resolution::Succeeded);
        aggregator.record_terminal(
            &tx("b"),
            &Resolution::Failed {
                reason: "timeout".to_string(),
            },
        );

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.processed_count, 2);
        assert_eq!(snapshot.failed_transactions.len(), 1);
        assert_eq!(sink.publishes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_increments_never_lose_updates() {
        use std::thread;

        let aggregator = Arc::new(ProgressAggregator::new(200, None));
        let mut handles = Vec::new();
        for i in 0..8 {
            let aggregator = aggregator.clone();
            handles.push(thread::spawn(move || {
                for j in 0..25 {
                    let transaction = tx(&format!("t{}-{}", i, j));
                    if j % 5 == 0 {
                        aggregator.record_terminal(
                            &transaction,
                            &Resolution::Failed {
                                reason: "declined".to_string(),
                            },
                        );
                    } else {
                        aggregator.record_terminal(&transaction, &Resolution::Succeeded);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.processed_count, 200);
        assert_eq!(snapshot.failed_transactions.len(), 40);
    }
}
