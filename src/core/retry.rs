//! Retry policy for transient payment failures
//!
//! A pure, side-effect-free policy: given the attempt number that just
//! failed and its outcome, decide whether the transaction should be retried
//! and after what delay. The dispatcher owns the actual sleeping.
//!
//! Backoff grows exponentially from `initial_interval` by
//! `backoff_coefficient` per attempt and is capped at `maximum_interval`.
//! No jitter is applied.

use std::time::Duration;

use crate::types::TransactionOutcome;

/// Decision returned by the retry policy for one completed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// The transaction is terminal; do not call the executor again
    Stop,

    /// Retry the transaction after waiting for the given delay
    RetryAfter(Duration),
}

/// Exponential-backoff retry policy
///
/// Defaults match the platform's standard activity options: 1s initial
/// interval, coefficient 2.0, 60s maximum interval, 3 attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the first retry
    pub initial_interval: Duration,

    /// Multiplier applied to the delay per additional attempt
    pub backoff_coefficient: f64,

    /// Upper bound on any single delay
    pub maximum_interval: Duration,

    /// Total executor calls allowed per transaction, including the first
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            backoff_coefficient: 2.0,
            maximum_interval: Duration::from_secs(60),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy {
    /// Decide whether to retry after `attempt` completed with `outcome`
    ///
    /// `attempt` is 1-based: the first executor call is attempt 1.
    /// Success and permanent failures always stop. Transient failures stop
    /// once `attempt` reaches `max_attempts`, otherwise they are retried
    /// after [`RetryPolicy::backoff`] for that attempt.
    pub fn decide(&self, attempt: u32, outcome: &TransactionOutcome) -> RetryDecision {
        match outcome {
            TransactionOutcome::Success | TransactionOutcome::PermanentFailure { .. } => {
                RetryDecision::Stop
            }
            TransactionOutcome::TransientFailure { .. } => {
                if attempt >= self.max_attempts {
                    RetryDecision::Stop
                } else {
                    RetryDecision::RetryAfter(self.backoff(attempt))
                }
            }
        }
    }

    /// Delay before the retry that follows failed attempt number `attempt`
    ///
    /// `initial_interval * backoff_coefficient^(attempt-1)`, capped at
    /// `maximum_interval`. Attempt numbers below 1 are treated as 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.max(1) - 1;
        let factor = self.backoff_coefficient.powi(exponent as i32);
        let delay = self.initial_interval.mul_f64(factor);
        delay.min(self.maximum_interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn transient() -> TransactionOutcome {
        TransactionOutcome::TransientFailure {
            reason: "rate limited".to_string(),
        }
    }

    fn permanent() -> TransactionOutcome {
        TransactionOutcome::PermanentFailure {
            reason: "card declined".to_string(),
        }
    }

    #[rstest]
    #[case::success_stops(1, TransactionOutcome::Success, RetryDecision::Stop)]
    #[case::permanent_stops(1, permanent(), RetryDecision::Stop)]
    #[case::permanent_stops_late(2, permanent(), RetryDecision::Stop)]
    #[case::transient_first_attempt(
        1,
        transient(),
        RetryDecision::RetryAfter(Duration::from_secs(1))
    )]
    #[case::transient_second_attempt(
        2,
        transient(),
        RetryDecision::RetryAfter(Duration::from_secs(2))
    )]
    #[case::transient_exhausted(3, transient(), RetryDecision::Stop)]
    #[case::transient_beyond_max(4, transient(), RetryDecision::Stop)]
    fn test_default_policy_decisions(
        #[case] attempt: u32,
        #[case] outcome: TransactionOutcome,
        #[case] expected: RetryDecision,
    ) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.decide(attempt, &outcome), expected);
    }

    #[rstest]
    #[case::first(1, Duration::from_secs(1))]
    #[case::second(2, Duration::from_secs(2))]
    #[case::third(3, Duration::from_secs(4))]
    #[case::seventh(7, Duration::from_secs(60))] // 64s capped at 60s
    #[case::zero_treated_as_first(0, Duration::from_secs(1))]
    fn test_default_backoff_schedule(#[case] attempt: u32, #[case] expected: Duration) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(attempt), expected);
    }

    #[test]
    fn test_backoff_is_monotone_and_capped() {
        let policy = RetryPolicy {
            initial_interval: Duration::from_millis(500),
            backoff_coefficient: 3.0,
            maximum_interval: Duration::from_secs(30),
            max_attempts: 10,
        };

        let mut previous = Duration::ZERO;
        for attempt in 1..=12 {
            let delay = policy.backoff(attempt);
            assert!(delay >= previous, "backoff shrank at attempt {}", attempt);
            assert!(delay <= policy.maximum_interval);
            previous = delay;
        }
    }

    #[test]
    fn test_custom_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 1,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.decide(1, &transient()), RetryDecision::Stop);
    }
}
