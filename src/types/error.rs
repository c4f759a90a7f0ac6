//! Error types for the payment batch engine
//!
//! This module defines the structural errors the engine can surface to
//! callers. Per-transaction payment failures are *not* errors at this level:
//! they are classified outcomes that flow into the batch report. The
//! orchestrator only fails on structural problems (malformed job, chunker
//! misconfiguration, duplicate submission), never because individual
//! transactions failed.
//!
//! # Error Categories
//!
//! - **Admission errors**: missing idempotency key, duplicate event or
//!   batch. Protected-endpoint adapters map these to `400 Bad Request` and
//!   `409 Conflict` respectively.
//! - **Structural errors**: invalid chunk size, duplicate references within
//!   a batch.
//! - **Infrastructure errors**: `CacheError` for the idempotency cache seam.
//!   The guard treats these as non-fatal (fail-open).

use thiserror::Error;

/// Main error type for the payment batch engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The caller did not supply an idempotency key on a protected request
    ///
    /// Rejected before any side effect; maps to `400 Bad Request`.
    #[error("Missing idempotency key")]
    MissingIdempotencyKey,

    /// An event with this idempotency key was already processed or is in
    /// flight
    ///
    /// No side effect is performed twice; maps to `409 Conflict`.
    #[error("Event '{key}' already processed")]
    DuplicateEvent {
        /// The rejected idempotency key
        key: String,
    },

    /// A batch with this ID was already submitted within the dedupe window
    ///
    /// Only raised when batch-level dedupe is enabled on the orchestrator.
    #[error("Batch '{batch_id}' already submitted")]
    DuplicateBatch {
        /// The rejected batch ID
        batch_id: String,
    },

    /// Chunk size must be at least 1
    #[error("Invalid chunk size: {size}")]
    InvalidChunkSize {
        /// The rejected chunk size
        size: usize,
    },

    /// Two transactions in the same batch carry the same reference
    ///
    /// References must be unique within a batch for failure reporting to be
    /// unambiguous. The batch is rejected before any transaction executes.
    #[error("Duplicate reference '{reference}' in batch '{batch_id}'")]
    DuplicateReference {
        /// The duplicated reference
        reference: String,
        /// The batch containing the duplicate
        batch_id: String,
    },
}

impl EngineError {
    /// Create a DuplicateEvent error
    pub fn duplicate_event(key: &str) -> Self {
        EngineError::DuplicateEvent {
            key: key.to_string(),
        }
    }

    /// Create a DuplicateBatch error
    pub fn duplicate_batch(batch_id: &str) -> Self {
        EngineError::DuplicateBatch {
            batch_id: batch_id.to_string(),
        }
    }

    /// Create a DuplicateReference error
    pub fn duplicate_reference(reference: &str, batch_id: &str) -> Self {
        EngineError::DuplicateReference {
            reference: reference.to_string(),
            batch_id: batch_id.to_string(),
        }
    }
}

/// Infrastructure error from the idempotency cache
///
/// Connectivity failures, timeouts, and protocol errors all surface here.
/// The duplicate guard treats cache errors as non-fatal and fails open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cache unavailable: {message}")]
pub struct CacheError {
    /// Description of the underlying infrastructure failure
    pub message: String,
}

impl CacheError {
    /// Create a CacheError from any displayable cause
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::missing_key(EngineError::MissingIdempotencyKey, "Missing idempotency key")]
    #[case::duplicate_event(
        EngineError::duplicate_event("evt-1"),
        "Event 'evt-1' already processed"
    )]
    #[case::duplicate_batch(
        EngineError::duplicate_batch("batch-7"),
        "Batch 'batch-7' already submitted"
    )]
    #[case::invalid_chunk_size(
        EngineError::InvalidChunkSize { size: 0 },
        "Invalid chunk size: 0"
    )]
    #[case::duplicate_reference(
        EngineError::duplicate_reference("inv-1", "batch-7"),
        "Duplicate reference 'inv-1' in batch 'batch-7'"
    )]
    fn test_error_display(#[case] error: EngineError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_cache_error_display() {
        let error = CacheError::new("connection refused");
        assert_eq!(error.to_string(), "Cache unavailable: connection refused");
    }
}
