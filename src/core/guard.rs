//! Request-level duplicate suppression
//!
//! Wraps an inbound-request pipeline: each protected request carries a
//! caller-supplied idempotency key (e.g., an `X-Event-ID` header), and the
//! guard admits the request only if that key has not been seen within the
//! TTL window. The key is opaque; uniqueness is the caller's responsibility.
//!
//! # Atomicity
//!
//! Admission is a single atomic `set_if_absent` against the cache. A
//! separate exists-then-set pair would leave a window where two concurrent
//! requests with the same key both observe "absent" and are both admitted;
//! the cache trait exposes the atomic primitive precisely so the guard
//! never has to take that path.
//!
//! # Fail-open
//!
//! Cache connectivity errors are non-fatal: the guard admits the request
//! and logs a warning, favoring availability over strict deduplication. A
//! transient cache outage must not block legitimate traffic.
//!
//! # Endpoint Mapping
//!
//! Transport adapters map [`EngineError::MissingIdempotencyKey`] to
//! `400 Bad Request` and [`EngineError::DuplicateEvent`] to `409 Conflict`;
//! admitted requests forward to normal handling.

use std::sync::Arc;
use std::time::Duration;

use crate::core::traits::IdempotencyCache;
use crate::types::EngineError;

/// How long an admitted key is remembered
///
/// Events separated by more than the TTL are treated as novel even if
/// their keys are identical.
pub const DEFAULT_IDEMPOTENCY_TTL: Duration = Duration::from_secs(300);

/// Marker value stored under admitted keys
const SEEN_MARKER: &str = "1";

/// Admission decision for one inbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The key is novel; process the request
    Admitted,

    /// The key was already seen within the TTL window
    Rejected,
}

/// Idempotency guard over an inbound-request pipeline
#[derive(Clone)]
pub struct DuplicateGuard {
    cache: Arc<dyn IdempotencyCache>,
    ttl: Duration,
}

impl DuplicateGuard {
    /// Create a guard with the default 5 minute TTL
    pub fn new(cache: Arc<dyn IdempotencyCache>) -> Self {
        Self {
            cache,
            ttl: DEFAULT_IDEMPOTENCY_TTL,
        }
    }

    /// Override how long admitted keys are remembered
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Decide whether the request carrying `key` may be processed
    ///
    /// Returns [`EngineError::MissingIdempotencyKey`] if the key is empty
    /// or blank. Otherwise the key is atomically claimed in the cache with
    /// the configured TTL: first claimant is admitted, later ones are
    /// rejected. Cache errors admit the request (fail-open) and emit a
    /// warning.
    pub async fn admit(&self, key: &str) -> Result<Admission, EngineError> {
        if key.trim().is_empty() {
            return Err(EngineError::MissingIdempotencyKey);
        }

        match self.cache.set_if_absent(key, SEEN_MARKER, self.ttl).await {
            Ok(true) => Ok(Admission::Admitted),
            Ok(false) => Ok(Admission::Rejected),
            Err(error) => {
                tracing::warn!(%key, %error, "idempotency cache unavailable, admitting request");
                Ok(Admission::Admitted)
            }
        }
    }

    /// Admit-or-error form of [`DuplicateGuard::admit`]
    ///
    /// Maps a rejection to [`EngineError::DuplicateEvent`], which endpoint
    /// adapters translate to `409 Conflict`.
    pub async fn require_novel(&self, key: &str) -> Result<(), EngineError> {
        match self.admit(key).await? {
            Admission::Admitted => Ok(()),
            Admission::Rejected => Err(EngineError::duplicate_event(key)),
        }
    }
}

impl std::fmt::Debug for DuplicateGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuplicateGuard")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
