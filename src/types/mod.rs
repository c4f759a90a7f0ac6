//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Payment transactions and batch jobs
//! - `outcome`: Executor outcomes and batch progress snapshots
//! - `error`: Structural and infrastructure error types

pub mod error;
pub mod outcome;
pub mod transaction;

pub use error::{CacheError, EngineError};
pub use outcome::{BatchProgress, BatchStatus, FailedTransaction, TransactionOutcome};
pub use transaction::{BatchJob, Transaction};
