use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::core::{OrchestratorConfig, RetryPolicy};

/// Execute a batch of payments with bounded concurrency and retries
#[derive(Parser, Debug)]
#[command(name = "payment-batch-engine")]
#[command(about = "Execute a batch of payments with bounded concurrency and retries", long_about = None)]
pub struct CliArgs {
    /// Input CSV file with columns: card_token, amount, currency, reference
    #[arg(value_name = "INPUT", help = "Path to the batch CSV file")]
    pub input_file: PathBuf,

    /// Batch identifier, used to namespace gateway references
    #[arg(long = "batch-id", value_name = "ID")]
    pub batch_id: String,

    /// Number of transactions per chunk
    #[arg(
        long = "chunk-size",
        value_name = "SIZE",
        default_value_t = 100,
        help = "Transactions per sequentially-dispatched chunk"
    )]
    pub chunk_size: usize,

    /// Bound on in-flight transactions across the batch
    #[arg(
        long = "max-concurrency",
        value_name = "COUNT",
        default_value_t = 100,
        help = "Maximum concurrent in-flight transactions"
    )]
    pub max_concurrency: usize,

    /// Maximum executor calls per transaction, including the first
    #[arg(long = "max-attempts", value_name = "COUNT", default_value_t = 3)]
    pub max_attempts: u32,

    /// Per-call executor timeout in seconds
    #[arg(long = "call-timeout-secs", value_name = "SECS", default_value_t = 60)]
    pub call_timeout_secs: u64,
}

impl CliArgs {
    /// Build an OrchestratorConfig from the CLI arguments
    pub fn to_orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            chunk_size: self.chunk_size,
            max_concurrency: self.max_concurrency,
            call_timeout: Duration::from_secs(self.call_timeout_secs),
            retry_policy: RetryPolicy {
                max_attempts: self.max_attempts,
                ..RetryPolicy::default()
            },
            dedupe_batches: false,
        }
    }
}
