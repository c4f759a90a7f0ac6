//! Payment Batch Engine CLI
//!
//! Command-line interface for dry-running payment batches from CSV files
//! against the deterministic sandbox gateway.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --batch-id batch-2024-01 transactions.csv > failures.csv
//! cargo run -- --batch-id b1 --chunk-size 50 --max-concurrency 8 transactions.csv
//! ```
//!
//! The program reads transactions from the input CSV file, drives them
//! through the batch orchestrator using the sandbox gateway, prints a
//! summary to stderr, and writes the failure report CSV to stdout.
//!
//! Sandbox card-token prefixes: `decline:<reason>` fails permanently,
//! `flaky:<n>` fails transiently n times, `slow:<millis>` delays success.
//!
//! # Exit Codes
//!
//! - 0: Batch completed (possibly with failed transactions in the report)
//! - 1: Structural error (unreadable input, invalid configuration)

use std::process;
use std::sync::Arc;

use payment_batch_engine::cli;
use payment_batch_engine::{BatchJob, BatchOrchestrator, BatchReader, SimulatedGateway};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    let reader = match BatchReader::new(&args.input_file) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let (transactions, read_errors) = reader.read_all();
    for error in &read_errors {
        tracing::warn!(%error, "skipping malformed record");
    }

    let orchestrator = BatchOrchestrator::new(
        Arc::new(SimulatedGateway::new()),
        args.to_orchestrator_config(),
    );

    let job = BatchJob::new(args.batch_id.clone(), transactions);
    let report = match orchestrator.run(job).await {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    eprintln!(
        "Batch {}: {}/{} processed, {} succeeded, {} failed, {} skipped rows",
        args.batch_id,
        report.processed_count,
        report.total_transactions,
        report.succeeded_count(),
        report.failed_transactions.len(),
        read_errors.len(),
    );

    let mut output = std::io::stdout();
    if let Err(e) = payment_batch_engine::write_failure_report(&report, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
