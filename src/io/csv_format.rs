//! CSV format handling for batch input and failure reports
//!
//! This module centralizes all CSV format concerns, providing:
//! - BatchCsvRecord structure for deserialization
//! - Conversion from CSV records to domain transactions
//! - Failure-report output serialization
//!
//! All functions are pure (no file I/O) for easy testing. The batch input
//! format has columns: card_token, amount, currency, reference. Amounts
//! are integer minor units.

use std::io::Write;

use csv::Writer;
use serde::Deserialize;

use crate::types::{BatchProgress, Transaction};

/// CSV record structure for deserialization
///
/// Matches the batch input format with columns: card_token, amount,
/// currency, reference. The amount is kept as a string so that parse
/// failures produce a per-record error instead of aborting the whole read.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct BatchCsvRecord {
    pub card_token: String,
    pub amount: String,
    pub currency: String,
    pub reference: String,
}

/// Convert a BatchCsvRecord to a Transaction
///
/// Validates that:
/// - the amount parses as a positive integer number of minor units
/// - card token, currency, and reference are non-empty
///
/// # Returns
///
/// - `Ok(Transaction)` - Successfully converted record
/// - `Err(String)` - Error message describing the conversion failure
pub fn convert_csv_record(record: BatchCsvRecord) -> Result<Transaction, String> {
    let amount: i64 = record
        .amount
        .trim()
        .parse()
        .map_err(|_| format!("Invalid amount '{}' for reference '{}'", record.amount, record.reference))?;
    if amount <= 0 {
        return Err(format!(
            "Amount must be positive, got {} for reference '{}'",
            amount, record.reference
        ));
    }

    if record.card_token.trim().is_empty() {
        return Err(format!(
            "Missing card token for reference '{}'",
            record.reference
        ));
    }
    if record.currency.trim().is_empty() {
        return Err(format!(
            "Missing currency for reference '{}'",
            record.reference
        ));
    }
    if record.reference.trim().is_empty() {
        return Err("Missing reference".to_string());
    }

    Ok(Transaction {
        card_token: record.card_token.trim().to_string(),
        amount,
        currency: record.currency.trim().to_string(),
        reference: record.reference.trim().to_string(),
    })
}

/// Write a batch failure report in CSV format
///
/// Writes one row per failed transaction with columns:
/// reference, card_token, amount, currency, error. Rows appear in
/// completion order, matching the report's failure list.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_failure_report(
    progress: &BatchProgress,
    output: &mut dyn Write,
) -> Result<(), String> {
    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["reference", "card_token", "amount", "currency", "error"])
        .map_err(|e| format!("Failed to write report header: {}", e))?;

    for failed in &progress.failed_transactions {
        writer
            .write_record(&[
                failed.transaction.reference.clone(),
                failed.transaction.card_token.clone(),
                failed.transaction.amount.to_string(),
                failed.transaction.currency.clone(),
                failed.error.clone(),
            ])
            .map_err(|e| format!("Failed to write report record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush report: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BatchStatus, FailedTransaction};
    use rstest::rstest;

    fn record(card_token: &str, amount: &str, currency: &str, reference: &str) -> BatchCsvRecord {
        BatchCsvRecord {
            card_token: card_token.to_string(),
            amount: amount.to_string(),
            currency: currency.to_string(),
            reference: reference.to_string(),
        }
    }

    #[test]
    fn test_convert_valid_record() {
        let transaction = convert_csv_record(record("tok_visa", " 1250 ", "USD", "inv-1")).unwrap();
        assert_eq!(transaction.card_token, "tok_visa");
        assert_eq!(transaction.amount, 1250);
        assert_eq!(transaction.currency, "USD");
        assert_eq!(transaction.reference, "inv-1");
    }

    #[rstest]
    #[case::non_numeric_amount(record("tok", "12.50", "USD", "r1"))]
    #[case::empty_amount(record("tok", "", "USD", "r1"))]
    #[case::zero_amount(record("tok", "0", "USD", "r1"))]
    #[case::negative_amount(record("tok", "-5", "USD", "r1"))]
    #[case::missing_token(record("", "100", "USD", "r1"))]
    #[case::missing_currency(record("tok", "100", "", "r1"))]
    #[case::missing_reference(record("tok", "100", "USD", " "))]
    fn test_convert_rejects_invalid_records(#[case] record: BatchCsvRecord) {
        assert!(convert_csv_record(record).is_err());
    }

    #[test]
    fn test_write_failure_report() {
        let progress = BatchProgress {
            total_transactions: 2,
            processed_count: 2,
            failed_transactions: vec![FailedTransaction {
                transaction: Transaction {
                    card_token: "tok_bad".to_string(),
                    amount: 100,
                    currency: "USD".to_string(),
                    reference: "inv-2".to_string(),
                },
                error: "card declined".to_string(),
            }],
            status: BatchStatus::Completed,
        };

        let mut output = Vec::new();
        write_failure_report(&progress, &mut output).unwrap();

        let report = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "reference,card_token,amount,currency,error");
        assert_eq!(lines[1], "inv-2,tok_bad,100,USD,card declined");
    }

    #[test]
    fn test_empty_report_has_header_only() {
        let progress = BatchProgress {
            total_transactions: 3,
            processed_count: 3,
            failed_transactions: Vec::new(),
            status: BatchStatus::Completed,
        };

        let mut output = Vec::new();
        write_failure_report(&progress, &mut output).unwrap();

        let report = String::from_utf8(output).unwrap();
        assert_eq!(report.lines().count(), 1);
    }
}
