//! Streaming CSV reader for batch input files
//!
//! Provides an iterator over transactions from a batch CSV file, delegating
//! format concerns to the csv_format module. Records are read one at a time
//! without loading the whole file into memory.
//!
//! # Error Handling
//!
//! - Fatal errors (file not found, I/O errors) are returned from `new()`
//! - Individual record errors are yielded as Err variants with the line
//!   number, so a malformed row can be skipped or reported without
//!   aborting the read

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Trim};

use crate::io::csv_format::{convert_csv_record, BatchCsvRecord};
use crate::types::Transaction;

/// Streaming batch CSV reader
///
/// Implements `Iterator`, yielding `Result<Transaction, String>` per row.
#[derive(Debug)]
pub struct BatchReader {
    reader: csv::Reader<File>,
    line_num: u64,
}

impl BatchReader {
    /// Open a batch CSV file for streaming iteration
    ///
    /// The reader trims whitespace from all fields. Returns an error if
    /// the file cannot be opened.
    pub fn new(path: &Path) -> Result<Self, String> {
        let file = File::open(path)
            .map_err(|e| format!("Failed to open '{}': {}", path.display(), e))?;
        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(false)
            .from_reader(file);
        Ok(Self {
            reader,
            line_num: 1, // header
        })
    }

    /// Read the whole file, separating valid transactions from bad rows
    ///
    /// Convenience for callers that want all-or-nothing ingestion with a
    /// list of per-row errors.
    pub fn read_all(self) -> (Vec<Transaction>, Vec<String>) {
        let mut transactions = Vec::new();
        let mut errors = Vec::new();
        for result in self {
            match result {
                Ok(transaction) => transactions.push(transaction),
                Err(error) => errors.push(error),
            }
        }
        (transactions, errors)
    }
}

impl Iterator for BatchReader {
    type Item = Result<Transaction, String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut records = self.reader.deserialize::<BatchCsvRecord>();
        match records.next()? {
            Ok(record) => {
                self.line_num += 1;
                Some(
                    convert_csv_record(record)
                        .map_err(|e| format!("Line {}: {}", self.line_num, e)),
                )
            }
            Err(e) => {
                self.line_num += 1;
                Some(Err(format!(
                    "Line {}: CSV parse error: {}",
                    self.line_num, e
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_reads_valid_batch_file() {
        let file = write_csv(
            "card_token,amount,currency,reference\n\
             tok_visa,1250,USD,inv-1\n\
             tok_mc,900,EUR,inv-2\n",
        );

        let reader = BatchReader::new(file.path()).unwrap();
        let (transactions, errors) = reader.read_all();

        assert!(errors.is_empty());
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].reference, "inv-1");
        assert_eq!(transactions[0].amount, 1250);
        assert_eq!(transactions[1].currency, "EUR");
    }

    #[test]
    fn test_bad_rows_are_reported_with_line_numbers() {
        let file = write_csv(
            "card_token,amount,currency,reference\n\
             tok_visa,not-a-number,USD,inv-1\n\
             tok_mc,900,EUR,inv-2\n",
        );

        let reader = BatchReader::new(file.path()).unwrap();
        let (transactions, errors) = reader.read_all();

        assert_eq!(transactions.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Line 2"));
        assert!(errors[0].contains("not-a-number"));
    }

    #[test]
    fn test_missing_file_is_a_fatal_error() {
        let result = BatchReader::new(Path::new("/nonexistent/batch.csv"));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_file_yields_no_transactions() {
        let file = write_csv("card_token,amount,currency,reference\n");
        let reader = BatchReader::new(file.path()).unwrap();
        let (transactions, errors) = reader.read_all();
        assert!(transactions.is_empty());
        assert!(errors.is_empty());
    }
}
