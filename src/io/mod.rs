//! I/O module
//!
//! Handles the CSV submission surface of the dry-run binary:
//! - `csv_format`: Record parsing, conversion, and report serialization
//! - `reader`: Streaming batch file reader

pub mod csv_format;
pub mod reader;

pub use csv_format::{convert_csv_record, write_failure_report, BatchCsvRecord};
pub use reader::BatchReader;
