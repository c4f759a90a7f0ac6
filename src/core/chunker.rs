//! Order-preserving batch chunking
//!
//! Splits a batch's transaction list into fixed-size chunks, the unit of
//! sequential progression through a batch. Chunking is deterministic and
//! lossless: no transaction is dropped or duplicated, order is preserved,
//! and the last chunk may be smaller than the chunk size.

use crate::types::{EngineError, Transaction};

/// Default number of transactions per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Split transactions into order-preserving chunks of at most `chunk_size`
///
/// Returns [`EngineError::InvalidChunkSize`] if `chunk_size` is zero. An
/// empty input yields zero chunks.
pub fn chunk(
    transactions: Vec<Transaction>,
    chunk_size: usize,
) -> Result<Vec<Vec<Transaction>>, EngineError> {
    if chunk_size == 0 {
        return Err(EngineError::InvalidChunkSize { size: chunk_size });
    }

    let mut chunks = Vec::with_capacity(transactions.len().div_ceil(chunk_size));
    let mut current = Vec::with_capacity(chunk_size.min(transactions.len()));

    for transaction in transactions {
        current.push(transaction);
        if current.len() == chunk_size {
            chunks.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    Ok(chunks)
}
