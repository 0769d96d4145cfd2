//! Error types for the Gridgate engine.

use crate::{CollectionName, RecordId};
use thiserror::Error;

/// All possible errors from the Gridgate engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("Missing id")]
    MissingId,

    #[error("Missing data")]
    MissingPayload,

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Invalid action")]
    UnknownAction(String),

    // Record errors
    #[error("record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("record already exists: {0}")]
    DuplicateId(RecordId),

    // Store errors
    #[error("row {row} out of range in sheet {sheet}")]
    RowOutOfRange { sheet: CollectionName, row: usize },

    // Batch errors
    #[error("operation {op} references result of operation {referenced}, which has not run yet")]
    InvalidReference { op: usize, referenced: usize },

    #[error("batch operation {index} failed: {source}")]
    BatchStep {
        index: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap an error as the failure of batch step `index`.
    pub fn at_batch_step(self, index: usize) -> Self {
        Error::BatchStep {
            index,
            source: Box::new(self),
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
