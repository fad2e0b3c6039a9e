//! Common error types for graft.

use crate::RecordId;
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found. Also raised when an association slot is assigned a
    /// target that does not exist in the store.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
