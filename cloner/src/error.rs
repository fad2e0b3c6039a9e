//! Clone error types.

use graft_core::{RecordId, StoreError, TypeId};
use thiserror::Error;

/// Result type for clone operations.
pub type CloneResult<T> = Result<T, CloneError>;

/// Errors that can occur during a clone.
#[derive(Debug, Error)]
pub enum CloneError {
    /// A directive names an association the record's type does not declare.
    /// Fatal for the whole call chain; never retried.
    #[error("Association not found: {type_name}#{association}")]
    AssociationNotFound {
        type_name: String,
        association: String,
    },

    /// An association slot points at a record missing from the store.
    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    /// A record carries a type tag the registry does not know.
    #[error("Type not found: {0}")]
    TypeNotFound(TypeId),
}

impl CloneError {
    pub fn association_not_found(
        type_name: impl Into<String>,
        association: impl Into<String>,
    ) -> Self {
        Self::AssociationNotFound {
            type_name: type_name.into(),
            association: association.into(),
        }
    }
}

impl From<StoreError> for CloneError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RecordNotFound(id) => Self::RecordNotFound(id),
        }
    }
}
