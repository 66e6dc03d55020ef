//! Store Errors
//!
//! Error types for order and product persistence.

use std::time::Duration;
use uuid::Uuid;

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No matching, non-deleted row
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Optimistic concurrency conflict on update
    #[error("Version conflict for order {order_id}: expected version {expected}")]
    VersionConflict { order_id: Uuid, expected: i64 },

    /// Store call exceeded its time budget
    #[error("Store call timed out after {0:?}")]
    Timeout(Duration),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be decoded
    #[error("Invalid stored row: {0}")]
    InvalidRow(String),
}

impl StoreError {
    pub fn order_not_found(id: Uuid) -> Self {
        StoreError::NotFound { entity: "order", id }
    }

    pub fn product_not_found(id: Uuid) -> Self {
        StoreError::NotFound {
            entity: "product",
            id,
        }
    }

    /// Check if this error means the row does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Check if this error is a concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::VersionConflict { .. })
    }
}
