//! Domain Error Types
//!
//! Business rule violations raised by the order lifecycle.
//! Persistence failures live in `store::StoreError` and are passed through
//! untouched.

use thiserror::Error;
use uuid::Uuid;

use super::OrderStatus;

/// Business-rule errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed, missing or out-of-range request field
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A referenced product does not exist
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Caller does not own the order
    #[error("Permission denied for order {order_id}")]
    PermissionDenied { order_id: Uuid },

    /// Transition not allowed from the current status
    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: OrderStatus, to: OrderStatus },
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}
