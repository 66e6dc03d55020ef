//! Command definitions
//!
//! Inputs to the order lifecycle, already bound from the transport.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Maximum number of lines per order unless configured otherwise
pub const DEFAULT_MAX_ORDER_LINES: usize = 5;

/// Placement policy limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderPolicy {
    pub max_lines: usize,
}

impl OrderPolicy {
    pub fn new(max_lines: usize) -> Self {
        Self { max_lines }
    }
}

impl Default for OrderPolicy {
    fn default() -> Self {
        Self {
            max_lines: DEFAULT_MAX_ORDER_LINES,
        }
    }
}

// =========================================================================
// PlaceOrderCommand
// =========================================================================

/// One requested line: which product and how many
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: String,
    pub quantity: i32,
}

impl OrderLineRequest {
    pub fn new(product_id: impl Into<String>, quantity: i32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Command to place a new order for the authenticated user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceOrderCommand {
    pub lines: Vec<OrderLineRequest>,
}

/// A line that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedLine {
    pub product_id: Uuid,
    pub quantity: i32,
}

impl PlaceOrderCommand {
    pub fn new(lines: Vec<OrderLineRequest>) -> Self {
        Self { lines }
    }

    pub fn with_line(mut self, product_id: impl Into<String>, quantity: i32) -> Self {
        self.lines.push(OrderLineRequest::new(product_id, quantity));
        self
    }

    /// Check shape and ranges. Performs no lookups and has no side effects.
    pub fn validate(&self, policy: &OrderPolicy) -> Result<Vec<ValidatedLine>, DomainError> {
        if self.lines.is_empty() {
            return Err(DomainError::invalid_input(
                "order must contain at least one line",
            ));
        }

        if self.lines.len() > policy.max_lines {
            return Err(DomainError::invalid_input(format!(
                "order may contain at most {} lines, got {}",
                policy.max_lines,
                self.lines.len()
            )));
        }

        self.lines
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let raw_id = line.product_id.trim();
                if raw_id.is_empty() {
                    return Err(DomainError::invalid_input(format!(
                        "line {}: product_id is required",
                        index
                    )));
                }

                let product_id = Uuid::parse_str(raw_id).map_err(|_| {
                    DomainError::invalid_input(format!(
                        "line {}: product_id '{}' is not a valid id",
                        index, raw_id
                    ))
                })?;

                if line.quantity <= 0 {
                    return Err(DomainError::invalid_input(format!(
                        "line {}: quantity must be positive",
                        index
                    )));
                }

                Ok(ValidatedLine {
                    product_id,
                    quantity: line.quantity,
                })
            })
            .collect()
    }
}
