//! Product Lookup module
//!
//! Read-only access to the product catalog. Order placement resolves each
//! requested product here to learn its current unit price.

mod memory;
mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ProductSummary;
use crate::store::StoreError;

pub use memory::InMemoryProductCatalog;
pub use postgres::PgProductCatalog;

/// A catalog product as seen at lookup time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    /// Current unit price
    pub price: Decimal,
}

impl Product {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Decimal) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            description: String::new(),
            price,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Descriptive fields attached to order lines
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Resolves product identifiers to their current data.
#[async_trait]
pub trait ProductLookup: Send + Sync {
    /// Fails with `StoreError::NotFound` if the product does not exist.
    async fn get_product_by_id(&self, id: Uuid) -> Result<Product, StoreError>;
}
