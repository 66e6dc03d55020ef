//! In-memory product catalog

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::ProductSummary;
use crate::store::StoreError;

use super::{Product, ProductLookup};

/// In-memory product catalog for tests and local wiring.
#[derive(Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<RwLock<HashMap<Uuid, Product>>>,
}

impl InMemoryProductCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a product
    pub async fn insert(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    /// Change a product's current price
    pub async fn set_price(&self, id: Uuid, price: rust_decimal::Decimal) -> bool {
        match self.products.write().await.get_mut(&id) {
            Some(product) => {
                product.price = price;
                true
            }
            None => false,
        }
    }

    pub async fn summary(&self, id: Uuid) -> Option<ProductSummary> {
        self.products.read().await.get(&id).map(Product::summary)
    }
}

#[async_trait]
impl ProductLookup for InMemoryProductCatalog {
    async fn get_product_by_id(&self, id: Uuid) -> Result<Product, StoreError> {
        self.products
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::product_not_found(id))
    }
}
