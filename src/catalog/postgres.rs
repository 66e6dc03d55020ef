//! PostgreSQL product catalog
//!
//! Reads current product data from the `products` table.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{StoreError, DEFAULT_STORE_TIMEOUT};

use super::{Product, ProductLookup};

/// Product catalog backed by the `products` table
#[derive(Debug, Clone)]
pub struct PgProductCatalog {
    pool: PgPool,
    timeout: Duration,
}

impl PgProductCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_product(&self, id: Uuid) -> Result<Product, StoreError> {
        let row: Option<(Uuid, String, String, String, Decimal)> = sqlx::query_as(
            r#"
            SELECT id, code, name, description, price
            FROM products
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, code, name, description, price) =
            row.ok_or_else(|| StoreError::product_not_found(id))?;

        Ok(Product {
            id,
            code,
            name,
            description,
            price,
        })
    }
}

#[async_trait]
impl ProductLookup for PgProductCatalog {
    async fn get_product_by_id(&self, id: Uuid) -> Result<Product, StoreError> {
        crate::store::bounded(self.timeout, self.fetch_product(id)).await
    }
}
