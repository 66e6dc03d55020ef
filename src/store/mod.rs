//! Order Store module
//!
//! Durable, atomic persistence of the Order aggregate. The store knows
//! nothing about business rules; it reports success, `NotFound` or a
//! persistence failure.

mod error;
mod memory;
mod postgres;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewOrderLine, Order, OrderQuery, Pagination};

pub use error::StoreError;
pub use memory::InMemoryOrderStore;
pub use postgres::PgOrderStore;

/// Ceiling applied to every store call unless configured otherwise
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistence operations for the Order aggregate.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persist an order and all its lines in one transaction.
    ///
    /// `total_price` is the sum of the line prices. If any insert fails,
    /// nothing is persisted.
    async fn create_order(
        &self,
        user_id: Uuid,
        lines: Vec<NewOrderLine>,
    ) -> Result<Order, StoreError>;

    /// Load one order. With `preload`, lines and their product fields are
    /// loaded too; without it `lines` is empty.
    async fn get_order_by_id(&self, id: Uuid, preload: bool) -> Result<Order, StoreError>;

    /// One page of a user's orders (lines preloaded) plus the page descriptor.
    async fn get_my_orders(
        &self,
        user_id: Uuid,
        query: &OrderQuery,
    ) -> Result<(Vec<Order>, Pagination), StoreError>;

    /// Persist the current status of an existing order.
    ///
    /// The write only applies if the stored version still equals
    /// `order.version`; on success `version` and `updated_at` are refreshed.
    async fn update_order(&self, order: &mut Order) -> Result<(), StoreError>;
}

/// Run a store call under a time budget.
pub(crate) async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout(limit))?
}
