//! In-memory Order Store
//!
//! Backs the service and HTTP tests without a database.

use std::cmp::Ordering;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::InMemoryProductCatalog;
use crate::domain::{
    generate_order_code, NewOrderLine, Order, OrderLine, OrderQuery, OrderSortColumn,
    OrderStatus, Pagination,
};

use super::{OrderStore, StoreError};

/// In-memory order store for tests and local wiring.
///
/// Mirrors the PostgreSQL store: aggregates are staged and only become
/// visible once every line is built, versions guard updates, and product
/// fields are resolved from an optional catalog on preload.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<Vec<Order>>>,
    catalog: Option<InMemoryProductCatalog>,
    failing_line: Option<usize>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory order store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve product fields from `catalog` when preloading lines.
    pub fn with_catalog(mut self, catalog: InMemoryProductCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Fail `create_order` when inserting the line at `index`.
    pub fn with_failing_line(mut self, index: usize) -> Self {
        self.failing_line = Some(index);
        self
    }

    /// Number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Force a status, as an external fulfillment process would.
    /// Returns false if the order does not exist.
    pub async fn set_status(&self, id: Uuid, status: OrderStatus) -> bool {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == id) {
            Some(order) => {
                order.status = status;
                order.version += 1;
                order.updated_at = Utc::now();
                true
            }
            None => false,
        }
    }

    async fn with_products(&self, mut order: Order) -> Order {
        if let Some(catalog) = &self.catalog {
            for line in &mut order.lines {
                line.product = catalog.summary(line.product_id).await;
            }
        }
        order
    }
}

fn compare(a: &Order, b: &Order, column: OrderSortColumn) -> Ordering {
    match column {
        OrderSortColumn::CreatedAt => a.created_at.cmp(&b.created_at),
        OrderSortColumn::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        OrderSortColumn::Code => a.code.cmp(&b.code),
        OrderSortColumn::Status => a.status.as_str().cmp(b.status.as_str()),
        OrderSortColumn::TotalPrice => a.total_price.cmp(&b.total_price),
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn create_order(
        &self,
        user_id: Uuid,
        lines: Vec<NewOrderLine>,
    ) -> Result<Order, StoreError> {
        let now = Utc::now();
        let order_id = Uuid::new_v4();

        let mut order = Order {
            id: order_id,
            code: generate_order_code(now),
            user_id,
            lines: Vec::with_capacity(lines.len()),
            total_price: Order::total_of(&lines),
            status: OrderStatus::New,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        for (index, line) in lines.into_iter().enumerate() {
            if self.failing_line == Some(index) {
                return Err(StoreError::Database(sqlx::Error::Protocol(format!(
                    "insert of order line {} failed",
                    index
                ))));
            }

            order.lines.push(OrderLine {
                id: Uuid::new_v4(),
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
                product: None,
                created_at: now,
                updated_at: now,
            });
        }

        self.orders.write().await.push(order.clone());
        Ok(order)
    }

    async fn get_order_by_id(&self, id: Uuid, preload: bool) -> Result<Order, StoreError> {
        let found = self
            .orders
            .read()
            .await
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or_else(|| StoreError::order_not_found(id))?;

        if preload {
            Ok(self.with_products(found).await)
        } else {
            Ok(Order {
                lines: Vec::new(),
                ..found
            })
        }
    }

    async fn get_my_orders(
        &self,
        user_id: Uuid,
        query: &OrderQuery,
    ) -> Result<(Vec<Order>, Pagination), StoreError> {
        let mut matching: Vec<Order> = self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| o.user_id == user_id)
            .filter(|o| query.code.as_ref().map_or(true, |code| &o.code == code))
            .filter(|o| query.status.map_or(true, |status| o.status == status))
            .cloned()
            .collect();

        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.order_by);
            if query.order_desc {
                ordering.reverse()
            } else {
                ordering
            }
        });

        let pagination = Pagination::new(query.page, query.limit, matching.len() as i64);

        let mut page = Vec::new();
        for order in matching
            .into_iter()
            .skip(usize::try_from(pagination.skip).unwrap_or(usize::MAX))
            .take(pagination.limit as usize)
        {
            page.push(self.with_products(order).await);
        }

        Ok((page, pagination))
    }

    async fn update_order(&self, order: &mut Order) -> Result<(), StoreError> {
        let mut orders = self.orders.write().await;
        let stored = orders
            .iter_mut()
            .find(|o| o.id == order.id)
            .ok_or_else(|| StoreError::order_not_found(order.id))?;

        if stored.version != order.version {
            return Err(StoreError::VersionConflict {
                order_id: order.id,
                expected: order.version,
            });
        }

        stored.status = order.status;
        stored.version += 1;
        stored.updated_at = Utc::now();

        order.version = stored.version;
        order.updated_at = stored.updated_at;
        Ok(())
    }
}
