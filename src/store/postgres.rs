//! PostgreSQL Order Store
//!
//! Orders live in `orders`, their lines in `order_lines`. Rows with
//! `deleted_at` set are invisible to every query here.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::domain::{
    generate_order_code, NewOrderLine, Order, OrderLine, OrderQuery, OrderStatus, Pagination,
    ProductSummary,
};

use super::{bounded, OrderStore, StoreError, DEFAULT_STORE_TIMEOUT};

const ORDER_COLUMNS: &str =
    "id, code, user_id, total_price, status, version, created_at, updated_at";

/// Row of the `orders` table
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    code: String,
    user_id: Uuid,
    total_price: Decimal,
    status: String,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| StoreError::InvalidRow(format!("order {}: {}", row.id, e)))?;

        Ok(Order {
            id: row.id,
            code: row.code,
            user_id: row.user_id,
            lines: Vec::new(),
            total_price: row.total_price,
            status,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Row of `order_lines` joined with its product
#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    price: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    product_code: Option<String>,
    product_name: Option<String>,
    product_description: Option<String>,
}

impl From<LineRow> for OrderLine {
    fn from(row: LineRow) -> Self {
        let product = match (row.product_code, row.product_name) {
            (Some(code), Some(name)) => Some(ProductSummary {
                id: row.product_id,
                code,
                name,
                description: row.product_description.unwrap_or_default(),
            }),
            _ => None,
        };

        OrderLine {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            quantity: row.quantity,
            price: row.price,
            product,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Order Store backed by PostgreSQL
#[derive(Debug, Clone)]
pub struct PgOrderStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgOrderStore {
    /// Create a new PgOrderStore with a database pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    /// Override the per-call time budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    // =========================================================================
    // Create
    // =========================================================================

    async fn insert_aggregate(
        &self,
        user_id: Uuid,
        lines: Vec<NewOrderLine>,
    ) -> Result<Order, StoreError> {
        let order_id = Uuid::new_v4();
        let code = generate_order_code(Utc::now());
        let total_price = Order::total_of(&lines);

        // Dropping `tx` before commit rolls everything back
        let mut tx = self.pool.begin().await?;

        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO orders (id, code, user_id, total_price, status, version)
            VALUES ($1, $2, $3, $4, $5, 1)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order_id)
        .bind(&code)
        .bind(user_id)
        .bind(total_price)
        .bind(OrderStatus::New.as_str())
        .fetch_one(&mut *tx)
        .await?;

        let mut order = Order::try_from(row)?;

        for (position, line) in lines.into_iter().enumerate() {
            let line_id = Uuid::new_v4();

            let (created_at, updated_at): (DateTime<Utc>, DateTime<Utc>) = sqlx::query_as(
                r#"
                INSERT INTO order_lines (id, order_id, product_id, position, quantity, price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING created_at, updated_at
                "#,
            )
            .bind(line_id)
            .bind(order_id)
            .bind(line.product_id)
            .bind(position as i32)
            .bind(line.quantity)
            .bind(line.price)
            .fetch_one(&mut *tx)
            .await?;

            order.lines.push(OrderLine {
                id: line_id,
                order_id,
                product_id: line.product_id,
                quantity: line.quantity,
                price: line.price,
                product: None,
                created_at,
                updated_at,
            });
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %order.id,
            code = %order.code,
            user_id = %user_id,
            lines = order.lines.len(),
            total_price = %order.total_price,
            "Order persisted"
        );

        Ok(order)
    }

    // =========================================================================
    // Read
    // =========================================================================

    async fn fetch_order(&self, id: Uuid, preload: bool) -> Result<Order, StoreError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS}
            FROM orders
            WHERE id = $1 AND deleted_at IS NULL
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let mut order = Order::try_from(row.ok_or_else(|| StoreError::order_not_found(id))?)?;

        if preload {
            let mut lines = self.load_lines(&[order.id]).await?;
            order.lines = lines.remove(&order.id).unwrap_or_default();
        }

        Ok(order)
    }

    /// Lines of the given orders with product fields, grouped by order
    async fn load_lines(
        &self,
        order_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<OrderLine>>, StoreError> {
        if order_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT
                l.id, l.order_id, l.product_id, l.quantity, l.price,
                l.created_at, l.updated_at,
                p.code AS product_code,
                p.name AS product_name,
                p.description AS product_description
            FROM order_lines l
            LEFT JOIN products p ON p.id = l.product_id
            WHERE l.order_id = ANY($1) AND l.deleted_at IS NULL
            ORDER BY l.order_id, l.position ASC
            "#,
        )
        .bind(order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            grouped.entry(row.order_id).or_default().push(row.into());
        }

        Ok(grouped)
    }

    async fn list_orders(
        &self,
        user_id: Uuid,
        query: &OrderQuery,
    ) -> Result<(Vec<Order>, Pagination), StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_filters(&mut count, user_id, query);

        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let pagination = Pagination::new(query.page, query.limit, total);

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        push_filters(&mut select, user_id, query);
        select
            .push(" ORDER BY ")
            .push(query.order_by.column_name())
            .push(if query.order_desc { " DESC" } else { " ASC" })
            .push(", id ASC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.skip);

        let rows: Vec<OrderRow> = select.build_query_as().fetch_all(&self.pool).await?;

        let mut orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
        let mut lines = self.load_lines(&ids).await?;
        for order in &mut orders {
            order.lines = lines.remove(&order.id).unwrap_or_default();
        }

        Ok((orders, pagination))
    }

    // =========================================================================
    // Update
    // =========================================================================

    async fn write_status(&self, order: &mut Order) -> Result<(), StoreError> {
        let updated: Option<(i64, DateTime<Utc>)> = sqlx::query_as(
            r#"
            UPDATE orders
            SET status = $2, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $3 AND deleted_at IS NULL
            RETURNING version, updated_at
            "#,
        )
        .bind(order.id)
        .bind(order.status.as_str())
        .bind(order.version)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some((version, updated_at)) => {
                order.version = version;
                order.updated_at = updated_at;
                Ok(())
            }
            None => {
                let exists: bool = sqlx::query_scalar(
                    "SELECT EXISTS (SELECT 1 FROM orders WHERE id = $1 AND deleted_at IS NULL)",
                )
                .bind(order.id)
                .fetch_one(&self.pool)
                .await?;

                if exists {
                    Err(StoreError::VersionConflict {
                        order_id: order.id,
                        expected: order.version,
                    })
                } else {
                    Err(StoreError::order_not_found(order.id))
                }
            }
        }
    }
}

/// Shared WHERE clause of the listing and its count query
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, user_id: Uuid, query: &OrderQuery) {
    builder
        .push(" WHERE deleted_at IS NULL AND user_id = ")
        .push_bind(user_id);

    if let Some(code) = &query.code {
        builder.push(" AND code = ").push_bind(code.clone());
    }
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.as_str());
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create_order(
        &self,
        user_id: Uuid,
        lines: Vec<NewOrderLine>,
    ) -> Result<Order, StoreError> {
        bounded(self.timeout, self.insert_aggregate(user_id, lines)).await
    }

    async fn get_order_by_id(&self, id: Uuid, preload: bool) -> Result<Order, StoreError> {
        bounded(self.timeout, self.fetch_order(id, preload)).await
    }

    async fn get_my_orders(
        &self,
        user_id: Uuid,
        query: &OrderQuery,
    ) -> Result<(Vec<Order>, Pagination), StoreError> {
        bounded(self.timeout, self.list_orders(user_id, query)).await
    }

    async fn update_order(&self, order: &mut Order) -> Result<(), StoreError> {
        bounded(self.timeout, self.write_status(order)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderSortColumn;

    #[test]
    fn test_order_row_conversion() {
        let now = Utc::now();
        let row = OrderRow {
            id: Uuid::new_v4(),
            code: "SO20240101ABCDEF".to_string(),
            user_id: Uuid::new_v4(),
            total_price: Decimal::new(2500, 2),
            status: "in_progress".to_string(),
            version: 2,
            created_at: now,
            updated_at: now,
        };

        let order = Order::try_from(row).unwrap();
        assert_eq!(order.status, OrderStatus::InProgress);
        assert_eq!(order.version, 2);
        assert!(order.lines.is_empty());
    }

    #[test]
    fn test_order_row_with_unknown_status_is_rejected() {
        let now = Utc::now();
        let row = OrderRow {
            id: Uuid::new_v4(),
            code: "SO20240101ABCDEF".to_string(),
            user_id: Uuid::new_v4(),
            total_price: Decimal::ZERO,
            status: "shipped".to_string(),
            version: 1,
            created_at: now,
            updated_at: now,
        };

        assert!(matches!(Order::try_from(row), Err(StoreError::InvalidRow(_))));
    }

    #[test]
    fn test_line_row_without_product_has_no_summary() {
        let now = Utc::now();
        let row = LineRow {
            id: Uuid::new_v4(),
            order_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 1,
            price: Decimal::ONE,
            created_at: now,
            updated_at: now,
            product_code: None,
            product_name: None,
            product_description: None,
        };

        let line = OrderLine::from(row);
        assert!(line.product.is_none());
    }

    #[test]
    fn test_listing_sql_shape() {
        let query = OrderQuery::new()
            .with_code("SO1")
            .with_status(OrderStatus::New)
            .ordered_by(OrderSortColumn::TotalPrice, true);

        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM orders");
        push_filters(&mut builder, Uuid::new_v4(), &query);

        assert_eq!(
            builder.sql(),
            "SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL AND user_id = $1 AND code = $2 AND status = $3"
        );
    }
}
