//! Order Service
//!
//! Enforces the business rules around an order's creation and mutation.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::catalog::{Product, ProductLookup};
use crate::domain::{DomainError, NewOrderLine, Order, OrderQuery, Pagination};
use crate::error::AppResult;
use crate::store::OrderStore;

use super::{OrderPolicy, PlaceOrderCommand};

/// Order Lifecycle Service
///
/// Collaborators are injected at construction; the service itself holds no
/// mutable state and is shared across requests.
#[derive(Clone)]
pub struct OrderService {
    store: Arc<dyn OrderStore>,
    catalog: Arc<dyn ProductLookup>,
    policy: OrderPolicy,
}

impl OrderService {
    pub fn new(
        store: Arc<dyn OrderStore>,
        catalog: Arc<dyn ProductLookup>,
        policy: OrderPolicy,
    ) -> Self {
        Self {
            store,
            catalog,
            policy,
        }
    }

    // =========================================================================
    // PlaceOrder
    // =========================================================================

    /// Validate, price and persist a new order.
    ///
    /// Every product is resolved before the store is touched, so a failed
    /// lookup leaves no trace.
    #[tracing::instrument(skip(self, command), fields(lines = command.lines.len()))]
    pub async fn place_order(&self, user_id: Uuid, command: PlaceOrderCommand) -> AppResult<Order> {
        let requested = command.validate(&self.policy)?;

        let mut products: HashMap<Uuid, Product> = HashMap::new();
        let mut lines = Vec::with_capacity(requested.len());

        for line in requested {
            if !products.contains_key(&line.product_id) {
                let product = self.resolve_product(line.product_id).await?;
                products.insert(line.product_id, product);
            }

            let unit_price = products[&line.product_id].price;
            lines.push(NewOrderLine::priced(line.product_id, line.quantity, unit_price));
        }

        let mut order = self.store.create_order(user_id, lines).await?;

        for line in &mut order.lines {
            line.product = products.get(&line.product_id).map(Product::summary);
        }

        tracing::info!(
            order_id = %order.id,
            code = %order.code,
            total_price = %order.total_price,
            "Order placed"
        );

        Ok(order)
    }

    async fn resolve_product(&self, id: Uuid) -> AppResult<Product> {
        match self.catalog.get_product_by_id(id).await {
            Ok(product) => Ok(product),
            Err(e) if e.is_not_found() => {
                tracing::debug!(product_id = %id, "Product lookup failed");
                Err(DomainError::ProductNotFound(id.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Load one order with its lines and their products.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_id(&self, id: Uuid) -> AppResult<Order> {
        Ok(self.store.get_order_by_id(id, true).await?)
    }

    /// One page of the user's orders matching `query`.
    #[tracing::instrument(skip(self))]
    pub async fn get_my_orders(
        &self,
        user_id: Uuid,
        query: &OrderQuery,
    ) -> AppResult<(Vec<Order>, Pagination)> {
        Ok(self.store.get_my_orders(user_id, query).await?)
    }

    // =========================================================================
    // CancelOrder
    // =========================================================================

    /// Cancel an order on behalf of its owner.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: Uuid, user_id: Uuid) -> AppResult<Order> {
        let mut order = self.store.get_order_by_id(order_id, false).await?;

        if !order.is_owned_by(user_id) {
            tracing::warn!(order_id = %order_id, "Cancellation by non-owner rejected");
            return Err(DomainError::PermissionDenied { order_id }.into());
        }

        let previous = order.status;
        order.cancel()?;

        self.store.update_order(&mut order).await?;

        tracing::info!(
            order_id = %order.id,
            from = %previous,
            "Order cancelled"
        );

        Ok(order)
    }
}
