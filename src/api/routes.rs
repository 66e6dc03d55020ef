//! API Routes
//!
//! HTTP endpoint definitions for orders.

use std::fmt::Display;
use std::str::FromStr;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Extension, Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::{
    DomainError, Order, OrderLine, OrderQuery, OrderSortColumn, OrderStatus, Pagination,
    ProductSummary,
};
use crate::error::AppError;
use crate::service::{OrderLineRequest, PlaceOrderCommand};

use super::extractors::{extract_json, extract_query};
use super::middleware::AuthenticatedUser;
use super::AppState;

// =========================================================================
// Request types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceOrderLineRequest {
    pub product_id: String,
    pub quantity: i32,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub lines: Vec<PlaceOrderLineRequest>,
}

impl From<PlaceOrderRequest> for PlaceOrderCommand {
    fn from(request: PlaceOrderRequest) -> Self {
        PlaceOrderCommand::new(
            request
                .lines
                .into_iter()
                .map(|line| OrderLineRequest::new(line.product_id, line.quantity))
                .collect(),
        )
    }
}

/// Query string of `GET /orders`. Blank values bind to `None`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersParams {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub order_by: Option<OrderSortColumn>,
    #[serde(default)]
    pub order_desc: bool,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl From<ListOrdersParams> for OrderQuery {
    fn from(params: ListOrdersParams) -> Self {
        OrderQuery {
            code: params.code,
            status: params.status,
            order_by: params.order_by.unwrap_or_default(),
            order_desc: params.order_desc,
            page: params.page,
            limit: params.limit,
        }
    }
}

// =========================================================================
// Response types
// =========================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
}

impl From<ProductSummary> for ProductResponse {
    fn from(product: ProductSummary) -> Self {
        Self {
            id: product.id,
            code: product.code,
            name: product.name,
            description: product.description,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderLineResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductResponse>,
    pub quantity: i32,
    pub price: Decimal,
}

impl From<OrderLine> for OrderLineResponse {
    fn from(line: OrderLine) -> Self {
        Self {
            id: line.id,
            product_id: line.product_id,
            product: line.product.map(ProductResponse::from),
            quantity: line.quantity,
            price: line.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub code: String,
    pub user_id: Uuid,
    pub lines: Vec<OrderLineResponse>,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            code: order.code,
            user_id: order.user_id,
            lines: order.lines.into_iter().map(OrderLineResponse::from).collect(),
            total_price: order.total_price,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderResponse>,
    pub pagination: Pagination,
}

// =========================================================================
// API Router
// =========================================================================

/// Create the API router
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/orders", post(place_order).get(list_my_orders))
        .route("/orders/:order_id", get(get_order))
        .route("/orders/:order_id/cancel", put(cancel_order))
}

// =========================================================================
// POST /orders
// =========================================================================

/// Place an order for the authenticated user
async fn place_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<PlaceOrderRequest>, JsonRejection>,
) -> Result<Json<OrderResponse>, AppError> {
    let request = extract_json(body)?;

    let order = state
        .orders
        .place_order(user.user_id, request.into())
        .await?;

    Ok(Json(order.into()))
}

// =========================================================================
// GET /orders
// =========================================================================

/// List the authenticated user's orders
async fn list_my_orders(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    query: Result<Query<ListOrdersParams>, QueryRejection>,
) -> Result<Json<ListOrdersResponse>, AppError> {
    let query = OrderQuery::from(extract_query(query)?);
    let (orders, pagination) = state.orders.get_my_orders(user.user_id, &query).await?;

    Ok(Json(ListOrdersResponse {
        orders: orders.into_iter().map(OrderResponse::from).collect(),
        pagination,
    }))
}

// =========================================================================
// GET /orders/:order_id
// =========================================================================

/// Get one order; only its owner may read it
async fn get_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.get_order_by_id(order_id).await?;

    if !order.is_owned_by(user.user_id) {
        return Err(DomainError::PermissionDenied { order_id }.into());
    }

    Ok(Json(order.into()))
}

// =========================================================================
// PUT /orders/:order_id/cancel
// =========================================================================

/// Cancel one of the authenticated user's orders
async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<OrderResponse>, AppError> {
    let order = state.orders.cancel_order(order_id, user.user_id).await?;
    Ok(Json(order.into()))
}
