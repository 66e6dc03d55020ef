//! Common test utilities
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;

use shop_orders::api::{self, AppState, USER_ID_HEADER};
use shop_orders::catalog::{InMemoryProductCatalog, Product};
use shop_orders::db;
use shop_orders::service::{OrderPolicy, OrderService};
use shop_orders::store::InMemoryOrderStore;

/// Application wired to in-memory collaborators
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryOrderStore,
    pub catalog: InMemoryProductCatalog,
    pub product_a: Product,
    pub product_b: Product,
}

/// Build the full router over an in-memory store seeded with two products
pub async fn in_memory_app() -> TestApp {
    let catalog = InMemoryProductCatalog::new();
    let product_a = Product::new("P-A", "Product A", dec!(10.0));
    let product_b = Product::new("P-B", "Product B", dec!(5.0));
    catalog.insert(product_a.clone()).await;
    catalog.insert(product_b.clone()).await;

    let store = InMemoryOrderStore::new().with_catalog(catalog.clone());
    let service = OrderService::new(
        Arc::new(store.clone()),
        Arc::new(catalog.clone()),
        OrderPolicy::default(),
    );

    TestApp {
        router: api::build_router(AppState::new(service)),
        store,
        catalog,
        product_a,
        product_b,
    }
}

/// Send a request, optionally as `user`, and decode the JSON body
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<uuid::Uuid>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user {
        builder = builder.header(USER_ID_HEADER, user_id.to_string());
    }

    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Setup test database - apply the schema and truncate tables
pub async fn setup_test_db() -> PgPool {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to DB");

    db::apply_schema(&pool).await.expect("Failed to apply schema");

    sqlx::query("TRUNCATE TABLE order_lines, orders, products CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to clean up DB");

    pool
}

/// Insert a product row
pub async fn seed_product(pool: &PgPool, product: &Product) {
    sqlx::query(
        r#"
        INSERT INTO products (id, code, name, description, price)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(product.id)
    .bind(&product.code)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .execute(pool)
    .await
    .expect("Failed to seed product");
}
