//! API module
//!
//! HTTP API endpoints and middleware.

pub mod extractors;
pub mod middleware;
pub mod routes;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::service::OrderService;

pub use middleware::{AuthenticatedUser, CORRELATION_ID_HEADER, USER_ID_HEADER};
pub use routes::create_router;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orders: OrderService,
}

impl AppState {
    pub fn new(orders: OrderService) -> Self {
        Self { orders }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    // Layers run last-added first: logging -> auth -> handler
    let protected_routes = create_router()
        .layer(axum::middleware::from_fn(middleware::auth_middleware))
        .layer(axum::middleware::from_fn(middleware::logging_middleware));

    Router::new()
        // Health check (no auth)
        .route("/health", get(health_check))
        .nest("/api/v1", protected_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
