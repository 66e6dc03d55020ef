//! Order Lifecycle Service module
//!
//! Orchestrates placement, retrieval, listing and cancellation of orders.
//! Business rules live here; the store only persists.

mod commands;
mod order_service;


pub use commands::*;
pub use order_service::OrderService;
