//! shop_orders Library
//!
//! Re-exports modules for integration testing and external use.

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod domain;
mod error;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorResponse};
pub use domain::{DomainError, Order, OrderStatus};
