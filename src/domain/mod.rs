//! Domain module
//!
//! Order aggregate, status machine, listing query and pagination.
//! Pure types with no infrastructure dependencies.

mod error;
mod order;
mod pagination;
mod query;

pub use error::DomainError;
pub use order::{
    generate_order_code, NewOrderLine, Order, OrderLine, OrderStatus, ProductSummary,
    UnknownStatus, ORDER_CODE_PREFIX,
};
pub use pagination::{Pagination, DEFAULT_PAGE_SIZE};
pub use query::{OrderQuery, OrderSortColumn};
