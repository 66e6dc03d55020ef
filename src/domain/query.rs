//! Listing filters for "my orders".

use serde::{Deserialize, Serialize};

use super::OrderStatus;

/// Columns a listing may be ordered by.
///
/// A closed set: caller input never reaches SQL as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderSortColumn {
    #[default]
    CreatedAt,
    UpdatedAt,
    Code,
    Status,
    TotalPrice,
}

impl OrderSortColumn {
    pub fn column_name(&self) -> &'static str {
        match self {
            OrderSortColumn::CreatedAt => "created_at",
            OrderSortColumn::UpdatedAt => "updated_at",
            OrderSortColumn::Code => "code",
            OrderSortColumn::Status => "status",
            OrderSortColumn::TotalPrice => "total_price",
        }
    }
}

impl std::str::FromStr for OrderSortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(OrderSortColumn::CreatedAt),
            "updated_at" => Ok(OrderSortColumn::UpdatedAt),
            "code" => Ok(OrderSortColumn::Code),
            "status" => Ok(OrderSortColumn::Status),
            "total_price" => Ok(OrderSortColumn::TotalPrice),
            other => Err(format!("Unknown sort column: {}", other)),
        }
    }
}

/// Filters, ordering and page request for a user's orders.
/// The owning user is passed separately and always applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderQuery {
    pub code: Option<String>,
    pub status: Option<OrderStatus>,
    pub order_by: OrderSortColumn,
    pub order_desc: bool,
    pub page: i64,
    pub limit: i64,
}

impl OrderQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn ordered_by(mut self, column: OrderSortColumn, desc: bool) -> Self {
        self.order_by = column;
        self.order_desc = desc;
        self
    }

    pub fn page(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }
}
