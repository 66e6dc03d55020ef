//! Page descriptor for filtered listings.

use serde::{Deserialize, Serialize};

/// Page size used when the caller asks for none, or for more than this
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// One page of a filtered listing.
///
/// Built by [`Pagination::new`], which sanitizes its inputs instead of
/// rejecting them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: i64,
    pub total: i64,
    pub total_page: i64,
    pub limit: i64,
    pub skip: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let limit = if limit <= 0 || limit > DEFAULT_PAGE_SIZE {
            DEFAULT_PAGE_SIZE
        } else {
            limit
        };

        let total = total.max(0);
        let total_page = total / limit + i64::from(total % limit != 0);

        let current_page = if page < 1 || total_page == 0 { 1 } else { page };

        // Pages past the end yield an empty page; skip saturates instead of wrapping
        Self {
            current_page,
            total,
            total_page,
            limit,
            skip: (current_page - 1).saturating_mul(limit),
        }
    }
}
