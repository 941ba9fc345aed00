//! Pagination envelope for list endpoints.

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{PageRequest, ProductResponse};

/// Paginated response wrapper (reusable for all list responses)
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[aliases(ProductPage = Paginated<ProductResponse>)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

impl<T> Paginated<T> {
    /// Create new paginated response
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        let limit = request.limit();
        let pages = if limit > 0 { total.div_ceil(limit) } else { 0 };

        Self {
            items,
            pagination: PaginationMeta {
                total,
                page: request.page(),
                limit,
                pages,
            },
        }
    }

    /// Convert the items while keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
