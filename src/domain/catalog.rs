//! Catalog query model: filters, sorting, paging and aggregate stats.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ProductCategory, ProductCondition, ProductStatus};
use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::errors::{AppError, AppResult};

/// Column a listing can be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Price,
    Name,
    #[serde(alias = "rating")]
    AverageRating,
    ViewCount,
    Stock,
    YearCreated,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" => Ok(SortField::CreatedAt),
            "updatedAt" => Ok(SortField::UpdatedAt),
            "price" => Ok(SortField::Price),
            "name" => Ok(SortField::Name),
            "averageRating" | "rating" => Ok(SortField::AverageRating),
            "viewCount" => Ok(SortField::ViewCount),
            "stock" => Ok(SortField::Stock),
            "yearCreated" => Ok(SortField::YearCreated),
            other => Err(AppError::validation(format!("Cannot sort by '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// 1-based page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    /// Build a page window, rejecting out-of-range values.
    pub fn new(page: u64, limit: u64) -> AppResult<Self> {
        if page < 1 {
            return Err(AppError::validation("page must be at least 1"));
        }
        check_limit(limit)?;
        Ok(Self { page, limit })
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE_NUMBER,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Validate a result cap for list endpoints.
pub fn check_limit(limit: u64) -> AppResult<u64> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(AppError::validation(format!(
            "limit must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(limit)
}

/// Product filter; every set field narrows the result (logical AND)
#[derive(Debug, Clone, PartialEq)]
pub struct ProductFilter {
    pub status: ProductStatus,
    pub search: Option<String>,
    pub category: Option<ProductCategory>,
    pub origin: Option<String>,
    pub artist: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub condition: Option<ProductCondition>,
    pub is_featured: Option<bool>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            status: ProductStatus::Active,
            search: None,
            category: None,
            origin: None,
            artist: None,
            min_price: None,
            max_price: None,
            condition: None,
            is_featured: None,
            sort_by: SortField::CreatedAt,
            sort_order: SortOrder::Desc,
        }
    }
}

impl ProductFilter {
    pub fn by_category(category: ProductCategory) -> Self {
        Self {
            category: Some(category),
            ..Self::default()
        }
    }

    pub fn by_artist(artist: impl Into<String>) -> Self {
        Self {
            artist: Some(artist.into()),
            ..Self::default()
        }
    }

    pub fn by_origin(origin: impl Into<String>) -> Self {
        Self {
            origin: Some(origin.into()),
            ..Self::default()
        }
    }

    pub fn featured() -> Self {
        Self {
            is_featured: Some(true),
            ..Self::default()
        }
    }

    /// Drop blank text terms so they never narrow the result.
    pub fn normalized(mut self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        self.search = keep(self.search);
        self.origin = keep(self.origin);
        self.artist = keep(self.artist);
        self
    }
}

/// Per-category product count
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

/// Catalog-wide summary numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total_products: u64,
    pub active_products: u64,
    pub total_value: f64,
    /// Mean product price
    pub average: f64,
    pub total_stock: i64,
    pub category_stats: Vec<CategoryCount>,
}
