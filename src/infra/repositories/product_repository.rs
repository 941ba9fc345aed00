//! Product repository implementation.
//!
//! Stock adjustment and view counting are single SQL statements so
//! concurrent requests never lose updates.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QuerySelect,
};
use uuid::Uuid;

use super::entities::product::{ActiveModel, Column, Entity as ProductEntity, Model};
use super::product_query::{
    catalog_totals, category_counts, partial_update, stock_adjustment, ProductQueryBuilder,
};
use crate::domain::{
    CatalogStats, CategoryCount, PageRequest, Product, ProductChanges, ProductFilter,
};
use crate::errors::AppResult;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Product repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn insert(&self, product: &Product) -> AppResult<Product>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>>;

    /// One page of matches plus the total match count
    async fn find_page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Product>, u64)>;

    /// First `limit` matches in filter order
    async fn find_recent(&self, filter: &ProductFilter, limit: u64) -> AppResult<Vec<Product>>;

    /// Write only the submitted fields and the audit columns.
    /// `None` when the product is missing.
    async fn update(
        &self,
        id: Uuid,
        changes: &ProductChanges,
        modified_by: Uuid,
    ) -> AppResult<Option<Product>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Atomically add `delta` to the stock and apply the status rule.
    /// `None` when the product is missing or the stock would leave
    /// `0..=i32::MAX`.
    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<Option<Product>>;

    async fn increment_views(&self, id: Uuid) -> AppResult<()>;

    async fn stats(&self) -> AppResult<CatalogStats>;
}

/// SeaORM-backed product repository
pub struct ProductStore {
    db: DatabaseConnection,
}

impl ProductStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct TotalsRow {
    total_products: i64,
    active_products: i64,
    total_value: Option<f64>,
    average_price: Option<f64>,
    total_stock: Option<i64>,
}

#[derive(Debug, FromQueryResult)]
struct CategoryRow {
    category: String,
    count: i64,
}

fn to_products(models: Vec<Model>) -> AppResult<Vec<Product>> {
    models.into_iter().map(Product::try_from).collect()
}

fn first_product(models: Vec<Model>) -> AppResult<Option<Product>> {
    models.into_iter().next().map(Product::try_from).transpose()
}

#[async_trait]
impl ProductRepository for ProductStore {
    async fn insert(&self, product: &Product) -> AppResult<Product> {
        let model = ActiveModel::from_product(product)?.insert(&self.db).await?;
        Product::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Product>> {
        let result = ProductEntity::find_by_id(id).one(&self.db).await?;
        result.map(Product::try_from).transpose()
    }

    async fn find_page(
        &self,
        filter: &ProductFilter,
        page: PageRequest,
    ) -> AppResult<(Vec<Product>, u64)> {
        let builder = ProductQueryBuilder::new(filter);

        let items = builder
            .select()
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db);
        let total = ProductEntity::find()
            .filter(builder.condition())
            .count(&self.db);

        let (models, total) = tokio::try_join!(items, total)?;
        Ok((to_products(models)?, total))
    }

    async fn find_recent(&self, filter: &ProductFilter, limit: u64) -> AppResult<Vec<Product>> {
        let models = ProductQueryBuilder::new(filter)
            .select()
            .limit(limit)
            .all(&self.db)
            .await?;
        to_products(models)
    }

    async fn update(
        &self,
        id: Uuid,
        changes: &ProductChanges,
        modified_by: Uuid,
    ) -> AppResult<Option<Product>> {
        let updated = partial_update(id, changes, modified_by)?
            .exec_with_returning(&self.db)
            .await?;
        first_product(updated)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = ProductEntity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> AppResult<Option<Product>> {
        let updated = stock_adjustment(id, delta)
            .exec_with_returning(&self.db)
            .await?;
        first_product(updated)
    }

    async fn increment_views(&self, id: Uuid) -> AppResult<()> {
        ProductEntity::update_many()
            .col_expr(Column::ViewCount, Expr::col(Column::ViewCount).add(1))
            .filter(Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn stats(&self) -> AppResult<CatalogStats> {
        let totals = catalog_totals().into_model::<TotalsRow>().one(&self.db);
        let categories = category_counts().into_model::<CategoryRow>().all(&self.db);

        let (totals, categories) = tokio::try_join!(totals, categories)?;

        let mut stats = CatalogStats {
            category_stats: categories
                .into_iter()
                .map(|row| CategoryCount {
                    category: row.category,
                    count: row.count.max(0) as u64,
                })
                .collect(),
            ..CatalogStats::default()
        };

        if let Some(totals) = totals {
            stats.total_products = totals.total_products.max(0) as u64;
            stats.active_products = totals.active_products.max(0) as u64;
            stats.total_value = totals.total_value.unwrap_or(0.0);
            stats.average = totals.average_price.unwrap_or(0.0);
            stats.total_stock = totals.total_stock.unwrap_or(0);
        }

        Ok(stats)
    }
}
