//! Catalog service - product queries, mutations and stats.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    check_limit, parse_product_id, AdminRef, CatalogStats, NewProduct, PageRequest, Product,
    ProductCategory, ProductChanges, ProductFilter, ProductResponse,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::Paginated;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Catalog service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Filtered, sorted, paginated listing
    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> AppResult<Paginated<ProductResponse>>;

    /// Single product. Counts a view without waiting for the write.
    async fn get_one(&self, id: &str) -> AppResult<ProductResponse>;

    async fn list_by_category(
        &self,
        category: ProductCategory,
        limit: u64,
    ) -> AppResult<Vec<ProductResponse>>;

    async fn list_by_artist(&self, artist: String, limit: u64) -> AppResult<Vec<ProductResponse>>;

    async fn list_by_origin(&self, origin: String, limit: u64) -> AppResult<Vec<ProductResponse>>;

    async fn list_featured(&self, limit: u64) -> AppResult<Vec<ProductResponse>>;

    async fn create(&self, input: NewProduct, admin_id: Uuid) -> AppResult<ProductResponse>;

    /// Apply only the submitted fields
    async fn update(
        &self,
        id: &str,
        changes: ProductChanges,
        admin_id: Uuid,
    ) -> AppResult<ProductResponse>;

    async fn remove(&self, id: &str) -> AppResult<()>;

    /// Add `delta` (may be negative) to the stock
    async fn adjust_stock(&self, id: &str, delta: i32) -> AppResult<ProductResponse>;

    async fn stats(&self) -> AppResult<CatalogStats>;
}

/// Concrete implementation of CatalogService using Unit of Work.
pub struct CatalogManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CatalogManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Attach `{id, email}` projections for the admins a page references.
    async fn with_admin_refs(&self, products: Vec<Product>) -> AppResult<Vec<ProductResponse>> {
        let ids: Vec<Uuid> = products
            .iter()
            .flat_map(|p| std::iter::once(p.added_by).chain(p.last_modified_by))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();

        let refs: HashMap<Uuid, AdminRef> = self
            .uow
            .admins()
            .find_refs(&ids)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let lookup = |id: Uuid| refs.get(&id).cloned().unwrap_or_else(|| AdminRef::unresolved(id));

        Ok(products
            .into_iter()
            .map(|p| {
                let added_by = lookup(p.added_by);
                let last_modified_by = p.last_modified_by.map(lookup);
                ProductResponse::new(p, added_by, last_modified_by)
            })
            .collect())
    }

    async fn with_admin_ref(&self, product: Product) -> AppResult<ProductResponse> {
        self.with_admin_refs(vec![product])
            .await?
            .pop()
            .ok_or_else(|| AppError::internal("admin reference resolution dropped a product"))
    }

    async fn shortlist(&self, filter: ProductFilter, limit: u64) -> AppResult<Vec<ProductResponse>> {
        let limit = check_limit(limit)?;
        let products = self
            .uow
            .products()
            .find_recent(&filter.normalized(), limit)
            .await?;
        self.with_admin_refs(products).await
    }
}

#[async_trait]
impl<U: UnitOfWork + 'static> CatalogService for CatalogManager<U> {
    async fn list(
        &self,
        filter: ProductFilter,
        page: PageRequest,
    ) -> AppResult<Paginated<ProductResponse>> {
        let filter = filter.normalized();
        let (products, total) = self.uow.products().find_page(&filter, page).await?;
        let items = self.with_admin_refs(products).await?;
        Ok(Paginated::new(items, page, total))
    }

    async fn get_one(&self, id: &str) -> AppResult<ProductResponse> {
        let id = parse_product_id(id)?;
        let products = self.uow.products();
        let product = products.find_by_id(id).await?.ok_or_not_found("Product")?;

        // Fire and forget: the response keeps the pre-increment count
        tokio::spawn(async move {
            if let Err(e) = products.increment_views(id).await {
                tracing::warn!(product_id = %id, error = %e, "View count increment failed");
            }
        });

        self.with_admin_ref(product).await
    }

    async fn list_by_category(
        &self,
        category: ProductCategory,
        limit: u64,
    ) -> AppResult<Vec<ProductResponse>> {
        self.shortlist(ProductFilter::by_category(category), limit).await
    }

    async fn list_by_artist(&self, artist: String, limit: u64) -> AppResult<Vec<ProductResponse>> {
        self.shortlist(ProductFilter::by_artist(artist), limit).await
    }

    async fn list_by_origin(&self, origin: String, limit: u64) -> AppResult<Vec<ProductResponse>> {
        self.shortlist(ProductFilter::by_origin(origin), limit).await
    }

    async fn list_featured(&self, limit: u64) -> AppResult<Vec<ProductResponse>> {
        self.shortlist(ProductFilter::featured(), limit).await
    }

    async fn create(&self, input: NewProduct, admin_id: Uuid) -> AppResult<ProductResponse> {
        let product = Product::create(input, admin_id)?;
        let product = self.uow.products().insert(&product).await?;
        tracing::info!(product_id = %product.id, admin_id = %admin_id, "Product created");
        self.with_admin_ref(product).await
    }

    async fn update(
        &self,
        id: &str,
        changes: ProductChanges,
        admin_id: Uuid,
    ) -> AppResult<ProductResponse> {
        let id = parse_product_id(id)?;
        let products = self.uow.products();
        let mut merged = products.find_by_id(id).await?.ok_or_not_found("Product")?;

        // Validate the merged record; the write itself only touches submitted columns
        merged.apply(changes.clone(), admin_id);
        merged.check_invariants()?;

        let product = products
            .update(id, &changes, admin_id)
            .await?
            .ok_or_not_found("Product")?;
        tracing::info!(product_id = %id, admin_id = %admin_id, "Product updated");
        self.with_admin_ref(product).await
    }

    async fn remove(&self, id: &str) -> AppResult<()> {
        let id = parse_product_id(id)?;
        if !self.uow.products().delete(id).await? {
            return Err(AppError::not_found("Product"));
        }
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    async fn adjust_stock(&self, id: &str, delta: i32) -> AppResult<ProductResponse> {
        let id = parse_product_id(id)?;
        let products = self.uow.products();

        match products.adjust_stock(id, delta).await? {
            Some(product) => self.with_admin_ref(product).await,
            None => {
                // Nothing matched: either the product is gone or the bound check refused
                let current = products.find_by_id(id).await?.ok_or_not_found("Product")?;
                Err(stock_refusal(current.stock, delta))
            }
        }
    }

    async fn stats(&self) -> AppResult<CatalogStats> {
        self.uow.products().stats().await
    }
}

fn stock_refusal(stock: i32, delta: i32) -> AppError {
    if i64::from(stock) + i64::from(delta) < 0 {
        AppError::validation(format!(
            "Insufficient stock: {} available, adjustment {}",
            stock, delta
        ))
    } else {
        AppError::validation(format!(
            "Stock cannot exceed {}: {} available, adjustment {}",
            i32::MAX,
            stock,
            delta
        ))
    }
}
