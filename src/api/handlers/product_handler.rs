//! Product catalog handlers.

use axum::{
    extract::{Path, State},
    middleware,
    response::Json,
    routing::{get, patch, post},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::api::extractors::{ValidatedJson, ValidatedQuery};
use crate::api::middleware::{access_guard, Guarded, ADMIN_ONLY};
use crate::api::AppState;
use crate::config::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE, DEFAULT_SHORTLIST_SIZE};
use crate::domain::{
    CatalogStats, NewProduct, PageRequest, Principal, ProductCategory, ProductChanges,
    ProductCondition, ProductFilter, ProductResponse, ProductStatus, SortField, SortOrder,
};
use crate::errors::AppResult;
use crate::types::{Created, NoContent, Paginated, ProductPage};

/// Listing query string
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// 1-based page number (default 1)
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: Option<u64>,
    /// Page size, 1 to 100 (default 20)
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u64>,
    /// Full-text search over name, description and tags
    pub search: Option<String>,
    pub category: Option<ProductCategory>,
    /// Case-insensitive substring
    pub origin: Option<String>,
    /// Case-insensitive substring
    pub artist: Option<String>,
    #[validate(range(min = 0.0, message = "minPrice cannot be negative"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "maxPrice cannot be negative"))]
    pub max_price: Option<f64>,
    pub condition: Option<ProductCondition>,
    pub is_featured: Option<bool>,
    /// Defaults to active
    pub status: Option<ProductStatus>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    fn into_parts(self) -> AppResult<(ProductFilter, PageRequest)> {
        let page = PageRequest::new(
            self.page.unwrap_or(DEFAULT_PAGE_NUMBER),
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;
        let filter = ProductFilter {
            status: self.status.unwrap_or_default(),
            search: self.search,
            category: self.category,
            origin: self.origin,
            artist: self.artist,
            min_price: self.min_price,
            max_price: self.max_price,
            condition: self.condition,
            is_featured: self.is_featured,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        };
        Ok((filter, page))
    }
}

/// Result cap for the shortlist endpoints
#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ShortlistQuery {
    /// 1 to 100 (default 10)
    #[validate(range(min = 1, max = 100, message = "limit must be between 1 and 100"))]
    pub limit: Option<u64>,
}

impl ShortlistQuery {
    fn limit(&self) -> u64 {
        self.limit.unwrap_or(DEFAULT_SHORTLIST_SIZE)
    }
}

/// Stock delta; negative values remove units
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct StockAdjustment {
    #[schema(example = -2)]
    pub quantity: i32,
}

/// Create product routes
pub fn product_routes(state: &AppState) -> Router<AppState> {
    let admin = || middleware::from_fn_with_state(Guarded::new(state, ADMIN_ONLY), access_guard);

    Router::new()
        .route(
            "/",
            get(list_products).merge(post(create_product).route_layer(admin())),
        )
        .route("/featured", get(list_featured))
        .route("/category/:category", get(list_by_category))
        .route("/artist/:artist", get(list_by_artist))
        .route("/origin/:origin", get(list_by_origin))
        .route("/admin/stats", get(catalog_stats).route_layer(admin()))
        .route(
            "/:id",
            get(get_product).merge(
                patch(update_product)
                    .delete(delete_product)
                    .route_layer(admin()),
            ),
        )
        .route("/:id/stock", patch(adjust_stock).route_layer(admin()))
}

/// List products
#[utoipa::path(
    get,
    path = "/products",
    tag = "Products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Page of products", body = ProductPage),
        (status = 400, description = "Invalid query")
    )
)]
pub async fn list_products(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ProductQuery>,
) -> AppResult<Json<Paginated<ProductResponse>>> {
    let (filter, page) = query.into_parts()?;
    let products = state.catalog_service.list(filter, page).await?;

    Ok(Json(products))
}

/// Featured products
#[utoipa::path(
    get,
    path = "/products/featured",
    tag = "Products",
    params(ShortlistQuery),
    responses((status = 200, description = "Featured products", body = [ProductResponse]))
)]
pub async fn list_featured(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<ShortlistQuery>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state.catalog_service.list_featured(query.limit()).await?;
    Ok(Json(products))
}

/// Products in a category
#[utoipa::path(
    get,
    path = "/products/category/{category}",
    tag = "Products",
    params(("category" = ProductCategory, Path, description = "Category name"), ShortlistQuery),
    responses(
        (status = 200, description = "Products in the category", body = [ProductResponse]),
        (status = 400, description = "Unknown category")
    )
)]
pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ShortlistQuery>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let category: ProductCategory = category.parse()?;
    let products = state
        .catalog_service
        .list_by_category(category, query.limit())
        .await?;

    Ok(Json(products))
}

/// Products by an artist
#[utoipa::path(
    get,
    path = "/products/artist/{artist}",
    tag = "Products",
    params(("artist" = String, Path, description = "Artist name substring"), ShortlistQuery),
    responses((status = 200, description = "Products by the artist", body = [ProductResponse]))
)]
pub async fn list_by_artist(
    State(state): State<AppState>,
    Path(artist): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ShortlistQuery>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state
        .catalog_service
        .list_by_artist(artist, query.limit())
        .await?;

    Ok(Json(products))
}

/// Products from an origin
#[utoipa::path(
    get,
    path = "/products/origin/{origin}",
    tag = "Products",
    params(("origin" = String, Path, description = "Origin substring"), ShortlistQuery),
    responses((status = 200, description = "Products from the origin", body = [ProductResponse]))
)]
pub async fn list_by_origin(
    State(state): State<AppState>,
    Path(origin): Path<String>,
    ValidatedQuery(query): ValidatedQuery<ShortlistQuery>,
) -> AppResult<Json<Vec<ProductResponse>>> {
    let products = state
        .catalog_service
        .list_by_origin(origin, query.limit())
        .await?;

    Ok(Json(products))
}

/// Get a product by ID
#[utoipa::path(
    get,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "Product not found")
    )
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ProductResponse>> {
    let product = state.catalog_service.get_one(&id).await?;
    Ok(Json(product))
}

/// Create a product (admin only)
#[utoipa::path(
    post,
    path = "/products",
    tag = "Products",
    request_body = NewProduct,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ValidatedJson(payload): ValidatedJson<NewProduct>,
) -> AppResult<Created<ProductResponse>> {
    let product = state
        .catalog_service
        .create(payload, principal.subject_id)
        .await?;

    Ok(Created(product))
}

/// Update a product (admin only)
#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    request_body = ProductChanges,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProductChanges>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .catalog_service
        .update(&id, payload, principal.subject_id)
        .await?;

    Ok(Json(product))
}

/// Delete a product (admin only)
#[utoipa::path(
    delete,
    path = "/products/{id}",
    tag = "Products",
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<NoContent> {
    state.catalog_service.remove(&id).await?;
    Ok(NoContent)
}

/// Adjust stock by a delta (admin only)
#[utoipa::path(
    patch,
    path = "/products/{id}/stock",
    tag = "Products",
    params(("id" = uuid::Uuid, Path, description = "Product ID")),
    request_body = StockAdjustment,
    responses(
        (status = 200, description = "Stock adjusted", body = ProductResponse),
        (status = 400, description = "Stock would go negative"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Product not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<StockAdjustment>,
) -> AppResult<Json<ProductResponse>> {
    let product = state
        .catalog_service
        .adjust_stock(&id, payload.quantity)
        .await?;

    Ok(Json(product))
}

/// Catalog statistics (admin only)
#[utoipa::path(
    get,
    path = "/products/admin/stats",
    tag = "Products",
    responses(
        (status = 200, description = "Catalog statistics", body = CatalogStats),
        (status = 403, description = "Admin role required")
    ),
    security(("bearer_auth" = []))
)]
pub async fn catalog_stats(State(state): State<AppState>) -> AppResult<Json<CatalogStats>> {
    let stats = state.catalog_service.stats().await?;
    Ok(Json(stats))
}
