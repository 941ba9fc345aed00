//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{auth_handler, product_handler};
use crate::domain::{
    AccountType, AdminRef, AdminResponse, AuthProvider, CatalogStats, CategoryCount, Dimensions,
    NewProduct, Principal, ProductBody, ProductCategory, ProductChanges, ProductCondition,
    ProductResponse, ProductStatus, Role, SortField, SortOrder, User,
};
use crate::services::{AdminSession, TokenResponse};
use crate::types::{PaginationMeta, ProductPage};

/// OpenAPI documentation for the artisan catalog
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Artisan Catalog API",
        version = "0.1.0",
        description = "Catalog of handcrafted artworks with admin and social-login authentication"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::admin_login,
        auth_handler::admin_register,
        auth_handler::profile,
        auth_handler::provider_redirect,
        auth_handler::provider_callback,
        // Product endpoints
        product_handler::list_products,
        product_handler::list_featured,
        product_handler::list_by_category,
        product_handler::list_by_artist,
        product_handler::list_by_origin,
        product_handler::get_product,
        product_handler::create_product,
        product_handler::update_product,
        product_handler::delete_product,
        product_handler::adjust_stock,
        product_handler::catalog_stats,
    ),
    components(
        schemas(
            // Identity types
            Role,
            AccountType,
            AuthProvider,
            Principal,
            AdminResponse,
            AdminRef,
            User,
            AdminSession,
            TokenResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            // Catalog types
            ProductCategory,
            ProductCondition,
            ProductStatus,
            Dimensions,
            NewProduct,
            ProductChanges,
            ProductBody,
            ProductResponse,
            ProductPage,
            PaginationMeta,
            SortField,
            SortOrder,
            CatalogStats,
            CategoryCount,
            product_handler::StockAdjustment,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Admin login and social sign-in"),
        (name = "Products", description = "Catalog browsing and administration")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Token from /auth/admin/login or a social login"))
                        .build(),
                ),
            );
        }
    }
}
