//! Domain layer - Core catalog and identity entities
//!
//! Types here carry the business rules (stock transitions, field
//! invariants, role membership) independent of storage and HTTP.

pub mod admin;
pub mod catalog;
pub mod password;
pub mod principal;
pub mod product;
pub mod user;

pub use admin::{Admin, AdminRef, AdminResponse};
pub use catalog::{
    check_limit, CatalogStats, CategoryCount, PageRequest, ProductFilter, SortField, SortOrder,
};
pub use password::Password;
pub use principal::{AccountType, Identity, Principal, Role};
pub use product::{
    parse_product_id, Dimensions, NewProduct, Product, ProductBody, ProductCategory,
    ProductChanges, ProductCondition, ProductResponse, ProductStatus,
};
pub use user::{AuthProvider, SocialProfile, User};
