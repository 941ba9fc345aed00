//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Redis (rate limits, OAuth state)
//! - OAuth identity provider HTTP client
//! - Unit of Work for repository access

pub mod cache;
pub mod db;
pub mod health;
pub mod oauth;
pub mod repositories;
pub mod unit_of_work;

pub use cache::{Cache, CacheStore};
pub use db::{Database, Migrator};
pub use health::HealthCheck;
pub use oauth::{IdentityProvider, OAuthClient};
pub use repositories::{
    AdminRepository, AdminStore, ProductQueryBuilder, ProductRepository, ProductStore,
    UserRepository, UserStore,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockAdminRepository, MockProductRepository, MockUserRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use unit_of_work::MockUnitOfWork;
