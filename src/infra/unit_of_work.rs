//! Unit of Work pattern implementation.
//!
//! Centralizes access to the repositories so services receive one handle
//! instead of a connection. Every catalog write is a single statement, so
//! no cross-repository transaction is exposed.

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::repositories::{
    AdminRepository, AdminStore, ProductRepository, ProductStore, UserRepository, UserStore,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Unit of Work trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait UnitOfWork: Send + Sync {
    fn admins(&self) -> Arc<dyn AdminRepository>;

    fn users(&self) -> Arc<dyn UserRepository>;

    fn products(&self) -> Arc<dyn ProductRepository>;
}

/// Concrete implementation of UnitOfWork over one connection pool
pub struct Persistence {
    admin_repo: Arc<AdminStore>,
    user_repo: Arc<UserStore>,
    product_repo: Arc<ProductStore>,
}

impl Persistence {
    /// Create new Unit of Work with database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            admin_repo: Arc::new(AdminStore::new(db.clone())),
            user_repo: Arc::new(UserStore::new(db.clone())),
            product_repo: Arc::new(ProductStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn admins(&self) -> Arc<dyn AdminRepository> {
        self.admin_repo.clone()
    }

    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn products(&self) -> Arc<dyn ProductRepository> {
        self.product_repo.clone()
    }
}
