//! Service Container - Centralized service access.
//!
//! Built once at startup; handlers only ever see the service traits.

use std::sync::Arc;

use super::{AuthService, Authenticator, CatalogManager, CatalogService, TokenIssuer};
use crate::config::Config;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get catalog service
    fn catalog(&self) -> Arc<dyn CatalogService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    catalog_service: Arc<dyn CatalogService>,
}

impl Services {
    /// Create a new service container from already built services
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        catalog_service: Arc<dyn CatalogService>,
    ) -> Self {
        Self {
            auth_service,
            catalog_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let auth_service = Arc::new(Authenticator::new(uow.clone(), TokenIssuer::new(config)));
        let catalog_service = Arc::new(CatalogManager::new(uow));

        Self {
            auth_service,
            catalog_service,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog_service.clone()
    }
}
