//! Application state - Dependency injection container.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, CacheStore, Database, HealthCheck, IdentityProvider, OAuthClient};
use crate::services::{AuthService, CatalogService, ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub catalog_service: Arc<dyn CatalogService>,
    /// OAuth providers (Google, Facebook)
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// Rate limits and OAuth state
    pub cache: Arc<dyn CacheStore>,
    pub database: Arc<dyn HealthCheck>,
    /// Base URL the OAuth callback redirects to
    pub frontend_url: String,
}

impl AppState {
    /// Wire the production services from live connections.
    pub fn from_config(database: Arc<Database>, cache: Arc<Cache>, config: &Config) -> Self {
        let container = Services::from_connection(database.connection(), config);

        Self {
            auth_service: container.auth(),
            catalog_service: container.catalog(),
            identity_provider: Arc::new(OAuthClient::new(config)),
            cache,
            database,
            frontend_url: config.frontend_url.clone(),
        }
    }

    /// Create application state with manually injected collaborators.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        catalog_service: Arc<dyn CatalogService>,
        identity_provider: Arc<dyn IdentityProvider>,
        cache: Arc<dyn CacheStore>,
        database: Arc<dyn HealthCheck>,
        frontend_url: impl Into<String>,
    ) -> Self {
        Self {
            auth_service,
            catalog_service,
            identity_provider,
            cache,
            database,
            frontend_url: frontend_url.into(),
        }
    }
}
