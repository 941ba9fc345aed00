//! Service layer - Business logic orchestration
//!
//! Services coordinate the domain types and the repositories behind the
//! Unit of Work. They are exposed as traits so handlers can be tested
//! against fakes.

mod auth_service;
mod catalog_service;
mod container;
mod identity_resolver;
mod token;

pub use auth_service::{AdminSession, AuthService, Authenticator, UserSession};
pub use catalog_service::{CatalogManager, CatalogService};
pub use container::{ServiceContainer, Services};
pub use identity_resolver::SocialIdentityResolver;
pub use token::{Claims, TokenIssuer, TokenResponse, TokenSubject};

#[cfg(any(test, feature = "test-utils"))]
pub use auth_service::MockAuthService;
#[cfg(any(test, feature = "test-utils"))]
pub use catalog_service::MockCatalogService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
