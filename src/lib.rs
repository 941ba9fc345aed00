//! Artisan catalog backend.
//!
//! REST API over a catalog of handcrafted works: public browsing with
//! filters and full-text search, admin-only curation, password logins for
//! admins and Google/Facebook sign-in for end users.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Catalog and identity entities with their rules
//! - **services**: Use cases (authentication, catalog management)
//! - **infra**: PostgreSQL, Redis and OAuth provider adapters
//! - **api**: HTTP handlers, access guards, rate limiting and routes
//! - **types**: Shared response types (pagination, status helpers)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Admin, Password, Product, Role, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
