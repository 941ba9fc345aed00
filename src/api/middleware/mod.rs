//! API middleware.

mod auth;
mod rate_limit;

pub use auth::{
    access_guard, authenticate, authorize, run_guards, AccessPolicy, Guarded, ADMIN_ONLY,
};
pub use rate_limit::{rate_limit_auth_middleware, rate_limit_middleware, RateLimitError};
