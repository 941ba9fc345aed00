//! Connectivity probes used by the health endpoint.

use async_trait::async_trait;

use crate::errors::AppResult;

/// Backing service that can report whether it is reachable
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}
