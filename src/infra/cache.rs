//! Redis cache implementation.
//!
//! Holds the rate-limit counters and the short-lived OAuth `state`
//! values issued between the provider redirect and its callback.

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client, RedisError};

use super::HealthCheck;
use crate::config::{Config, CACHE_PREFIX_OAUTH_STATE, CACHE_PREFIX_RATE_LIMIT};
use crate::errors::AppResult;

/// Cache operations the HTTP layer depends on
#[async_trait]
pub trait CacheStore: HealthCheck {
    /// Count one request for `identifier` in the current fixed window.
    /// Returns `(count, allowed)`.
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)>;

    /// Remember an OAuth `state` value and the provider it was issued for.
    async fn save_oauth_state(&self, state: &str, provider: &str, ttl_seconds: u64)
        -> AppResult<()>;

    /// Consume an OAuth `state` value. A value can be taken once.
    async fn take_oauth_state(&self, state: &str) -> AppResult<Option<String>>;
}

/// Redis cache wrapper with connection pooling.
#[derive(Clone)]
pub struct Cache {
    connection: ConnectionManager,
}

impl Cache {
    /// Connect to Redis.
    pub async fn connect(config: &Config) -> Result<Self, RedisError> {
        let client = Client::open(config.redis_url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        tracing::info!("Redis cache connected");

        Ok(Self { connection })
    }
}

#[async_trait]
impl HealthCheck for Cache {
    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for Cache {
    async fn check_rate_limit(
        &self,
        identifier: &str,
        max_requests: u64,
        window_seconds: u64,
    ) -> AppResult<(u64, bool)> {
        let key = rate_limit_key(identifier);
        let mut conn = self.connection.clone();

        let count: u64 = conn.incr(&key, 1u64).await?;
        if count == 1 {
            // First request opens the window
            let _: () = conn.expire(&key, window_seconds as i64).await?;
        }

        Ok((count, count <= max_requests))
    }

    async fn save_oauth_state(
        &self,
        state: &str,
        provider: &str,
        ttl_seconds: u64,
    ) -> AppResult<()> {
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(oauth_state_key(state), provider, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn take_oauth_state(&self, state: &str) -> AppResult<Option<String>> {
        let mut conn = self.connection.clone();
        let provider: Option<String> = conn.get_del(oauth_state_key(state)).await?;
        Ok(provider)
    }
}

fn rate_limit_key(identifier: &str) -> String {
    format!("{}{}", CACHE_PREFIX_RATE_LIMIT, identifier)
}

fn oauth_state_key(state: &str) -> String {
    format!("{}{}", CACHE_PREFIX_OAUTH_STATE, state)
}
