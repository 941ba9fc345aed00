//! Application settings loaded from environment variables.

use std::env;

use thiserror::Error;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_FRONTEND_URL, DEFAULT_REDIS_URL, DEFAULT_SERVER_HOST,
    DEFAULT_SERVER_PORT, MIN_JWT_SECRET_LENGTH,
};

/// Startup configuration failures. All of them are fatal.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable must be set")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {0} characters long")]
    WeakJwtSecret(usize),
}

/// Client registration for one OAuth provider.
#[derive(Clone, Default)]
pub struct OAuthCredentials {
    pub client_id: String,
    client_secret: String,
    pub callback_url: String,
}

impl OAuthCredentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        callback_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            callback_url: callback_url.into(),
        }
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Whether the provider has been configured at all.
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    fn from_env(id_var: &str, secret_var: &str, callback_var: &str) -> Self {
        Self {
            client_id: env::var(id_var).unwrap_or_default(),
            client_secret: env::var(secret_var).unwrap_or_default(),
            callback_url: env::var(callback_var).unwrap_or_default(),
        }
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub frontend_url: String,
    pub google: OAuthCredentials,
    pub facebook: OAuthCredentials,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("frontend_url", &self.frontend_url)
            .field("google_configured", &self.google.is_configured())
            .field("facebook_configured", &self.facebook.is_configured())
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing or too short. The caller is expected
    /// to abort startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::MissingJwtSecret)?;

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret: Self::check_secret(jwt_secret)?,
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_SERVER_PORT),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| DEFAULT_FRONTEND_URL.to_string()),
            google: OAuthCredentials::from_env(
                "GOOGLE_CLIENT_ID",
                "GOOGLE_CLIENT_SECRET",
                "GOOGLE_CALLBACK_URL",
            ),
            facebook: OAuthCredentials::from_env(
                "FACEBOOK_APP_ID",
                "FACEBOOK_APP_SECRET",
                "FACEBOOK_CALLBACK_URL",
            ),
        })
    }

    /// Build a configuration with defaults around an explicit secret.
    pub fn with_secret(jwt_secret: impl Into<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: Self::check_secret(jwt_secret.into())?,
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            google: OAuthCredentials::default(),
            facebook: OAuthCredentials::default(),
        })
    }

    fn check_secret(secret: String) -> Result<String, ConfigError> {
        if secret.is_empty() {
            return Err(ConfigError::MissingJwtSecret);
        }
        if secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::WeakJwtSecret(MIN_JWT_SECRET_LENGTH));
        }
        Ok(secret)
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
