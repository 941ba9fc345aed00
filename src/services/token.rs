//! Bearer token issuing and verification (HS256).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TTL_HOURS, TOKEN_TYPE_BEARER};
use crate::domain::{AccountType, Role};
use crate::errors::AppResult;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: Role,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Who a token is being issued for
#[derive(Debug, Clone)]
pub struct TokenSubject<'a> {
    pub id: Uuid,
    pub email: &'a str,
    pub role: Role,
    pub account_type: AccountType,
}

/// Signs and verifies access tokens with the server secret
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl TokenIssuer {
    pub fn new(config: &Config) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret_bytes()),
            ttl_hours: TOKEN_TTL_HOURS,
        }
    }

    pub fn issue(&self, subject: TokenSubject<'_>) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.id,
            email: subject.email.to_string(),
            role: subject.role,
            account_type: subject.account_type,
            exp: (now + Duration::hours(self.ttl_hours)).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.ttl_hours * SECONDS_PER_HOUR,
        })
    }

    /// Check signature and expiry. Tampered or expired tokens fail as a whole.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}
