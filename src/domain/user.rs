//! Social-login user entity and the normalized provider profile.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;
use crate::errors::AppError;

/// External identity providers supported for end-user login
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Google,
    Facebook,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Google => "google",
            AuthProvider::Facebook => "facebook",
        }
    }
}

impl FromStr for AuthProvider {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "google" => Ok(AuthProvider::Google),
            "facebook" => Ok(AuthProvider::Facebook),
            other => Err(AppError::invalid_argument(format!(
                "Unsupported provider '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for AuthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Profile handed over by a provider after a successful OAuth callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialProfile {
    pub provider: AuthProvider,
    pub provider_id: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
}

/// End user authenticated through a social provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "Ada Obi")]
    pub name: String,
    #[schema(example = "ada@example.com")]
    pub email: String,
    pub avatar: Option<String>,
    pub provider: AuthProvider,
    pub provider_id: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether this account was first registered through another provider
    pub fn is_linked_to_other_provider(&self, profile: &SocialProfile) -> bool {
        self.provider != profile.provider || self.provider_id != profile.provider_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!("google".parse::<AuthProvider>().unwrap(), AuthProvider::Google);
        assert_eq!("facebook".parse::<AuthProvider>().unwrap(), AuthProvider::Facebook);
        assert!(matches!(
            "twitter".parse::<AuthProvider>(),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_linked_to_other_provider() {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: "A B".to_string(),
            email: "a@x.com".to_string(),
            avatar: None,
            provider: AuthProvider::Google,
            provider_id: "g1".to_string(),
            role: Role::User,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let same = SocialProfile {
            provider: AuthProvider::Google,
            provider_id: "g1".to_string(),
            email: "a@x.com".to_string(),
            name: "A B".to_string(),
            avatar: None,
        };
        let other = SocialProfile {
            provider: AuthProvider::Facebook,
            provider_id: "f9".to_string(),
            ..same.clone()
        };
        assert!(!user.is_linked_to_other_provider(&same));
        assert!(user.is_linked_to_other_provider(&other));
    }
}
