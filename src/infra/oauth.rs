//! OAuth identity provider client (Google, Facebook).
//!
//! Runs the authorization-code exchange and normalizes the provider
//! profile into a [`SocialProfile`].

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use crate::config::{Config, OAuthCredentials};
use crate::domain::{AuthProvider, SocialProfile};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";
const GOOGLE_SCOPES: &str = "email profile";

const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v18.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v18.0/oauth/access_token";
const FACEBOOK_PROFILE_URL: &str = "https://graph.facebook.com/v18.0/me";
const FACEBOOK_PROFILE_FIELDS: &str = "id,email,first_name,last_name,picture";
const FACEBOOK_SCOPES: &str = "email";

/// External identity provider seam
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// URL the browser is redirected to for consent
    fn authorization_url(&self, provider: AuthProvider, state: &str) -> AppResult<String>;

    /// Exchange an authorization code for the caller's normalized profile
    async fn fetch_profile(&self, provider: AuthProvider, code: &str) -> AppResult<SocialProfile>;
}

/// reqwest-backed OAuth client
pub struct OAuthClient {
    http: reqwest::Client,
    google: OAuthCredentials,
    facebook: OAuthCredentials,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    given_name: Option<String>,
    family_name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookUser {
    id: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    picture: Option<FacebookPicture>,
}

#[derive(Debug, Deserialize)]
struct FacebookPicture {
    data: FacebookPictureData,
}

#[derive(Debug, Deserialize)]
struct FacebookPictureData {
    url: Option<String>,
}

impl OAuthClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            google: config.google.clone(),
            facebook: config.facebook.clone(),
        }
    }

    fn credentials(&self, provider: AuthProvider) -> AppResult<&OAuthCredentials> {
        let credentials = match provider {
            AuthProvider::Google => &self.google,
            AuthProvider::Facebook => &self.facebook,
        };
        if !credentials.is_configured() {
            return Err(AppError::invalid_argument(format!(
                "Provider '{}' is not configured",
                provider
            )));
        }
        Ok(credentials)
    }

    async fn google_profile(&self, code: &str) -> AppResult<SocialProfile> {
        let creds = self.credentials(AuthProvider::Google)?;

        let token: TokenResponse = self
            .http
            .post(GOOGLE_TOKEN_URL)
            .form(&[
                ("code", code),
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret()),
                ("redirect_uri", creds.callback_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upstream("google token exchange", e))?
            .json()
            .await
            .map_err(|e| upstream("google token response", e))?;

        let info: GoogleUserInfo = self
            .http
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upstream("google userinfo", e))?
            .json()
            .await
            .map_err(|e| upstream("google userinfo response", e))?;

        let name = display_name(info.given_name.as_deref(), info.family_name.as_deref())
            .or(info.name)
            .unwrap_or_default();

        Ok(SocialProfile {
            provider: AuthProvider::Google,
            provider_id: info.sub,
            email: require_email(info.email)?,
            name,
            avatar: info.picture,
        })
    }

    async fn facebook_profile(&self, code: &str) -> AppResult<SocialProfile> {
        let creds = self.credentials(AuthProvider::Facebook)?;

        let token: TokenResponse = self
            .http
            .get(FACEBOOK_TOKEN_URL)
            .query(&[
                ("client_id", creds.client_id.as_str()),
                ("client_secret", creds.client_secret()),
                ("redirect_uri", creds.callback_url.as_str()),
                ("code", code),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upstream("facebook token exchange", e))?
            .json()
            .await
            .map_err(|e| upstream("facebook token response", e))?;

        let user: FacebookUser = self
            .http
            .get(FACEBOOK_PROFILE_URL)
            .query(&[
                ("fields", FACEBOOK_PROFILE_FIELDS),
                ("access_token", token.access_token.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| upstream("facebook profile", e))?
            .json()
            .await
            .map_err(|e| upstream("facebook profile response", e))?;

        Ok(SocialProfile {
            provider: AuthProvider::Facebook,
            provider_id: user.id,
            email: require_email(user.email)?,
            name: display_name(user.first_name.as_deref(), user.last_name.as_deref())
                .unwrap_or_default(),
            avatar: user.picture.and_then(|p| p.data.url),
        })
    }
}

#[async_trait]
impl IdentityProvider for OAuthClient {
    fn authorization_url(&self, provider: AuthProvider, state: &str) -> AppResult<String> {
        let creds = self.credentials(provider)?;
        let (base, scope) = match provider {
            AuthProvider::Google => (GOOGLE_AUTHORIZE_URL, GOOGLE_SCOPES),
            AuthProvider::Facebook => (FACEBOOK_AUTHORIZE_URL, FACEBOOK_SCOPES),
        };

        let url = Url::parse_with_params(
            base,
            &[
                ("client_id", creds.client_id.as_str()),
                ("redirect_uri", creds.callback_url.as_str()),
                ("response_type", "code"),
                ("scope", scope),
                ("state", state),
            ],
        )
        .map_err(|e| AppError::internal(format!("authorize url: {}", e)))?;

        Ok(url.into())
    }

    async fn fetch_profile(&self, provider: AuthProvider, code: &str) -> AppResult<SocialProfile> {
        tracing::debug!(%provider, "Exchanging OAuth authorization code");
        match provider {
            AuthProvider::Google => self.google_profile(code).await,
            AuthProvider::Facebook => self.facebook_profile(code).await,
        }
    }
}

fn upstream(step: &str, err: reqwest::Error) -> AppError {
    AppError::upstream(format!("{} failed: {}", step, err))
}

fn require_email(email: Option<String>) -> AppResult<String> {
    email.filter(|e| !e.is_empty()).ok_or(AppError::Unauthorized)
}

/// "Given Family", skipping missing parts
fn display_name(given: Option<&str>, family: Option<&str>) -> Option<String> {
    let name = [given, family]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!name.is_empty()).then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> Config {
        let mut config = Config::with_secret("a".repeat(32)).unwrap();
        config.google = OAuthCredentials::new("gid", "gsecret", "http://localhost:3000/auth/google/callback");
        config
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name(Some("A"), Some("B")).as_deref(), Some("A B"));
        assert_eq!(display_name(Some("A"), None).as_deref(), Some("A"));
        assert_eq!(display_name(None, Some(" ")), None);
    }

    #[test]
    fn test_authorization_url_carries_state() {
        let client = OAuthClient::new(&configured());
        let url = client
            .authorization_url(AuthProvider::Google, "xyz")
            .unwrap();

        assert!(url.starts_with(GOOGLE_AUTHORIZE_URL));
        assert!(url.contains("client_id=gid"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("scope=email+profile"));
        assert!(!url.contains("gsecret"));
    }

    #[test]
    fn test_unconfigured_provider_rejected() {
        let client = OAuthClient::new(&configured());
        assert!(matches!(
            client.authorization_url(AuthProvider::Facebook, "xyz"),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_missing_email_is_unauthorized() {
        assert!(matches!(require_email(None), Err(AppError::Unauthorized)));
        assert_eq!(require_email(Some("a@x.com".into())).unwrap(), "a@x.com");
    }
}
