//! Authentication service - admin credentials, social login and principal checks.
//!
//! Only this service touches the token issuer and the password verifier.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use super::identity_resolver::SocialIdentityResolver;
use super::token::{Claims, TokenIssuer, TokenResponse, TokenSubject};
use crate::domain::{AccountType, AdminResponse, Identity, Password, SocialProfile, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Successful admin login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminSession {
    #[serde(flatten)]
    #[schema(inline)]
    pub token: TokenResponse,
    pub admin: AdminResponse,
}

/// Successful social login
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSession {
    #[serde(flatten)]
    #[schema(inline)]
    pub token: TokenResponse,
    pub user: User,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials of an active admin and issue an admin token
    async fn login_admin(&self, email: String, password: String) -> AppResult<AdminSession>;

    /// Register a new admin. Duplicate emails always yield `Conflict`.
    async fn register_admin(&self, email: String, password: String) -> AppResult<AdminResponse>;

    /// Resolve the social profile to a local user and issue a user token
    async fn login_social_user(&self, profile: SocialProfile) -> AppResult<UserSession>;

    /// Verify a bearer token and extract its claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Re-fetch the account behind a token subject. `None` if it is gone.
    async fn validate_principal(
        &self,
        subject_id: Uuid,
        account_type: AccountType,
    ) -> AppResult<Option<Identity>>;
}

// Verified against when the email is unknown, so both paths cost one Argon2 run
const DUMMY_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$ZHVtbXlzYWx0MTIzNDU2$2aOqI4mOGzxyq8Fx2Bq+7nAVwD8wUZmWkN8HTl1mPPU";

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    tokens: TokenIssuer,
    resolver: SocialIdentityResolver<U>,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(uow: Arc<U>, tokens: TokenIssuer) -> Self {
        Self {
            resolver: SocialIdentityResolver::new(uow.clone()),
            uow,
            tokens,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork + 'static> AuthService for Authenticator<U> {
    async fn login_admin(&self, email: String, password: String) -> AppResult<AdminSession> {
        let admin = self.uow.admins().find_active_by_email(&email).await?;

        let stored = Password::from_hash(
            admin
                .as_ref()
                .map(|a| a.password_hash.clone())
                .unwrap_or_else(|| DUMMY_HASH.to_string()),
        );
        let password_valid = stored.verify(&password);

        let admin = match admin {
            Some(admin) if password_valid => admin,
            _ => {
                tracing::debug!("Admin login rejected");
                return Err(AppError::InvalidCredentials);
            }
        };

        let token = self.tokens.issue(TokenSubject {
            id: admin.id,
            email: &admin.email,
            role: admin.role,
            account_type: AccountType::Admin,
        })?;
        tracing::info!(admin_id = %admin.id, "Admin logged in");

        Ok(AdminSession {
            token,
            admin: AdminResponse::from(admin),
        })
    }

    async fn register_admin(&self, email: String, password: String) -> AppResult<AdminResponse> {
        // Inactive admins still own their email
        if self.uow.admins().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Admin"));
        }

        let password_hash = Password::new(&password)?.into_hash();
        let admin = self.uow.admins().create(email, password_hash).await?;
        tracing::info!(admin_id = %admin.id, "Admin registered");

        Ok(AdminResponse::from(admin))
    }

    async fn login_social_user(&self, profile: SocialProfile) -> AppResult<UserSession> {
        let user = self.resolver.resolve(profile).await?;

        let token = self.tokens.issue(TokenSubject {
            id: user.id,
            email: &user.email,
            role: user.role,
            account_type: AccountType::User,
        })?;

        Ok(UserSession { token, user })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        self.tokens.verify(token)
    }

    async fn validate_principal(
        &self,
        subject_id: Uuid,
        account_type: AccountType,
    ) -> AppResult<Option<Identity>> {
        let identity = match account_type {
            AccountType::Admin => self
                .uow
                .admins()
                .find_by_id(subject_id)
                .await?
                .map(|admin| Identity::Admin(AdminResponse::from(admin))),
            AccountType::User => self
                .uow
                .users()
                .find_by_id(subject_id)
                .await?
                .map(Identity::User),
        };
        Ok(identity)
    }
}
