//! Find-or-create of local users from social provider profiles.

use std::sync::Arc;

use crate::domain::{SocialProfile, User};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::{UnitOfWork, UserRepository};

/// Maps an external provider profile to exactly one local user
pub struct SocialIdentityResolver<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> SocialIdentityResolver<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Match by email OR by (provider, provider id). A new identity is
    /// created verbatim; a known one gets name and avatar overwritten.
    pub async fn resolve(&self, profile: SocialProfile) -> AppResult<User> {
        let users = self.uow.users();
        let existing = users
            .find_by_email_or_provider(&profile.email, profile.provider, &profile.provider_id)
            .await?;

        let Some(user) = existing else {
            return match users.create(profile.clone()).await {
                Ok(user) => {
                    tracing::info!(user_id = %user.id, provider = %user.provider, "Social user created");
                    Ok(user)
                }
                // A concurrent first login inserted the row between lookup and insert
                Err(AppError::Conflict(_)) => {
                    let user = users
                        .find_by_email_or_provider(
                            &profile.email,
                            profile.provider,
                            &profile.provider_id,
                        )
                        .await?
                        .ok_or_not_found("User")?;
                    refresh(users.as_ref(), user, profile).await
                }
                Err(e) => Err(e),
            };
        };

        refresh(users.as_ref(), user, profile).await
    }
}

async fn refresh(users: &dyn UserRepository, user: User, profile: SocialProfile) -> AppResult<User> {
    if user.is_linked_to_other_provider(&profile) {
        tracing::warn!(
            user_id = %user.id,
            stored_provider = %user.provider,
            incoming_provider = %profile.provider,
            "Social login merged into an account registered with another identity"
        );
    }
    users
        .refresh_profile(user.id, profile.name, profile.avatar)
        .await
}
