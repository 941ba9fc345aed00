//! Social user repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, Unchanged,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::{AuthProvider, SocialProfile, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find the user matching `email` OR the `(provider, provider_id)` pair.
    async fn find_by_email_or_provider(
        &self,
        email: &str,
        provider: AuthProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>>;

    /// Insert a user from a provider profile with the default role.
    /// An email or provider identity that already exists yields `Conflict`.
    async fn create(&self, profile: SocialProfile) -> AppResult<User>;

    /// Overwrite the display fields. Always writes.
    async fn refresh_profile(
        &self,
        id: Uuid,
        name: String,
        avatar: Option<String>,
    ) -> AppResult<User>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;
}

/// SeaORM-backed user repository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_email_or_provider(
        &self,
        email: &str,
        provider: AuthProvider,
        provider_id: &str,
    ) -> AppResult<Option<User>> {
        let matches_identity = Condition::any()
            .add(user::Column::Email.eq(email))
            .add(
                Condition::all()
                    .add(user::Column::ProviderId.eq(provider_id))
                    .add(user::Column::Provider.eq(provider.as_str())),
            );

        // Oldest account wins when the two predicates hit different rows
        let result = UserEntity::find()
            .filter(matches_identity)
            .order_by_asc(user::Column::CreatedAt)
            .one(&self.db)
            .await?;

        result.map(User::try_from).transpose()
    }

    async fn create(&self, profile: SocialProfile) -> AppResult<User> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(profile.name),
            email: Set(profile.email),
            avatar: Set(profile.avatar),
            provider: Set(profile.provider.as_str().to_string()),
            provider_id: Set(profile.provider_id),
            role: Set(ROLE_USER.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("User"),
            _ => AppError::from(e),
        })?;
        User::try_from(model)
    }

    async fn refresh_profile(
        &self,
        id: Uuid,
        name: String,
        avatar: Option<String>,
    ) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Unchanged(id),
            name: Set(name),
            avatar: Set(avatar),
            updated_at: Set(chrono::Utc::now()),
            ..Default::default()
        };

        let model = active_model.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => AppError::not_found("User"),
            other => AppError::from(other),
        })?;
        User::try_from(model)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id).one(&self.db).await?;
        result.map(User::try_from).transpose()
    }
}
