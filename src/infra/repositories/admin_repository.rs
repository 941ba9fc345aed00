//! Admin repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use uuid::Uuid;

use super::entities::admin::{self, ActiveModel, Entity as AdminEntity};
use crate::config::ROLE_ADMIN;
use crate::domain::{Admin, AdminRef};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Admin repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AdminRepository: Send + Sync {
    /// Find an active admin by email (login path)
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Admin>>;

    /// Find an admin by email regardless of active state
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Admin>>;

    /// Insert a new admin. A duplicate email yields `Conflict`.
    async fn create(&self, email: String, password_hash: String) -> AppResult<Admin>;

    /// Resolve admin ids to `{id, email}` projections. Unknown ids are skipped.
    async fn find_refs(&self, ids: &[Uuid]) -> AppResult<Vec<AdminRef>>;
}

/// SeaORM-backed admin repository
pub struct AdminStore {
    db: DatabaseConnection,
}

impl AdminStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AdminRepository for AdminStore {
    async fn find_active_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let result = AdminEntity::find()
            .filter(admin::Column::Email.eq(email))
            .filter(admin::Column::IsActive.eq(true))
            .one(&self.db)
            .await?;

        Ok(result.map(Admin::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Admin>> {
        let result = AdminEntity::find()
            .filter(admin::Column::Email.eq(email))
            .one(&self.db)
            .await?;

        Ok(result.map(Admin::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Admin>> {
        let result = AdminEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Admin::from))
    }

    async fn create(&self, email: String, password_hash: String) -> AppResult<Admin> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            password_hash: Set(password_hash),
            role: Set(ROLE_ADMIN.to_string()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await.map_err(unique_to_conflict)?;
        Ok(Admin::from(model))
    }

    async fn find_refs(&self, ids: &[Uuid]) -> AppResult<Vec<AdminRef>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = AdminEntity::find()
            .filter(admin::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(AdminRef::from).collect())
    }
}

/// A registration that loses the race on the unique email index is a conflict too.
fn unique_to_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Admin"),
        _ => AppError::from(err),
    }
}
