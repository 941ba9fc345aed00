//! Social user database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{AuthProvider, Role, User};
use crate::errors::AppError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar: Option<String>,
    pub provider: String,
    pub provider_id: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for User {
    type Error = AppError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let provider: AuthProvider = model.provider.parse().map_err(|_| {
            AppError::internal(format!(
                "user {} has unknown provider '{}'",
                model.id, model.provider
            ))
        })?;

        Ok(User {
            id: model.id,
            name: model.name,
            email: model.email,
            avatar: model.avatar,
            provider,
            provider_id: model.provider_id,
            role: Role::from(model.role.as_str()),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}
