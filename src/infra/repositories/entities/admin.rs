//! Admin database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Admin, AdminRef, Role};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "admins")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database model to domain entity
impl From<Model> for Admin {
    fn from(model: Model) -> Self {
        Admin {
            id: model.id,
            email: model.email,
            password_hash: model.password_hash,
            role: Role::from(model.role.as_str()),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<Model> for AdminRef {
    fn from(model: Model) -> Self {
        AdminRef {
            id: model.id,
            email: Some(model.email),
        }
    }
}
