//! Admin domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::Role;

/// Catalog administrator (password-based account)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin response with the password hash stripped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminResponse {
    pub id: Uuid,
    #[schema(example = "curator@example.com")]
    pub email: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Admin> for AdminResponse {
    fn from(admin: Admin) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
            role: admin.role,
            is_active: admin.is_active,
            created_at: admin.created_at,
            updated_at: admin.updated_at,
        }
    }
}

/// Minimal admin projection used when resolving `addedBy`/`lastModifiedBy`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminRef {
    pub id: Uuid,
    /// `None` when the referenced admin no longer exists
    pub email: Option<String>,
}

impl AdminRef {
    pub fn unresolved(id: Uuid) -> Self {
        Self { id, email: None }
    }
}
