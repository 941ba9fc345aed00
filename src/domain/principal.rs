//! Roles, account types and the authenticated principal.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{AdminResponse, User};
use crate::config::{ACCOUNT_TYPE_ADMIN, ACCOUNT_TYPE_USER, ROLE_ADMIN, ROLE_USER};

/// Authorization role carried by every identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => ROLE_ADMIN,
            Role::User => ROLE_USER,
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            ROLE_ADMIN => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which identity table a token subject refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Admin,
    User,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Admin => ACCOUNT_TYPE_ADMIN,
            AccountType::User => ACCOUNT_TYPE_USER,
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity attached to a request once the authentication gate passes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub subject_id: Uuid,
    #[schema(example = "curator@example.com")]
    pub email: String,
    pub role: Role,
    pub account_type: AccountType,
}

impl Principal {
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.role)
    }
}

/// Freshly loaded account behind a token subject
#[derive(Debug, Clone)]
pub enum Identity {
    Admin(AdminResponse),
    User(User),
}

impl Identity {
    pub fn id(&self) -> Uuid {
        match self {
            Identity::Admin(admin) => admin.id,
            Identity::User(user) => user.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip_strings() {
        assert_eq!(Role::from("admin"), Role::Admin);
        assert_eq!(Role::from("user"), Role::User);
        // Unknown values never escalate
        assert_eq!(Role::from("root"), Role::User);
        assert_eq!(Role::Admin.to_string(), "admin");
    }

    #[test]
    fn test_principal_role_membership() {
        let principal = Principal {
            subject_id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            role: Role::User,
            account_type: AccountType::User,
        };
        assert!(!principal.has_any_role(&[Role::Admin]));
        assert!(principal.has_any_role(&[Role::Admin, Role::User]));
    }

    #[test]
    fn test_account_type_serializes_lowercase() {
        let json = serde_json::to_string(&AccountType::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
    }
}
