//! Role model - named bypass roles and unnamed per-resource grant containers.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Role entity.
///
/// A role with a `role_name` ("admin", "superadmin") is a privilege-bypass
/// marker. A role without one is an ad hoc grant container, typically
/// created alongside a resource and attached to its owner.
#[derive(Debug, Clone, FromRow)]
pub struct Role {
    pub role_id: Uuid,
    pub role_name: Option<String>,
    pub created_utc: DateTime<Utc>,
}

impl Role {
    /// Create a named role.
    pub fn named(name: &str) -> Self {
        Self {
            role_id: Uuid::new_v4(),
            role_name: Some(name.to_string()),
            created_utc: Utc::now(),
        }
    }

    /// Create an unnamed grant-container role.
    pub fn grant_container() -> Self {
        Self {
            role_id: Uuid::new_v4(),
            role_name: None,
            created_utc: Utc::now(),
        }
    }
}

/// User-role link (many-to-many).
#[derive(Debug, Clone, FromRow)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
}

/// A role together with the permissions it owns: one entry of a user's
/// loaded grant snapshot. The permission evaluator runs over these.
#[derive(Debug, Clone)]
pub struct RoleGrants {
    pub role: Role,
    pub permissions: Vec<crate::models::permission::Permission>,
}

impl RoleGrants {
    /// Whether the underlying role carries the given bypass name.
    pub fn is_named(&self, name: &str) -> bool {
        self.role.role_name.as_deref() == Some(name)
    }
}
