//! Permission model - composite (resource, id, action) grants owned by roles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Resource kinds a permission can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    User,
    Form,
    FormField,
    FieldResponse,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::User => "user",
            Resource::Form => "form",
            Resource::FormField => "formfield",
            Resource::FieldResponse => "fieldresponse",
        }
    }
}

/// Action codes a permission can grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Write,
    ReadWrite,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "c",
            Action::Read => "r",
            Action::Write => "w",
            Action::ReadWrite => "rw",
            Action::Delete => "d",
        }
    }
}

/// Permission entity.
///
/// The key is the composite (resource_code, resource_id, action_code).
/// `resource_id = NULL` is a global permission; global and resource-scoped
/// permissions are distinct keyspaces and never satisfy each other.
#[derive(Debug, Clone, FromRow)]
pub struct Permission {
    pub permission_id: Uuid,
    pub role_id: Uuid,
    pub resource_code: String,
    pub resource_id: Option<Uuid>,
    pub action_code: String,
    pub created_utc: DateTime<Utc>,
}

impl Permission {
    /// Create a permission scoped to one resource instance.
    pub fn scoped(role_id: Uuid, resource: Resource, resource_id: Uuid, action: Action) -> Self {
        Self {
            permission_id: Uuid::new_v4(),
            role_id,
            resource_code: resource.as_str().to_string(),
            resource_id: Some(resource_id),
            action_code: action.as_str().to_string(),
            created_utc: Utc::now(),
        }
    }

    /// Create a global permission for a resource kind.
    pub fn global(role_id: Uuid, resource: Resource, action: Action) -> Self {
        Self {
            permission_id: Uuid::new_v4(),
            role_id,
            resource_code: resource.as_str().to_string(),
            resource_id: None,
            action_code: action.as_str().to_string(),
            created_utc: Utc::now(),
        }
    }

    /// Whether this permission grants `action` on the described resource.
    pub fn grants(&self, resource: Resource, resource_id: Option<Uuid>, action: Action) -> bool {
        self.resource_code == resource.as_str()
            && self.resource_id == resource_id
            && self.action_code == action.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scoped_permission_matches_its_resource_only() {
        let role_id = Uuid::new_v4();
        let form_id = Uuid::new_v4();
        let perm = Permission::scoped(role_id, Resource::Form, form_id, Action::ReadWrite);

        assert!(perm.grants(Resource::Form, Some(form_id), Action::ReadWrite));
        assert!(!perm.grants(Resource::Form, Some(Uuid::new_v4()), Action::ReadWrite));
        assert!(!perm.grants(Resource::Form, Some(form_id), Action::Read));
        assert!(!perm.grants(Resource::FormField, Some(form_id), Action::ReadWrite));
    }

    #[test]
    fn global_and_scoped_are_distinct_keyspaces() {
        let role_id = Uuid::new_v4();
        let form_id = Uuid::new_v4();
        let global = Permission::global(role_id, Resource::Form, Action::ReadWrite);
        let scoped = Permission::scoped(role_id, Resource::Form, form_id, Action::ReadWrite);

        // A global grant never satisfies a scoped check, and vice versa.
        assert!(!global.grants(Resource::Form, Some(form_id), Action::ReadWrite));
        assert!(!scoped.grants(Resource::Form, None, Action::ReadWrite));
        assert!(global.grants(Resource::Form, None, Action::ReadWrite));
    }
}
