//! Permission evaluator.
//!
//! Pure, read-only evaluation over a user's loaded grant snapshot
//! ([`RoleGrants`]). Named bypass roles short-circuit every check; otherwise
//! checks are combined in one of two modes:
//!
//! - default ("all-of"): some single role must satisfy every check for
//!   every required action;
//! - either ("any-of"): any one (role, check, action) triple suffices.

use uuid::Uuid;

use crate::models::{Action, Resource, RoleGrants};
use crate::services::error::ServiceError;

pub const SUPER_ADMIN_ROLE_NAME: &str = "superadmin";
pub const ADMIN_ROLE_NAME: &str = "admin";

/// One permission requirement: a resource descriptor plus the actions that
/// must be granted on it.
#[derive(Debug, Clone)]
pub struct PermissionCheck {
    pub resource: Resource,
    pub resource_id: Option<Uuid>,
    pub actions: Vec<Action>,
}

impl PermissionCheck {
    /// Requirement scoped to one resource instance.
    pub fn scoped(resource: Resource, resource_id: Uuid, actions: &[Action]) -> Self {
        Self {
            resource,
            resource_id: Some(resource_id),
            actions: actions.to_vec(),
        }
    }

    /// Global (instance-less) requirement.
    pub fn global(resource: Resource, actions: &[Action]) -> Self {
        Self {
            resource,
            resource_id: None,
            actions: actions.to_vec(),
        }
    }
}

/// Aggregate permission check over a user's role set.
#[derive(Debug)]
pub struct PermissionChecker<'a> {
    pub grants: &'a [RoleGrants],
    pub bypass_roles: &'a [&'a str],
    pub checks: &'a [PermissionCheck],
}

impl<'a> PermissionChecker<'a> {
    pub fn new(
        grants: &'a [RoleGrants],
        bypass_roles: &'a [&'a str],
        checks: &'a [PermissionCheck],
    ) -> Self {
        Self {
            grants,
            bypass_roles,
            checks,
        }
    }

    fn is_allowed(role: &RoleGrants, check: &PermissionCheck, action: Action) -> bool {
        role.permissions
            .iter()
            .any(|p| p.grants(check.resource, check.resource_id, action))
    }

    fn has_bypass_role(&self) -> bool {
        self.grants
            .iter()
            .filter_map(|g| g.role.role_name.as_deref())
            .any(|name| self.bypass_roles.contains(&name))
    }

    /// Evaluate the checks.
    ///
    /// Role iteration preserves the caller-supplied order of `grants`; in
    /// default mode the first fully-satisfying role short-circuits.
    pub fn check(&self, either: bool, message: Option<&str>) -> Result<(), ServiceError> {
        if self.has_bypass_role() {
            return Ok(());
        }

        if either {
            for role in self.grants {
                for check in self.checks {
                    for &action in &check.actions {
                        if Self::is_allowed(role, check, action) {
                            return Ok(());
                        }
                    }
                }
            }
            return Err(ServiceError::NotAuthorized(
                message
                    .unwrap_or("Not authorized to access this resource")
                    .to_string(),
            ));
        }

        for role in self.grants {
            let all_satisfied = self.checks.iter().all(|check| {
                check
                    .actions
                    .iter()
                    .all(|&action| Self::is_allowed(role, check, action))
            });
            if all_satisfied {
                return Ok(());
            }
        }

        Err(ServiceError::NotAuthorized(
            message
                .unwrap_or("Not authorized to access this resource")
                .to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Permission, Role};

    fn grant(role: Role, permissions: Vec<Permission>) -> RoleGrants {
        RoleGrants { role, permissions }
    }

    fn scoped_grant(resource: Resource, resource_id: Uuid, action: Action) -> RoleGrants {
        let role = Role::grant_container();
        let perm = Permission::scoped(role.role_id, resource, resource_id, action);
        grant(role, vec![perm])
    }

    #[test]
    fn bypass_role_short_circuits_everything() {
        let admin = grant(Role::named(ADMIN_ROLE_NAME), vec![]);
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            Uuid::new_v4(),
            &[Action::ReadWrite],
        )];
        let checker = PermissionChecker::new(
            std::slice::from_ref(&admin),
            &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME],
            &checks,
        );
        assert!(checker.check(false, None).is_ok());
        assert!(checker.check(true, None).is_ok());
    }

    #[test]
    fn named_role_outside_bypass_set_does_not_help() {
        let moderator = grant(Role::named("moderator"), vec![]);
        let checks = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
        let checker =
            PermissionChecker::new(std::slice::from_ref(&moderator), &[ADMIN_ROLE_NAME], &checks);
        assert!(checker.check(false, None).is_err());
    }

    #[test]
    fn default_mode_needs_one_role_satisfying_all_checks() {
        let form_id = Uuid::new_v4();
        let field_id = Uuid::new_v4();

        // Two roles, each holding half of the requirement.
        let form_role = scoped_grant(Resource::Form, form_id, Action::ReadWrite);
        let field_role = scoped_grant(Resource::FormField, field_id, Action::ReadWrite);
        let grants = [form_role, field_role];

        let checks = [
            PermissionCheck::scoped(Resource::Form, form_id, &[Action::ReadWrite]),
            PermissionCheck::scoped(Resource::FormField, field_id, &[Action::ReadWrite]),
        ];

        let checker = PermissionChecker::new(&grants, &[], &checks);
        // No single role satisfies both checks.
        assert!(checker.check(false, None).is_err());
        // But either-mode accepts any single granted triple.
        assert!(checker.check(true, None).is_ok());
    }

    #[test]
    fn default_mode_passes_when_one_role_holds_everything() {
        let form_id = Uuid::new_v4();
        let role = Role::grant_container();
        let permissions = vec![
            Permission::scoped(role.role_id, Resource::Form, form_id, Action::Read),
            Permission::scoped(role.role_id, Resource::Form, form_id, Action::Write),
        ];
        let grants = [grant(role, permissions)];

        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::Read, Action::Write],
        )];
        let checker = PermissionChecker::new(&grants, &[], &checks);
        assert!(checker.check(false, None).is_ok());
    }

    #[test]
    fn missing_one_action_fails_default_mode() {
        let form_id = Uuid::new_v4();
        let grants = [scoped_grant(Resource::Form, form_id, Action::Read)];
        let checks = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::Read, Action::Write],
        )];
        let checker = PermissionChecker::new(&grants, &[], &checks);
        assert!(checker.check(false, None).is_err());
        // Either-mode is satisfied by the read grant alone.
        assert!(checker.check(true, None).is_ok());
    }

    #[test]
    fn global_permission_does_not_satisfy_scoped_check() {
        let form_id = Uuid::new_v4();
        let role = Role::grant_container();
        let perm = Permission::global(role.role_id, Resource::Form, Action::ReadWrite);
        let grants = [grant(role, vec![perm])];

        let scoped = [PermissionCheck::scoped(
            Resource::Form,
            form_id,
            &[Action::ReadWrite],
        )];
        assert!(
            PermissionChecker::new(&grants, &[], &scoped)
                .check(false, None)
                .is_err()
        );

        let global = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
        assert!(
            PermissionChecker::new(&grants, &[], &global)
                .check(false, None)
                .is_ok()
        );
    }

    #[test]
    fn failure_carries_custom_message() {
        let checks = [PermissionCheck::global(Resource::User, &[Action::Create])];
        let checker = PermissionChecker::new(&[], &[], &checks);
        let err = checker.check(false, Some("Admins only")).unwrap_err();
        match err {
            ServiceError::NotAuthorized(msg) => assert_eq!(msg, "Admins only"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_role_set_fails_without_bypass() {
        let checks = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
        let checker = PermissionChecker::new(&[], &[ADMIN_ROLE_NAME], &checks);
        assert!(checker.check(false, None).is_err());
    }
}
