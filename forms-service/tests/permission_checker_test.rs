//! Integration tests for the permission evaluator.
//!
//! The evaluator is pure over a loaded grant snapshot, so these run without
//! a database.

use forms_service::models::{Action, Permission, Resource, Role, RoleGrants};
use forms_service::services::{
    ADMIN_ROLE_NAME, PermissionCheck, PermissionChecker, SUPER_ADMIN_ROLE_NAME,
};
use uuid::Uuid;

fn container_with(permissions: Vec<Permission>) -> RoleGrants {
    RoleGrants {
        role: Role::grant_container(),
        permissions,
    }
}

fn scoped(role: &Role, resource: Resource, id: Uuid, action: Action) -> Permission {
    Permission::scoped(role.role_id, resource, id, action)
}

// ============================================================================
// Bypass semantics
// ============================================================================

#[test]
fn bypass_role_succeeds_regardless_of_checks() {
    let superadmin = RoleGrants {
        role: Role::named(SUPER_ADMIN_ROLE_NAME),
        permissions: vec![],
    };
    let grants = [superadmin];

    // Checks that nothing could ever satisfy.
    let checks = [
        PermissionCheck::scoped(Resource::Form, Uuid::new_v4(), &[Action::ReadWrite]),
        PermissionCheck::global(Resource::FieldResponse, &[Action::Delete]),
    ];

    for bypass in [
        &[SUPER_ADMIN_ROLE_NAME][..],
        &[ADMIN_ROLE_NAME, SUPER_ADMIN_ROLE_NAME][..],
    ] {
        let checker = PermissionChecker::new(&grants, bypass, &checks);
        assert!(checker.check(false, None).is_ok());
        assert!(checker.check(true, None).is_ok());
    }
}

#[test]
fn unnamed_roles_never_trigger_bypass() {
    let grants = [container_with(vec![])];
    let checks = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
    let checker = PermissionChecker::new(&grants, &[ADMIN_ROLE_NAME], &checks);
    assert!(checker.check(false, None).is_err());
}

// ============================================================================
// Either vs default mode
// ============================================================================

#[test]
fn either_mode_accepts_any_single_granted_triple() {
    let form_id = Uuid::new_v4();
    let field_id = Uuid::new_v4();

    let role = Role::grant_container();
    let grants = [RoleGrants {
        permissions: vec![scoped(&role, Resource::Form, form_id, Action::ReadWrite)],
        role,
    }];

    // Only the first check is granted; either-mode still passes.
    let checks = [
        PermissionCheck::scoped(Resource::Form, form_id, &[Action::ReadWrite]),
        PermissionCheck::scoped(Resource::FormField, field_id, &[Action::ReadWrite]),
    ];
    let checker = PermissionChecker::new(&grants, &[], &checks);
    assert!(checker.check(true, None).is_ok());
    assert!(checker.check(false, None).is_err());
}

#[test]
fn default_mode_requires_single_role_to_cover_all_pairs() {
    let form_id = Uuid::new_v4();

    let full_role = Role::grant_container();
    let full = RoleGrants {
        permissions: vec![
            scoped(&full_role, Resource::Form, form_id, Action::Read),
            scoped(&full_role, Resource::Form, form_id, Action::Write),
        ],
        role: full_role,
    };

    let partial_role = Role::grant_container();
    let partial = RoleGrants {
        permissions: vec![scoped(&partial_role, Resource::Form, form_id, Action::Read)],
        role: partial_role,
    };

    let checks = [PermissionCheck::scoped(
        Resource::Form,
        form_id,
        &[Action::Read, Action::Write],
    )];

    // The partial role alone fails; adding the full role succeeds no matter
    // where it sits in the caller-supplied order.
    let only_partial = [partial.clone()];
    assert!(
        PermissionChecker::new(&only_partial, &[], &checks)
            .check(false, None)
            .is_err()
    );

    let partial_first = [partial.clone(), full.clone()];
    assert!(
        PermissionChecker::new(&partial_first, &[], &checks)
            .check(false, None)
            .is_ok()
    );

    let full_first = [full, partial];
    assert!(
        PermissionChecker::new(&full_first, &[], &checks)
            .check(false, None)
            .is_ok()
    );
}

// ============================================================================
// Keyspace separation
// ============================================================================

#[test]
fn global_grant_never_satisfies_scoped_check() {
    let form_id = Uuid::new_v4();
    let role = Role::grant_container();
    let grants = [RoleGrants {
        permissions: vec![Permission::global(role.role_id, Resource::Form, Action::ReadWrite)],
        role,
    }];

    let scoped_check = [PermissionCheck::scoped(
        Resource::Form,
        form_id,
        &[Action::ReadWrite],
    )];
    assert!(
        PermissionChecker::new(&grants, &[], &scoped_check)
            .check(false, None)
            .is_err()
    );
}

#[test]
fn scoped_grant_never_satisfies_global_check() {
    let form_id = Uuid::new_v4();
    let role = Role::grant_container();
    let grants = [RoleGrants {
        permissions: vec![scoped(&role, Resource::Form, form_id, Action::ReadWrite)],
        role,
    }];

    let global_check = [PermissionCheck::global(Resource::Form, &[Action::ReadWrite])];
    assert!(
        PermissionChecker::new(&grants, &[], &global_check)
            .check(false, None)
            .is_err()
    );
}

// ============================================================================
// Failure message
// ============================================================================

#[test]
fn custom_message_reaches_the_error() {
    let checks = [PermissionCheck::global(Resource::User, &[Action::Create])];
    let checker = PermissionChecker::new(&[], &[], &checks);
    let err = checker
        .check(false, Some("Only administrators can log in at the moment"))
        .unwrap_err();
    assert!(
        err.to_string()
            .contains("Only administrators can log in at the moment")
    );
}
