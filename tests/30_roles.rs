use uuid::Uuid;

use ecowatch_api::access::roles::{
    can_edit_devices, can_view_all_organizations, has_organization_access,
};
use ecowatch_api::access::{scope::visible_scope, Principal, ProfileClaims, ScopePredicate};
use ecowatch_api::types::{EntityKind, Role};

// Role policy and scoping are independent gates; these tests pin down how
// they compose for the principal shapes the admin surface actually sees.

fn member(role: Role, org: Option<Uuid>) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        is_global_admin: false,
        profile: Some(ProfileClaims { role, organization_id: org }),
    }
}

#[test]
fn viewer_can_see_but_not_edit() {
    let org = Uuid::new_v4();
    let viewer = member(Role::Viewer, Some(org));

    assert!(!can_edit_devices(&viewer));
    // The read path is still open within the organization
    assert_eq!(visible_scope(&viewer, EntityKind::Device), ScopePredicate::Organization(org));
}

#[test]
fn admin_role_grants_view_all_but_not_a_wider_scope() {
    let org = Uuid::new_v4();
    let admin = member(Role::Admin, Some(org));

    assert!(can_view_all_organizations(&admin));
    assert_eq!(visible_scope(&admin, EntityKind::Device), ScopePredicate::Organization(org));
}

#[test]
fn superuser_gets_both_grants_without_a_profile() {
    let superuser = Principal { user_id: Uuid::new_v4(), is_global_admin: true, profile: None };

    assert!(can_view_all_organizations(&superuser));
    assert!(has_organization_access(&superuser, Uuid::new_v4()));
    assert_eq!(visible_scope(&superuser, EntityKind::Measurement), ScopePredicate::Unrestricted);
    // Editing still requires a role; the superuser flag is a view grant
    assert!(!can_edit_devices(&superuser));
}

#[test]
fn editing_roles_are_admin_operator_and_manager() {
    let org = Some(Uuid::new_v4());
    for role in [Role::Admin, Role::Operator, Role::Manager] {
        assert!(can_edit_devices(&member(role, org)), "{:?} should edit", role);
    }
    assert!(!can_edit_devices(&member(Role::Viewer, org)));
}

#[test]
fn organization_access_never_matches_through_a_missing_organization() {
    let target = Uuid::new_v4();
    let unassigned = member(Role::Admin, None);

    assert!(!has_organization_access(&unassigned, target));
    assert_eq!(visible_scope(&unassigned, EntityKind::Alert), ScopePredicate::Nothing);
}
