//! Role policy: pure permission predicates, independent from scoping.
//! The two compose as separate gates; neither implies the other.

use uuid::Uuid;

use crate::types::Role;

use super::Principal;

/// Whether this principal may mutate devices (state changes included).
/// False for VIEWER and for principals without a profile.
pub fn can_edit_devices(principal: &Principal) -> bool {
    matches!(
        principal.role(),
        Some(Role::Admin | Role::Operator | Role::Manager)
    )
}

/// Role-based cross-organization view capability. Distinct from the
/// superuser flag the scoping policy honors: this is surfaced to the admin
/// layer for UI decisions and does not widen `visible_scope` (see DESIGN.md).
pub fn can_view_all_organizations(principal: &Principal) -> bool {
    principal.is_global_admin || principal.role() == Some(Role::Admin)
}

/// Whether the principal may act on records of a specific organization.
/// A profile without a home organization grants nothing, even against a
/// hypothetical record that also lacks one.
pub fn has_organization_access(principal: &Principal, organization_id: Uuid) -> bool {
    if principal.is_global_admin {
        return true;
    }
    principal.organization_id() == Some(organization_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::ProfileClaims;

    fn with_role(role: Role, org: Option<Uuid>) -> Principal {
        Principal {
            user_id: Uuid::new_v4(),
            is_global_admin: false,
            profile: Some(ProfileClaims { role, organization_id: org }),
        }
    }

    #[test]
    fn edit_devices_matrix() {
        let org = Some(Uuid::new_v4());
        assert!(can_edit_devices(&with_role(Role::Admin, org)));
        assert!(can_edit_devices(&with_role(Role::Operator, org)));
        assert!(can_edit_devices(&with_role(Role::Manager, org)));
        assert!(!can_edit_devices(&with_role(Role::Viewer, org)));

        let no_profile = Principal { user_id: Uuid::new_v4(), is_global_admin: false, profile: None };
        assert!(!can_edit_devices(&no_profile));
    }

    #[test]
    fn view_all_organizations_via_either_grant() {
        let org = Some(Uuid::new_v4());
        assert!(can_view_all_organizations(&with_role(Role::Admin, org)));
        assert!(!can_view_all_organizations(&with_role(Role::Manager, org)));
        assert!(!can_view_all_organizations(&with_role(Role::Viewer, org)));

        let superuser = Principal { user_id: Uuid::new_v4(), is_global_admin: true, profile: None };
        assert!(can_view_all_organizations(&superuser));
    }

    #[test]
    fn organization_access_requires_a_home_organization() {
        let org = Uuid::new_v4();
        assert!(has_organization_access(&with_role(Role::Viewer, Some(org)), org));
        assert!(!has_organization_access(&with_role(Role::Viewer, Some(Uuid::new_v4())), org));
        // Unassigned profile never gains access, whatever the target
        assert!(!has_organization_access(&with_role(Role::Admin, None), org));
    }
}
