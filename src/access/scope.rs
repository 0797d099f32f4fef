//! Organization scoping policy.
//!
//! `visible_scope` is a pure function of (principal, entity kind). It returns
//! a predicate that the query layer renders as a parameterized SQL fragment,
//! so scoping composes with search, ordering, and pagination instead of
//! post-filtering rows. Soft deletion is a separate predicate applied by the
//! filter layer; the two are AND-ed independently.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{EntityKind, Role};

/// The acting identity for one request, decoded from JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    /// Superuser flag. The only grant that widens `visible_scope`.
    pub is_global_admin: bool,
    pub profile: Option<ProfileClaims>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileClaims {
    pub role: Role,
    pub organization_id: Option<Uuid>,
}

impl Principal {
    /// Home organization, if the principal has a configured profile
    pub fn organization_id(&self) -> Option<Uuid> {
        self.profile.as_ref().and_then(|p| p.organization_id)
    }

    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().map(|p| p.role)
    }
}

/// How an entity kind reaches its owning organization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeStrategy {
    /// Master data and globally administered records: never scoped
    None,
    /// Entity carries an organization_id column
    Direct,
    /// Entity reaches its organization through its device reference
    Indirect,
}

impl ScopeStrategy {
    pub fn for_kind(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Device => ScopeStrategy::Direct,
            EntityKind::Measurement | EntityKind::Alert => ScopeStrategy::Indirect,
            EntityKind::Organization
            | EntityKind::Category
            | EntityKind::Zone
            | EntityKind::UserProfile => ScopeStrategy::None,
        }
    }
}

/// Filter selecting exactly the records a principal may see for one kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopePredicate {
    /// All records (still subject to the soft-delete predicate)
    Unrestricted,
    /// Rows whose organization_id matches
    Organization(Uuid),
    /// Rows whose parent device belongs to the organization
    DeviceOrganization(Uuid),
    /// Matches no records at all
    Nothing,
}

/// Compute the visible record set for a principal and entity kind.
///
/// A principal with no profile, or a profile with no organization, sees no
/// operational data: absence of an explicit scope always fails closed.
pub fn visible_scope(principal: &Principal, kind: EntityKind) -> ScopePredicate {
    if principal.is_global_admin {
        return ScopePredicate::Unrestricted;
    }

    if ScopeStrategy::for_kind(kind) == ScopeStrategy::None {
        return ScopePredicate::Unrestricted;
    }

    let Some(org_id) = principal.organization_id() else {
        return ScopePredicate::Nothing;
    };

    match ScopeStrategy::for_kind(kind) {
        ScopeStrategy::Direct => ScopePredicate::Organization(org_id),
        ScopeStrategy::Indirect => ScopePredicate::DeviceOrganization(org_id),
        ScopeStrategy::None => ScopePredicate::Unrestricted,
    }
}

impl ScopePredicate {
    /// Render as a SQL fragment with `$N` placeholders starting at
    /// `param_offset + 1`. Returns None when no clause is needed.
    pub fn to_sql(&self, param_offset: usize) -> Option<(String, Vec<Uuid>)> {
        match self {
            ScopePredicate::Unrestricted => None,
            ScopePredicate::Nothing => Some(("FALSE".to_string(), vec![])),
            ScopePredicate::Organization(org_id) => Some((
                format!("organization_id = ${}", param_offset + 1),
                vec![*org_id],
            )),
            ScopePredicate::DeviceOrganization(org_id) => Some((
                format!(
                    "device_id IN (SELECT id FROM \"devices\" WHERE organization_id = ${} AND deleted_at IS NULL)",
                    param_offset + 1
                ),
                vec![*org_id],
            )),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        matches!(self, ScopePredicate::Unrestricted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(is_global_admin: bool, profile: Option<ProfileClaims>) -> Principal {
        Principal { user_id: Uuid::new_v4(), is_global_admin, profile }
    }

    fn org_member(role: Role, org: Option<Uuid>) -> Principal {
        principal(false, Some(ProfileClaims { role, organization_id: org }))
    }

    const ALL_KINDS: [EntityKind; 7] = [
        EntityKind::Organization,
        EntityKind::Category,
        EntityKind::Zone,
        EntityKind::Device,
        EntityKind::Measurement,
        EntityKind::Alert,
        EntityKind::UserProfile,
    ];

    #[test]
    fn global_admin_is_unrestricted_for_every_kind() {
        let p = principal(true, None);
        for kind in ALL_KINDS {
            assert_eq!(visible_scope(&p, kind), ScopePredicate::Unrestricted);
        }
    }

    #[test]
    fn principal_without_profile_fails_closed_on_scoped_kinds() {
        let p = principal(false, None);
        for kind in [EntityKind::Device, EntityKind::Measurement, EntityKind::Alert] {
            assert_eq!(visible_scope(&p, kind), ScopePredicate::Nothing);
        }
    }

    #[test]
    fn principal_without_organization_fails_closed_on_scoped_kinds() {
        let p = org_member(Role::Operator, None);
        for kind in [EntityKind::Device, EntityKind::Measurement, EntityKind::Alert] {
            assert_eq!(visible_scope(&p, kind), ScopePredicate::Nothing);
        }
    }

    #[test]
    fn master_data_stays_visible_without_organization() {
        let p = org_member(Role::Viewer, None);
        for kind in [EntityKind::Organization, EntityKind::Category, EntityKind::Zone, EntityKind::UserProfile] {
            assert_eq!(visible_scope(&p, kind), ScopePredicate::Unrestricted);
        }
    }

    #[test]
    fn direct_and_indirect_scoping_use_the_same_organization() {
        let org = Uuid::new_v4();
        let p = org_member(Role::Viewer, Some(org));

        assert_eq!(visible_scope(&p, EntityKind::Device), ScopePredicate::Organization(org));
        assert_eq!(visible_scope(&p, EntityKind::Measurement), ScopePredicate::DeviceOrganization(org));
        assert_eq!(visible_scope(&p, EntityKind::Alert), ScopePredicate::DeviceOrganization(org));
    }

    #[test]
    fn admin_role_without_superuser_flag_is_still_scoped() {
        // The role-based global-view capability does not widen the scope
        // predicate; only the superuser flag does. See DESIGN.md.
        let org = Uuid::new_v4();
        let p = org_member(Role::Admin, Some(org));
        assert_eq!(visible_scope(&p, EntityKind::Device), ScopePredicate::Organization(org));
    }

    #[test]
    fn sql_fragments_parameterize_the_organization_id() {
        let org = Uuid::new_v4();

        let (clause, params) = ScopePredicate::Organization(org).to_sql(0).unwrap();
        assert_eq!(clause, "organization_id = $1");
        assert_eq!(params, vec![org]);

        let (clause, params) = ScopePredicate::DeviceOrganization(org).to_sql(2).unwrap();
        assert!(clause.contains("organization_id = $3"));
        assert!(!clause.contains(&org.to_string()));
        assert_eq!(params, vec![org]);

        assert!(ScopePredicate::Unrestricted.to_sql(0).is_none());

        let (clause, params) = ScopePredicate::Nothing.to_sql(0).unwrap();
        assert_eq!(clause, "FALSE");
        assert!(params.is_empty());
    }
}
