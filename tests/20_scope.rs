use uuid::Uuid;

use ecowatch_api::access::{scope::visible_scope, Principal, ProfileClaims, ScopePredicate};
use ecowatch_api::filter::Filter;
use ecowatch_api::types::{EntityKind, Role};

// These tests verify the scope predicate end to end: from principal claims
// down to the SQL text the query layer would execute.

fn member(role: Role, org: Uuid) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        is_global_admin: false,
        profile: Some(ProfileClaims { role, organization_id: Some(org) }),
    }
}

#[test]
fn organization_member_queries_are_fenced_to_their_organization() {
    let org = Uuid::new_v4();
    let p = member(Role::Viewer, org);

    let scope = visible_scope(&p, EntityKind::Device);
    let mut filter = Filter::new("devices").unwrap();
    filter.scope(scope);

    let sql = filter.to_sql().unwrap();
    assert!(sql.query.contains("organization_id = $1"));
    assert_eq!(sql.scope_params, vec![org]);
    // The organization id travels as a bind parameter, never inline
    assert!(!sql.query.contains(&org.to_string()));
}

#[test]
fn measurement_queries_reach_the_organization_through_the_device() {
    let org = Uuid::new_v4();
    let p = member(Role::Operator, org);

    let scope = visible_scope(&p, EntityKind::Measurement);
    let mut filter = Filter::new("measurements").unwrap();
    filter.scope(scope);

    let sql = filter.to_sql().unwrap();
    assert!(sql.query.contains("device_id IN (SELECT id FROM \"devices\""));
    // The subquery also hides soft-deleted devices
    assert!(sql.query.contains("deleted_at IS NULL)"));
    assert_eq!(sql.scope_params, vec![org]);
}

#[test]
fn profileless_principal_sees_no_operational_rows() {
    let p = Principal { user_id: Uuid::new_v4(), is_global_admin: false, profile: None };

    for (kind, table) in [
        (EntityKind::Device, "devices"),
        (EntityKind::Measurement, "measurements"),
        (EntityKind::Alert, "alerts"),
    ] {
        let scope = visible_scope(&p, kind);
        assert_eq!(scope, ScopePredicate::Nothing);

        let mut filter = Filter::new(table).unwrap();
        filter.scope(scope);
        let sql = filter.to_sql().unwrap();
        assert!(sql.query.contains("FALSE"), "expected FALSE clause in: {}", sql.query);
    }
}

#[test]
fn global_admin_queries_carry_no_scope_clause() {
    let p = Principal { user_id: Uuid::new_v4(), is_global_admin: true, profile: None };

    let scope = visible_scope(&p, EntityKind::Alert);
    let mut filter = Filter::new("alerts").unwrap();
    filter.scope(scope);

    let sql = filter.to_sql().unwrap();
    // Only the soft-delete predicate remains
    assert_eq!(sql.query, "SELECT * FROM \"alerts\" WHERE \"deleted_at\" IS NULL");
    assert!(sql.scope_params.is_empty());
}

#[test]
fn admin_role_is_scoped_like_any_other_member() {
    let org = Uuid::new_v4();
    let p = member(Role::Admin, org);
    assert_eq!(visible_scope(&p, EntityKind::Device), ScopePredicate::Organization(org));
}

#[test]
fn master_data_is_unscoped_for_every_principal() {
    let org = Uuid::new_v4();
    for p in [
        member(Role::Viewer, org),
        Principal { user_id: Uuid::new_v4(), is_global_admin: false, profile: None },
    ] {
        for kind in [EntityKind::Organization, EntityKind::Category, EntityKind::Zone] {
            assert_eq!(visible_scope(&p, kind), ScopePredicate::Unrestricted);
        }
    }
}

#[test]
fn scope_and_caller_filters_share_one_parameter_sequence() {
    let org = Uuid::new_v4();
    let p = member(Role::Manager, org);

    let mut filter = Filter::new("devices").unwrap();
    filter.scope(visible_scope(&p, EntityKind::Device));
    filter.where_clause(serde_json::json!({ "state": "ACTIVE" })).unwrap();
    filter.order_by("name", true).unwrap();

    let sql = filter.to_sql().unwrap();
    assert!(sql.query.contains("organization_id = $1"));
    assert!(sql.query.contains("\"state\" = $2"));
    assert!(sql.query.contains("ORDER BY \"name\" ASC"));
    assert_eq!(sql.scope_params.len() + sql.params.len(), 2);
}
