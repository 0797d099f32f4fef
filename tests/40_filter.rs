use serde_json::json;
use uuid::Uuid;

use ecowatch_api::access::ScopePredicate;
use ecowatch_api::filter::{DeletionVisibility, Filter, FilterData};

// Filter surface tests: the full FilterData assignment path the list
// endpoint uses, including pagination caps and soft-delete visibility.

#[test]
fn assign_applies_where_order_and_pagination_together() {
    let mut filter = Filter::new("devices").unwrap();
    filter
        .assign(FilterData {
            where_clause: Some(json!({ "state": "ACTIVE", "max_usage": { "$lte": 500 } })),
            order: Some(json!("name asc")),
            limit: Some(25),
            offset: Some(50),
        })
        .unwrap();

    let sql = filter.to_sql().unwrap();
    // WHERE keys iterate alphabetically, so max_usage takes the first slot
    assert!(sql.query.contains("\"max_usage\" <= $1"));
    assert!(sql.query.contains("\"state\" = $2"));
    assert!(sql.query.contains("ORDER BY \"name\" ASC"));
    assert!(sql.query.ends_with("LIMIT 25 OFFSET 50"));
    assert_eq!(sql.params, vec![json!(500), json!("ACTIVE")]);
}

#[test]
fn limits_are_capped_to_the_configured_maximum() {
    let max = ecowatch_api::config::config().api.max_page_size;

    let mut filter = Filter::new("measurements").unwrap();
    filter.limit(max + 1000, None).unwrap();

    let sql = filter.to_sql().unwrap();
    assert!(sql.query.ends_with(&format!("LIMIT {}", max)));
}

#[test]
fn count_query_drops_ordering_and_pagination() {
    let mut filter = Filter::new("alerts").unwrap();
    filter
        .assign(FilterData {
            where_clause: Some(json!({ "is_resolved": false })),
            order: Some(json!("date desc")),
            limit: Some(10),
            offset: Some(20),
        })
        .unwrap();

    let sql = filter.to_count_sql().unwrap();
    assert!(sql.query.starts_with("SELECT COUNT(*) as count FROM \"alerts\""));
    assert!(!sql.query.contains("ORDER BY"));
    assert!(!sql.query.contains("LIMIT"));
    assert!(sql.query.contains("\"is_resolved\" = $1"));
}

#[test]
fn deleted_rows_can_be_included_explicitly() {
    let mut filter = Filter::new("organizations").unwrap();
    filter.deletion(DeletionVisibility::Include);

    let sql = filter.to_sql().unwrap();
    assert_eq!(sql.query, "SELECT * FROM \"organizations\"");
}

#[test]
fn scope_parameters_bind_ahead_of_filter_parameters() {
    let org = Uuid::new_v4();
    let mut filter = Filter::new("devices").unwrap();
    filter.scope(ScopePredicate::Organization(org));
    filter
        .where_clause(json!({ "zone_id": { "$null": false }, "state": "INACTIVE" }))
        .unwrap();

    let sql = filter.to_sql().unwrap();
    assert!(sql.query.contains("organization_id = $1"));
    // $null renders inline; the remaining filter param takes the next slot
    assert!(sql.query.contains("\"zone_id\" IS NOT NULL"));
    assert!(sql.query.contains("\"state\" = $2"));
    assert_eq!(sql.scope_params, vec![org]);
    assert_eq!(sql.params, vec![json!("INACTIVE")]);
}

#[test]
fn malformed_filters_are_rejected() {
    let mut filter = Filter::new("devices").unwrap();
    assert!(filter.where_clause(json!("not an object")).is_err());
    assert!(filter.where_clause(json!({ "name; DROP TABLE": 1 })).is_err());
    assert!(filter.limit(-1, None).is_err());
    assert!(filter.limit(10, Some(-5)).is_err());
}
