use std::collections::HashMap;

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::access::{scope::visible_scope, Principal, ScopePredicate};
use crate::database::manager::DatabaseManager;
use crate::database::models::{
    alert::Alert, device::Device, measurement::Measurement, organization::Organization,
    taxonomy::Category, taxonomy::Zone, user_profile::UserProfile,
};
use crate::database::repository::Repository;
use crate::error::ApiError;
use crate::filter::FilterData;
use crate::types::EntityKind;

use super::resolve_entity;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// JSON-encoded WHERE object, e.g. `{"state":"ACTIVE"}`
    #[serde(rename = "where")]
    pub where_clause: Option<String>,
    /// Order spec, e.g. `date desc, name`
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    fn into_filter_data(self) -> Result<FilterData, ApiError> {
        let where_clause = match self.where_clause {
            Some(raw) => Some(
                serde_json::from_str(&raw)
                    .map_err(|e| ApiError::bad_request(format!("Invalid where clause: {}", e)))?,
            ),
            None => None,
        };
        let limit = self.limit.or(Some(crate::config::config().api.default_page_size));
        Ok(FilterData {
            where_clause,
            order: self.order.map(Value::String),
            limit,
            offset: self.offset,
        })
    }
}

/// GET /api/admin/:entity - scoped, filtered, paginated list
pub async fn entity_list(
    Path(entity): Path<String>,
    Query(query): Query<ListQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_entity(&entity)?;
    let filter_data = query.into_filter_data()?;

    let pool = DatabaseManager::pool().await?;
    let scope = visible_scope(&principal, kind);

    let (mut rows, total) = fetch_rows(kind, &scope, filter_data, &pool).await?;

    // List-surface rollup: device counts per master-data row, computed
    // against the caller's device scope so the numbers never reveal other
    // organizations' fleets.
    if let Some(fk_column) = device_rollup_column(kind) {
        let device_scope = visible_scope(&principal, EntityKind::Device);
        let counts = device_counts_by(&pool, fk_column, &device_scope).await?;
        for row in &mut rows {
            if let Value::Object(map) = row {
                let count = map
                    .get("id")
                    .and_then(|v| v.as_str())
                    .and_then(|s| Uuid::parse_str(s).ok())
                    .and_then(|id| counts.get(&id))
                    .copied()
                    .unwrap_or(0);
                map.insert("device_count".to_string(), json!(count));
            }
        }
    }

    Ok(Json(json!({
        "success": true,
        "data": rows,
        "total": total,
    })))
}

/// GET /api/admin/:entity/:id - detail; an out-of-scope id behaves exactly
/// like a missing one
pub async fn entity_detail(
    Path((entity, id)): Path<(String, String)>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_entity(&entity)?;
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::bad_request("Invalid UUID"))?;

    let pool = DatabaseManager::pool().await?;
    let scope = visible_scope(&principal, kind);

    let row = fetch_one(kind, &scope, id, &pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Record not found"))?;

    Ok(Json(json!({ "success": true, "data": row })))
}

async fn fetch_rows(
    kind: EntityKind,
    scope: &ScopePredicate,
    filter_data: FilterData,
    pool: &PgPool,
) -> Result<(Vec<Value>, i64), ApiError> {
    match kind {
        EntityKind::Organization => fetch_as::<Organization>(kind, scope, filter_data, pool).await,
        EntityKind::Category => fetch_as::<Category>(kind, scope, filter_data, pool).await,
        EntityKind::Zone => fetch_as::<Zone>(kind, scope, filter_data, pool).await,
        EntityKind::Device => fetch_as::<Device>(kind, scope, filter_data, pool).await,
        EntityKind::Measurement => fetch_as::<Measurement>(kind, scope, filter_data, pool).await,
        EntityKind::Alert => fetch_as::<Alert>(kind, scope, filter_data, pool).await,
        EntityKind::UserProfile => fetch_as::<UserProfile>(kind, scope, filter_data, pool).await,
    }
}

async fn fetch_as<T>(
    kind: EntityKind,
    scope: &ScopePredicate,
    filter_data: FilterData,
    pool: &PgPool,
) -> Result<(Vec<Value>, i64), ApiError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin + serde::Serialize,
{
    let repo = Repository::<T>::new(kind, pool.clone());
    let total = repo.count(scope, filter_data.clone()).await?;
    let rows = repo.list(scope, filter_data).await?;
    let values = rows
        .into_iter()
        .map(|r| serde_json::to_value(r))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            tracing::error!("Failed to serialize rows: {}", e);
            ApiError::internal_server_error("Failed to format response")
        })?;
    Ok((values, total))
}

async fn fetch_one(
    kind: EntityKind,
    scope: &ScopePredicate,
    id: Uuid,
    pool: &PgPool,
) -> Result<Option<Value>, ApiError> {
    match kind {
        EntityKind::Organization => fetch_one_as::<Organization>(kind, scope, id, pool).await,
        EntityKind::Category => fetch_one_as::<Category>(kind, scope, id, pool).await,
        EntityKind::Zone => fetch_one_as::<Zone>(kind, scope, id, pool).await,
        EntityKind::Device => fetch_one_as::<Device>(kind, scope, id, pool).await,
        EntityKind::Measurement => fetch_one_as::<Measurement>(kind, scope, id, pool).await,
        EntityKind::Alert => fetch_one_as::<Alert>(kind, scope, id, pool).await,
        EntityKind::UserProfile => fetch_one_as::<UserProfile>(kind, scope, id, pool).await,
    }
}

async fn fetch_one_as<T>(
    kind: EntityKind,
    scope: &ScopePredicate,
    id: Uuid,
    pool: &PgPool,
) -> Result<Option<Value>, ApiError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin + serde::Serialize,
{
    let repo = Repository::<T>::new(kind, pool.clone());
    let row = repo.find_by_id(scope, id).await?;
    match row {
        Some(r) => {
            let value = serde_json::to_value(r).map_err(|e| {
                tracing::error!("Failed to serialize row: {}", e);
                ApiError::internal_server_error("Failed to format response")
            })?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

fn device_rollup_column(kind: EntityKind) -> Option<&'static str> {
    match kind {
        EntityKind::Organization => Some("organization_id"),
        EntityKind::Category => Some("category_id"),
        EntityKind::Zone => Some("zone_id"),
        _ => None,
    }
}

async fn device_counts_by(
    pool: &PgPool,
    fk_column: &str,
    device_scope: &ScopePredicate,
) -> Result<HashMap<Uuid, i64>, ApiError> {
    let (where_clause, scope_params) = crate::database::repository::scoped_where(device_scope);
    let query = format!(
        "SELECT \"{}\" as key, COUNT(*) as count FROM \"devices\" WHERE {} GROUP BY \"{}\"",
        fk_column, where_clause, fk_column
    );

    let mut q = sqlx::query(&query);
    for p in &scope_params {
        q = q.bind(*p);
    }
    let rows = q
        .fetch_all(pool)
        .await
        .map_err(crate::database::manager::DatabaseError::from)?;

    let mut counts = HashMap::new();
    for row in rows {
        let key: Uuid = row.try_get("key").map_err(crate::database::manager::DatabaseError::from)?;
        let count: i64 = row.try_get("count").map_err(crate::database::manager::DatabaseError::from)?;
        counts.insert(key, count);
    }
    Ok(counts)
}
