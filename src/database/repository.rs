use futures::TryStreamExt;
use serde::Serialize;
use sqlx::{self, postgres::PgArguments, postgres::PgRow, FromRow, PgPool, Row};
use uuid::Uuid;

use crate::access::ScopePredicate;
use crate::database::manager::DatabaseError;
use crate::filter::{Filter, FilterData, SqlResult};
use crate::types::EntityKind;

/// Generic repository over one entity table. Every query goes through a
/// `Filter`, so the soft-delete and scope predicates are applied at the
/// query level and compose with the caller's filters and pagination.
pub struct Repository<T> {
    kind: EntityKind,
    pool: PgPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize,
{
    pub fn new(kind: EntityKind, pool: PgPool) -> Self {
        Self {
            kind,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    pub async fn list(
        &self,
        scope: &ScopePredicate,
        filter_data: FilterData,
    ) -> Result<Vec<T>, DatabaseError> {
        let has_order = filter_data.order.is_some();
        let mut filter = self.base_filter(scope)?;
        filter
            .assign(filter_data)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        if !has_order {
            let (column, ascending) = self.kind.default_order();
            filter
                .order_by(column, ascending)
                .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        }

        let sql = filter.to_sql().map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let q = bind_all(sqlx::query_as::<_, T>(&sql.query), &sql);
        let rows = q.fetch(&self.pool).try_collect().await?;
        Ok(rows)
    }

    pub async fn count(
        &self,
        scope: &ScopePredicate,
        filter_data: FilterData,
    ) -> Result<i64, DatabaseError> {
        let mut filter = self.base_filter(scope)?;
        // limit/offset do not affect counts
        filter
            .assign(FilterData { where_clause: filter_data.where_clause, ..Default::default() })
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        let sql = filter.to_count_sql().map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        let mut q = sqlx::query(&sql.query);
        for p in &sql.scope_params {
            q = q.bind(*p);
        }
        for p in &sql.params {
            q = bind_json_param(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count)
    }

    /// Detail lookup. An out-of-scope id yields None, indistinguishable from
    /// a missing or soft-deleted record.
    pub async fn find_by_id(
        &self,
        scope: &ScopePredicate,
        id: Uuid,
    ) -> Result<Option<T>, DatabaseError> {
        let (where_clause, scope_params) = scoped_where(scope);
        let query = format!(
            "SELECT * FROM \"{}\" WHERE {} AND id = ${}",
            self.kind.table_name(),
            where_clause,
            scope_params.len() + 1
        );

        let mut q = sqlx::query_as::<_, T>(&query);
        for p in &scope_params {
            q = q.bind(*p);
        }
        q = q.bind(id);
        let row = q.fetch_optional(&self.pool).await?;
        Ok(row)
    }

    fn base_filter(&self, scope: &ScopePredicate) -> Result<Filter, DatabaseError> {
        let mut filter = Filter::new(self.kind.table_name())
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;
        filter.scope(scope.clone());
        Ok(filter)
    }
}

/// How many of the requested ids are live and inside the scope. Used by the
/// bulk executor to reject requests touching records the principal cannot see.
pub(crate) async fn count_ids_in_scope(
    pool: &PgPool,
    kind: EntityKind,
    scope: &ScopePredicate,
    ids: &[Uuid],
) -> Result<i64, DatabaseError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let (where_clause, scope_params) = scoped_where(scope);
    let query = format!(
        "SELECT COUNT(*) as count FROM \"{}\" WHERE {} AND id = ANY(${})",
        kind.table_name(),
        where_clause,
        scope_params.len() + 1
    );

    let mut q = sqlx::query(&query);
    for p in &scope_params {
        q = q.bind(*p);
    }
    q = q.bind(ids);
    let row = q.fetch_one(pool).await?;
    let count: i64 = row.try_get("count")?;
    Ok(count)
}

/// Soft-delete plus scope, rendered for hand-built queries
pub(crate) fn scoped_where(scope: &ScopePredicate) -> (String, Vec<Uuid>) {
    let mut clauses = vec!["\"deleted_at\" IS NULL".to_string()];
    let mut scope_params = vec![];
    if let Some((clause, params)) = scope.to_sql(0) {
        clauses.push(clause);
        scope_params = params;
    }
    (clauses.join(" AND "), scope_params)
}

fn bind_all<'q, O>(
    mut q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    sql: &'q SqlResult,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    for p in &sql.scope_params {
        q = q.bind(*p);
    }
    for p in &sql.params {
        q = bind_json_param_as(q, p);
    }
    q
}

fn bind_json_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q serde_json::Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    use serde_json::Value;
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()), // JSONB
    }
}

fn bind_json_param_as<'q, O>(
    q: sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>,
    v: &'q serde_json::Value,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, PgArguments>
where
    O: for<'r> FromRow<'r, PgRow>,
{
    use serde_json::Value;
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
