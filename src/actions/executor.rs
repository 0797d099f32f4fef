use std::sync::Arc;

use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::access::{roles, scope::visible_scope, Principal, ScopePredicate};
use crate::database::repository::{count_ids_in_scope, scoped_where};
use crate::services::ExportSink;
use crate::types::EntityKind;

use super::{ActionError, ActionOutcome, BulkAction, Mutation};

/// Applies validated bulk actions to a scoped record set.
///
/// Gate order: selection preconditions, then role policy, then scope. A
/// request naming any id outside the
/// principal's visible scope fails as a whole; out-of-scope rows are never
/// mutated and the error does not reveal whether those ids exist. Mutations
/// run as one UPDATE inside a transaction, so the batch applies entirely or
/// not at all.
pub struct BulkActionExecutor {
    pool: PgPool,
    export_sink: Arc<dyn ExportSink>,
}

impl BulkActionExecutor {
    pub fn new(pool: PgPool, export_sink: Arc<dyn ExportSink>) -> Self {
        Self { pool, export_sink }
    }

    pub async fn execute(
        &self,
        principal: &Principal,
        kind: EntityKind,
        action_name: &str,
        ids: &[Uuid],
    ) -> Result<ActionOutcome, ActionError> {
        let action = BulkAction::resolve(kind, action_name).ok_or_else(|| {
            ActionError::UnknownAction { kind, name: action_name.to_string() }
        })?;

        let mut ids = ids.to_vec();
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Err(ActionError::EmptySelection);
        }

        if let Some(halted) = action.precondition(ids.len()) {
            return Ok(halted);
        }

        // Role gate: state transitions on operational data share the
        // device-edit grant; read-only actions are open to any role.
        if action.is_mutating() && !roles::can_edit_devices(principal) {
            tracing::warn!(user_id = %principal.user_id, action = action_name, "action denied by role policy");
            return Err(ActionError::ActionDenied(format!(
                "role does not permit '{}'",
                action_name
            )));
        }

        // Scope gate: every requested id must be live and visible.
        let scope = visible_scope(principal, kind);
        let in_scope = count_ids_in_scope(&self.pool, kind, &scope, &ids).await?;
        if in_scope != ids.len() as i64 {
            tracing::warn!(
                user_id = %principal.user_id,
                requested = ids.len(),
                visible = in_scope,
                "bulk action rejected: selection crosses scope boundary"
            );
            return Err(ActionError::ScopeViolation);
        }

        if let Some(mutation) = action.mutation() {
            let affected = self.apply_update(kind, mutation, &scope, &ids).await?;
            return Ok(ActionOutcome::info(
                format!("{} {}.", affected, mutation.past_tense),
                affected,
            ));
        }

        match action {
            BulkAction::GenerateUsageReport => self.generate_usage_report(&ids).await,
            BulkAction::ExportMeasurements => self.export_measurements(&ids).await,
            _ => Err(ActionError::UnknownAction { kind, name: action_name.to_string() }),
        }
    }

    /// Single atomic UPDATE over the scoped id set. The scope predicate is
    /// part of the statement, so a record drifting out of scope between the
    /// gate and the update still cannot be touched.
    async fn apply_update(
        &self,
        kind: EntityKind,
        mutation: Mutation,
        scope: &ScopePredicate,
        ids: &[Uuid],
    ) -> Result<u64, ActionError> {
        let set_clause = mutation.set_clause;
        let (where_clause, scope_params) = scoped_where(scope);
        let query = format!(
            "UPDATE \"{}\" SET {} WHERE {} AND id = ANY(${})",
            kind.table_name(),
            set_clause,
            where_clause,
            scope_params.len() + 1
        );

        let mut tx = self.pool.begin().await?;
        let mut q = sqlx::query(&query);
        for p in &scope_params {
            q = q.bind(*p);
        }
        q = q.bind(ids);
        let result = q.execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    /// Read-only aggregation over the selected devices. The selection cap
    /// has already been enforced as a precondition.
    async fn generate_usage_report(&self, device_ids: &[Uuid]) -> Result<ActionOutcome, ActionError> {
        let rows = sqlx::query(
            "SELECT device_id, COALESCE(SUM(usage), 0) as total_usage
             FROM \"measurements\"
             WHERE deleted_at IS NULL AND device_id = ANY($1)
             GROUP BY device_id",
        )
        .bind(device_ids)
        .fetch_all(&self.pool)
        .await?;

        for row in &rows {
            let device_id: Uuid = row.try_get("device_id")?;
            let total: f64 = row.try_get("total_usage")?;
            tracing::info!(device_id = %device_id, total_kwh = total, "usage report line");
        }

        Ok(ActionOutcome::info(
            format!("Report generated for {} devices.", device_ids.len()),
            0,
        ))
    }

    async fn export_measurements(&self, ids: &[Uuid]) -> Result<ActionOutcome, ActionError> {
        let handle = self
            .export_sink
            .export_measurements(ids)
            .await
            .map_err(|e| ActionError::Export(e.to_string()))?;

        Ok(ActionOutcome::info(
            format!("Exporting {} measurements (job {}).", handle.record_count, handle.job_id),
            0,
        ))
    }
}
