use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::access::Principal;
use crate::actions::BulkActionExecutor;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::services::LoggingExportSink;

use super::resolve_entity;

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    pub action: String,
    pub ids: Vec<Uuid>,
}

/// POST /api/admin/:entity/actions - run a bulk action over selected ids.
/// WARNING-level outcomes mean the action was halted with no effects; the
/// admin layer surfaces the message and stops.
pub async fn actions_post(
    Path(entity): Path<String>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<ActionRequest>,
) -> Result<Json<Value>, ApiError> {
    let kind = resolve_entity(&entity)?;

    let pool = DatabaseManager::pool().await?;
    let executor = BulkActionExecutor::new(pool, Arc::new(LoggingExportSink));

    let outcome = executor
        .execute(&principal, kind, &request.action, &request.ids)
        .await?;

    Ok(Json(json!({ "success": true, "data": outcome })))
}
