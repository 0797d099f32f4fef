use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Handle for an export delegated to the external export collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJobHandle {
    pub job_id: Uuid,
    pub record_count: usize,
    pub submitted_at: DateTime<Utc>,
}

/// Seam for the measurement export collaborator. The core validates scope
/// and then hands the id set over; file formats and delivery live behind
/// this trait.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn export_measurements(&self, ids: &[Uuid]) -> anyhow::Result<ExportJobHandle>;
}

/// Default sink: records the request and returns a handle. Stands in until
/// a real export backend is wired up.
pub struct LoggingExportSink;

#[async_trait]
impl ExportSink for LoggingExportSink {
    async fn export_measurements(&self, ids: &[Uuid]) -> anyhow::Result<ExportJobHandle> {
        let handle = ExportJobHandle {
            job_id: Uuid::new_v4(),
            record_count: ids.len(),
            submitted_at: Utc::now(),
        };
        tracing::info!(job_id = %handle.job_id, count = ids.len(), "queued measurement export");
        Ok(handle)
    }
}
