use sqlx::PgPool;
use storage::{EventRepository, RiderRepository, StorageError};
use tracing::{error, info};

use crate::Result;
use crate::traits::{RecordBatch, RecordSink, Records};

/// Writes batches to Postgres through the storage repositories, one
/// transaction per batch. Rider batches are keyed by their class label;
/// event batches record their label as the row's source.
pub struct PostgresSink {
    pool: PgPool,
}

impl PostgresSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn write(&self, batch: &RecordBatch) -> storage::Result<u64> {
        match &batch.records {
            Records::Riders(riders) => {
                RiderRepository::new(&self.pool)
                    .upsert_many(&batch.table, &batch.label, riders)
                    .await
            }
            Records::Events(events) => {
                EventRepository::new(&self.pool)
                    .upsert_many(&batch.table, &batch.label, events)
                    .await
            }
        }
    }
}

#[async_trait::async_trait]
impl RecordSink for PostgresSink {
    async fn persist(&self, batch: &RecordBatch) -> Result<u64> {
        let written = self.write(batch).await.map_err(|e| {
            if e.is_check_violation() || e.is_unique_violation() {
                error!(
                    label = %batch.label,
                    table = %batch.table,
                    error = %e,
                    "batch violates table constraints"
                );
                StorageError::ConstraintViolation(e.to_string())
            } else {
                e
            }
        })?;

        info!(
            label = %batch.label,
            table = %batch.table,
            rows = written,
            "batch persisted"
        );
        Ok(written)
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
