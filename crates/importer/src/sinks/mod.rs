mod json_file;
mod postgres;

pub use json_file::{JsonFileSink, read_batch};
pub use postgres::PostgresSink;

use tracing::info;

use crate::Result;
use crate::traits::{RecordBatch, RecordSink};

/// Logs batches and drops them. Used for `--dry-run`.
#[derive(Debug, Default)]
pub struct DiscardSink;

#[async_trait::async_trait]
impl RecordSink for DiscardSink {
    async fn persist(&self, batch: &RecordBatch) -> Result<u64> {
        info!(
            label = %batch.label,
            table = %batch.table,
            records = batch.len(),
            "dry run, batch not persisted"
        );
        Ok(0)
    }

    fn name(&self) -> &'static str {
        "discard"
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::sync::Mutex;

    use crate::Result;
    use crate::traits::{RecordBatch, RecordSink};

    /// Keeps every batch in memory, replacing an earlier batch with the same
    /// label and table.
    #[derive(Debug, Default)]
    pub struct MemorySink {
        batches: Mutex<Vec<RecordBatch>>,
    }

    impl MemorySink {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn batches(&self) -> Vec<RecordBatch> {
            self.batches
                .lock()
                .map(|batches| batches.clone())
                .unwrap_or_default()
        }

        pub fn batch(&self, label: &str) -> Option<RecordBatch> {
            self.batches().into_iter().find(|b| b.label == label)
        }
    }

    #[async_trait::async_trait]
    impl RecordSink for MemorySink {
        async fn persist(&self, batch: &RecordBatch) -> Result<u64> {
            let mut batches = self.batches.lock().unwrap();
            batches.retain(|b| !(b.label == batch.label && b.table == batch.table));
            batches.push(batch.clone());
            Ok(batch.len() as u64)
        }

        fn name(&self) -> &'static str {
            "memory"
        }
    }
}
