use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::info;

use crate::Result;
use crate::traits::{RecordBatch, RecordSink};

/// Writes each batch as pretty JSON to `{dir}/{table}/{label}.json`,
/// overwriting the previous run's file.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, batch: &RecordBatch) -> PathBuf {
        self.dir
            .join(&batch.table)
            .join(format!("{}.json", batch.label.to_lowercase()))
    }
}

#[async_trait::async_trait]
impl RecordSink for JsonFileSink {
    async fn persist(&self, batch: &RecordBatch) -> Result<u64> {
        let path = self.path_for(batch);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(batch)?;
        fs::write(&path, json).await?;

        info!(
            label = %batch.label,
            path = %path.display(),
            records = batch.len(),
            "batch written"
        );
        Ok(batch.len() as u64)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// Reads back a batch written by [`JsonFileSink`].
pub async fn read_batch(path: &Path) -> Result<RecordBatch> {
    let bytes = fs::read(path).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
