use serde::{Deserialize, Serialize};
use storage::dto::{NewEvent, NewRider};
use storage::{EVENTS_TABLE, RIDERS_TABLE};
use validator::Validate;

use crate::Result;
use crate::class::GpClass;
use crate::validate::{Entity, Rejection};

/// Validated records of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
pub enum Records {
    Riders(Vec<NewRider>),
    Events(Vec<NewEvent>),
}

impl Records {
    pub fn len(&self) -> usize {
        match self {
            Self::Riders(riders) => riders.len(),
            Self::Events(events) => events.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Re-checks records that arrive from outside the pipeline, such as a
    /// batch read back from disk. Stops at the first rejection.
    pub fn validate(&self) -> std::result::Result<(), Rejection> {
        match self {
            Self::Riders(riders) => riders
                .iter()
                .try_for_each(|rider| rider.validate())
                .map_err(|errors| Rejection::from_errors(Entity::Rider, &errors)),
            Self::Events(events) => events
                .iter()
                .try_for_each(|event| event.validate())
                .map_err(|errors| Rejection::from_errors(Entity::Event, &errors)),
        }
    }
}

/// What the pipeline hands to a [`RecordSink`]: records tagged with the
/// entity-class label and the table they belong in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordBatch {
    /// GP class for riders (`MOTOGP`), calendar label for events (`calendar-2024`).
    pub label: String,
    pub table: String,
    pub records: Records,
}

impl RecordBatch {
    pub fn riders(class: GpClass, riders: Vec<NewRider>) -> Self {
        Self {
            label: class.as_str().to_string(),
            table: RIDERS_TABLE.to_string(),
            records: Records::Riders(riders),
        }
    }

    pub fn events(label: impl Into<String>, events: Vec<NewEvent>) -> Self {
        Self {
            label: label.into(),
            table: EVENTS_TABLE.to_string(),
            records: Records::Events(events),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Persistence boundary. Implementations own insert semantics and connections;
/// re-persisting the same batch overwrites rather than duplicates.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Returns the number of rows written.
    async fn persist(&self, batch: &RecordBatch) -> Result<u64>;

    fn name(&self) -> &'static str;
}

/// Blob boundary for raw fetch output, keyed by `/`-separated paths.
#[async_trait::async_trait]
pub trait ArchiveStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Keys under `prefix`, sorted.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn event(start: u32, end: u32) -> NewEvent {
        NewEvent {
            name: "GRAND PRIX OF ITALY".to_string(),
            track: "AUTODROMO DEL MUGELLO".to_string(),
            event_type: "GP".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 5, start).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 5, end),
            completed: false,
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_events() {
        let records = Records::Events(vec![event(31, 31), event(10, 12)]);
        assert!(records.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_end_before_start() {
        let records = Records::Events(vec![event(10, 12), event(31, 2)]);
        assert_eq!(
            records.validate().unwrap_err(),
            Rejection::invalid(Entity::Event, "end_date", "not_before_start", "2024-05-02")
        );
    }

    #[test]
    fn test_batch_from_json_is_rechecked() {
        let json = serde_json::json!({
            "label": "calendar-2024",
            "table": "events",
            "records": {"kind": "events", "items": [{
                "name": "GRAND PRIX OF ITALY",
                "track": "AUTODROMO DEL MUGELLO",
                "type": "GP",
                "start_date": "2024-05-31",
                "end_date": "2024-05-02",
                "completed": 0
            }]}
        });
        let batch: RecordBatch = serde_json::from_value(json).unwrap();
        let rejection = batch.records.validate().unwrap_err();
        assert_eq!(rejection.constraint, "not_before_start");
    }
}
