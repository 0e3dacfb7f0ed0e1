use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub event_id: i64,
    pub event_name: String,
    pub track: String,
    pub event_type: String,
    pub source: String,
    pub start_date: chrono::NaiveDate,
    pub end_date: Option<chrono::NaiveDate>,
    pub completed: i16,
    pub updated_at: chrono::NaiveDateTime,
}
