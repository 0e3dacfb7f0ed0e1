use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rider {
    pub rider_id: i64,
    pub rider_name: String,
    pub hashtag: String,
    pub race_number: i16,
    pub team: Option<String>,
    pub bike: Option<String>,
    pub gp_class: String,
    pub country: String,
    pub place_of_birth: Option<String>,
    pub date_of_birth: Option<chrono::NaiveDate>,
    pub height_cm: Option<i16>,
    pub weight_kg: Option<i16>,
    pub updated_at: chrono::NaiveDateTime,
}
