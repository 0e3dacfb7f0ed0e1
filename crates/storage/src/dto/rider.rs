use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A validated rider ready to be written to the `riders` table.
///
/// Legends carry no bike, height or weight: their bio tables do not list them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NewRider {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 16))]
    pub hashtag: String,

    #[validate(range(min = 0, max = 99))]
    pub race_number: i16,

    #[validate(length(max = 100))]
    pub team: Option<String>,

    #[validate(length(max = 100))]
    pub bike: Option<String>,

    #[validate(custom(function = "validate_iso2"))]
    pub country: String,

    #[validate(length(max = 100))]
    pub place_of_birth: Option<String>,

    pub date_of_birth: Option<NaiveDate>,

    #[validate(range(min = 152, max = 200))]
    pub height_cm: Option<i16>,

    #[validate(range(min = 40, max = 115))]
    pub weight_kg: Option<i16>,
}

fn validate_iso2(country: &str) -> Result<(), validator::ValidationError> {
    if country.len() == 2 && country.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("iso2");
        error.add_param("value".into(), &country);
        Err(error)
    }
}
