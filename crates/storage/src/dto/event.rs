use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// A validated race-weekend entry ready to be written to the `events` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_date_order"))]
pub struct NewEvent {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 100))]
    pub track: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100))]
    pub event_type: String,

    pub start_date: NaiveDate,

    /// `None` for single-day events.
    pub end_date: Option<NaiveDate>,

    /// Stored and serialized as `0`/`1`.
    #[serde(with = "bool_as_int")]
    pub completed: bool,
}

/// The error names the offending field in its `field` param, since schema
/// errors are filed under `__all__`.
fn validate_date_order(event: &NewEvent) -> Result<(), ValidationError> {
    match event.end_date {
        Some(end) if end < event.start_date => {
            let mut error = ValidationError::new("not_before_start");
            error.add_param("field".into(), &"end_date");
            error.add_param("value".into(), &end);
            Err(error)
        }
        _ => Ok(()),
    }
}

mod bool_as_int {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(D::Error::custom(format!(
                "completed must be 0 or 1, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> NewEvent {
        NewEvent {
            name: "GRAND PRIX OF QATAR".to_string(),
            track: "LUSAIL INTERNATIONAL CIRCUIT".to_string(),
            event_type: "GP".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 3, 24).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2023, 3, 26),
            completed: true,
        }
    }

    #[test]
    fn test_completed_serializes_as_integer() {
        let json = serde_json::to_value(event()).unwrap();
        assert_eq!(json["completed"], 1);
        assert_eq!(json["type"], "GP");
    }

    #[test]
    fn test_serde_round_trip() {
        let original = event();
        let json = serde_json::to_string(&original).unwrap();
        let parsed: NewEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_completed_rejects_other_integers() {
        let mut json = serde_json::to_value(event()).unwrap();
        json["completed"] = 2.into();
        assert!(serde_json::from_value::<NewEvent>(json).is_err());
    }

    #[test]
    fn test_end_before_start_fails_validation() {
        let mut e = event();
        e.end_date = NaiveDate::from_ymd_opt(2023, 3, 20);
        let errors = e.validate().unwrap_err();
        let all = errors.field_errors();
        let error = &all["__all__"][0];
        assert_eq!(error.code, "not_before_start");
        assert_eq!(error.params["field"], "end_date");
        assert_eq!(error.params["value"], "2023-03-20");
    }

    #[test]
    fn test_same_day_end_is_valid() {
        let mut e = event();
        e.end_date = Some(e.start_date);
        assert!(e.validate().is_ok());
    }

    #[test]
    fn test_empty_track_fails_validation() {
        let mut e = event();
        e.track = String::new();
        assert!(e.validate().is_err());
    }
}
