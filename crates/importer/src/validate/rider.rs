use storage::dto::NewRider;
use tracing::error;
use validator::Validate;

use super::{Entity, Rejection, parse_date};
use crate::parse::RiderFields;

fn required<T>(value: Option<T>, field: &str) -> Result<T, Rejection> {
    value.ok_or_else(|| Rejection::missing(Entity::Rider, field))
}

fn small_int(value: u32, field: &str) -> Result<i16, Rejection> {
    i16::try_from(value)
        .map_err(|_| Rejection::invalid(Entity::Rider, field, "range", value.to_string()))
}

fn build(fields: RiderFields) -> Result<NewRider, Rejection> {
    let name = required(fields.name, "name")?;
    let hashtag = required(fields.hashtag, "hashtag")?;
    let race_number = small_int(required(fields.race_number, "race_number")?, "race_number")?;

    let country = match (fields.country, fields.country_name) {
        (Some(code), _) => code,
        (None, Some(text)) => {
            return Err(Rejection::invalid(Entity::Rider, "country", "iso2", text));
        }
        (None, None) => return Err(Rejection::missing(Entity::Rider, "country")),
    };

    let date_of_birth = match fields.date_of_birth {
        Some(text) => Some(parse_date(&text).ok_or_else(|| {
            Rejection::invalid(Entity::Rider, "date_of_birth", "date", text)
        })?),
        None => None,
    };

    let rider = NewRider {
        name,
        hashtag,
        race_number,
        team: fields.team,
        bike: fields.bike,
        country,
        place_of_birth: fields.place_of_birth,
        date_of_birth,
        height_cm: fields.height_cm.map(|v| small_int(v, "height_cm")).transpose()?,
        weight_kg: fields.weight_kg.map(|v| small_int(v, "weight_kg")).transpose()?,
    };

    rider
        .validate()
        .map_err(|errors| Rejection::from_errors(Entity::Rider, &errors))?;
    Ok(rider)
}

/// Validates one rider's fields into an insertable record.
pub fn validate_rider(fields: RiderFields) -> Result<NewRider, Rejection> {
    let name = fields.name.clone();
    build(fields).inspect_err(|rejection| {
        error!(
            entity = %rejection.entity,
            rider = name.as_deref().unwrap_or("<unnamed>"),
            field = %rejection.field,
            constraint = %rejection.constraint,
            value = rejection.value.as_deref().unwrap_or("<absent>"),
            "record rejected"
        );
    })
}

/// Validates a whole batch, stopping at the first rejection.
pub fn validate_riders(batch: Vec<RiderFields>) -> Result<Vec<NewRider>, Rejection> {
    batch.into_iter().map(validate_rider).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fields() -> RiderFields {
        RiderFields {
            name: Some("JORGE MARTIN".to_string()),
            hashtag: Some("#JM89".to_string()),
            race_number: Some(89),
            team: Some("PRIMA PRAMAC RACING".to_string()),
            bike: Some("DUCATI".to_string()),
            country: Some("ES".to_string()),
            country_name: Some("SPAIN".to_string()),
            place_of_birth: Some("MADRID".to_string()),
            date_of_birth: Some("29/01/1998".to_string()),
            height_cm: Some(168),
            weight_kg: Some(63),
            legend: false,
        }
    }

    #[test]
    fn test_valid_rider() {
        let rider = validate_rider(fields()).unwrap();
        assert_eq!(rider.race_number, 89);
        assert_eq!(rider.country, "ES");
        assert_eq!(rider.date_of_birth, NaiveDate::from_ymd_opt(1998, 1, 29));
        assert_eq!(rider.height_cm, Some(168));
    }

    #[test]
    fn test_race_number_boundaries() {
        for (number, ok) in [(0, true), (99, true), (100, false)] {
            let mut f = fields();
            f.race_number = Some(number);
            let result = validate_rider(f);
            assert_eq!(result.is_ok(), ok, "race_number {number}");
            if let Err(rejection) = result {
                assert_eq!(rejection.field, "race_number");
                assert_eq!(rejection.value.as_deref(), Some("100"));
            }
        }
    }

    #[test]
    fn test_height_boundaries() {
        for (height, ok) in [(152, true), (200, true), (151, false), (201, false)] {
            let mut f = fields();
            f.height_cm = Some(height);
            assert_eq!(validate_rider(f).is_ok(), ok, "height {height}");
        }
    }

    #[test]
    fn test_missing_race_number_is_rejected() {
        let mut f = fields();
        f.race_number = None;
        assert_eq!(
            validate_rider(f).unwrap_err(),
            Rejection::missing(Entity::Rider, "race_number")
        );
    }

    #[test]
    fn test_unrecognized_country_is_rejected_with_text() {
        let mut f = fields();
        f.country = None;
        f.country_name = Some("ATLANTIS".to_string());
        assert_eq!(
            validate_rider(f).unwrap_err(),
            Rejection::invalid(Entity::Rider, "country", "iso2", "ATLANTIS")
        );
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let mut f = fields();
        f.date_of_birth = Some("31/02/1998".to_string());
        let rejection = validate_rider(f).unwrap_err();
        assert_eq!(rejection.field, "date_of_birth");
        assert_eq!(rejection.constraint, "date");
    }

    #[test]
    fn test_oversized_measurement_is_rejected_not_wrapped() {
        let mut f = fields();
        f.weight_kg = Some(70_000);
        let rejection = validate_rider(f).unwrap_err();
        assert_eq!(rejection.field, "weight_kg");
    }

    #[test]
    fn test_batch_fails_on_first_rejection() {
        let mut bad = fields();
        bad.name = None;
        let result = validate_riders(vec![fields(), bad, fields()]);
        assert_eq!(result.unwrap_err(), Rejection::missing(Entity::Rider, "name"));

        let ok = validate_riders(vec![fields(), fields()]).unwrap();
        assert_eq!(ok.len(), 2);
    }
}
