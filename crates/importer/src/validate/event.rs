use storage::dto::NewEvent;
use tracing::error;
use validator::Validate;

use super::{Entity, Rejection, parse_date};
use crate::parse::EventFields;

fn required<T>(value: Option<T>, field: &str) -> Result<T, Rejection> {
    value.ok_or_else(|| Rejection::missing(Entity::Event, field))
}

fn date(text: String, field: &str) -> Result<chrono::NaiveDate, Rejection> {
    parse_date(&text).ok_or_else(|| Rejection::invalid(Entity::Event, field, "date", text))
}

fn build(fields: EventFields) -> Result<NewEvent, Rejection> {
    let name = required(fields.name, "name")?;
    let track = required(fields.track, "track")?;
    let event_type = required(fields.event_type, "event_type")?;
    let start_date = date(required(fields.start_date, "start_date")?, "start_date")?;
    let end_date = fields
        .end_date
        .map(|text| date(text, "end_date"))
        .transpose()?;

    let event = NewEvent {
        name,
        track,
        event_type,
        start_date,
        end_date,
        completed: fields.completed,
    };

    event
        .validate()
        .map_err(|errors| Rejection::from_errors(Entity::Event, &errors))?;
    Ok(event)
}

/// Validates one calendar entry into an insertable record.
pub fn validate_event(fields: EventFields) -> Result<NewEvent, Rejection> {
    let name = fields.name.clone();
    build(fields).inspect_err(|rejection| {
        error!(
            entity = %rejection.entity,
            event = name.as_deref().unwrap_or("<unnamed>"),
            field = %rejection.field,
            constraint = %rejection.constraint,
            value = rejection.value.as_deref().unwrap_or("<absent>"),
            "record rejected"
        );
    })
}

/// Validates a whole calendar, stopping at the first rejection.
pub fn validate_events(batch: Vec<EventFields>) -> Result<Vec<NewEvent>, Rejection> {
    batch.into_iter().map(validate_event).collect()
}
