use scraper::{ElementRef, Html};
use tracing::debug;

use super::{extract_field, selector};

pub const EVENT_CONTAINER: &str = "li[class*='calendar-listing__event-container']";
pub const START_MONTH: &str = "div[class='calendar-listing__date-start-month']";
pub const START_DAY: &str = "div[class='calendar-listing__date-start-day']";
pub const END_DAY: &str = "div[class='calendar-listing__date-end-day']";
pub const TITLE: &str = "div[class='calendar-listing__title']";
pub const TRACK: &str = "div[class='calendar-listing__location-track-name']";
pub const EVENT_TYPE: &str = "div[class='calendar-listing__status-type']";
pub const STATUS: &str = "div[class='calendar-listing__status-text']";

const FINISHED: &str = "FINISHED";

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Raw calendar entry. Dates are `dd/mm/yyyy` strings; the validator parses them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFields {
    pub name: Option<String>,
    pub track: Option<String>,
    pub event_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub completed: bool,
}

/// `"MAR"`, `"March"` → `3`. Only the first three letters matter.
pub fn month_number(text: &str) -> Option<u32> {
    let abbr: String = text.trim().chars().take(3).collect::<String>().to_uppercase();
    MONTHS
        .iter()
        .position(|m| *m == abbr)
        .map(|idx| idx as u32 + 1)
}

fn format_date(day: &str, month: u32, year: i32) -> String {
    match day.parse::<u32>() {
        Ok(day) => format!("{day:02}/{month:02}/{year}"),
        // Left as-is so the validator reports the offending text.
        Err(_) => format!("{day}/{month:02}/{year}"),
    }
}

/// Month and year of the end day. An end day earlier than the start day
/// means the event crosses into the next month.
fn end_month(start_day: &str, end_day: &str, month: u32, year: i32) -> (u32, i32) {
    match (start_day.parse::<u32>(), end_day.parse::<u32>()) {
        (Ok(start), Ok(end)) if end < start => {
            if month == 12 {
                (1, year + 1)
            } else {
                (month + 1, year)
            }
        }
        _ => (month, year),
    }
}

fn parse_event(event: ElementRef<'_>, season: i32) -> EventFields {
    let month = extract_field(event, START_MONTH).and_then(|m| {
        let number = month_number(&m);
        if number.is_none() {
            debug!(month = %m, "unknown month");
        }
        number
    });
    let start_day = extract_field(event, START_DAY);
    let end_day = extract_field(event, END_DAY);

    let (start_date, end_date) = match (month, start_day.as_deref()) {
        (Some(month), Some(start)) => {
            let end = end_day.as_deref().map(|end| {
                let (end_month, end_year) = end_month(start, end, month, season);
                format_date(end, end_month, end_year)
            });
            (Some(format_date(start, month, season)), end)
        }
        _ => (None, None),
    };

    let status = extract_field(event, STATUS);
    let completed = status.as_deref() == Some(FINISHED);

    EventFields {
        name: extract_field(event, TITLE),
        track: extract_field(event, TRACK),
        event_type: extract_field(event, EVENT_TYPE),
        start_date,
        end_date,
        status,
        completed,
    }
}

/// Parses every calendar entry on the page, in page order.
pub fn parse_events(html: &str, season: i32) -> Vec<EventFields> {
    let Some(container) = selector(EVENT_CONTAINER) else {
        return Vec::new();
    };
    let document = Html::parse_document(html);
    document
        .select(&container)
        .map(|event| parse_event(event, season))
        .collect()
}
