//! Turns scraped field sets into records, or a [`Rejection`] naming the
//! first field that broke a constraint.
//!
//! Batches are all-or-nothing: one rejected record rejects its batch, since a
//! malformed scrape almost always means the page layout changed for every page.

mod event;
mod rejection;
mod rider;

pub use event::{validate_event, validate_events};
pub use rejection::{Entity, Rejection};
pub use rider::{validate_rider, validate_riders};

use chrono::NaiveDate;

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];

/// Parses the page's `dd/mm/yyyy` form, or ISO `yyyy-mm-dd` as the API sends it.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}
