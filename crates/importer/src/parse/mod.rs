//! Selector-based field extraction from scraped pages.
//!
//! Nothing here fails: a missing element, an empty element or a malformed
//! selector all come back as `None` and are logged at the call site's
//! selector.

pub mod bio;
pub mod country;
pub mod event;
pub mod listing;
pub mod rider;

pub use bio::{BioField, BioTable};
pub use event::{EventFields, parse_events};
pub use rider::{RiderFields, parse_rider};

use scraper::{ElementRef, Selector};
use tracing::{debug, warn};

/// Compiles a selector, logging instead of failing on bad syntax.
pub(crate) fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!(selector = css, error = %e, "invalid CSS selector");
            None
        }
    }
}

/// Text of an element: trimmed text nodes joined by single spaces, upper-cased.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

/// Normalized text of the first element under `scope` matching `css`.
pub fn extract_field(scope: ElementRef<'_>, css: &str) -> Option<String> {
    let selector = selector(css)?;

    let Some(element) = scope.select(&selector).next() else {
        debug!(selector = css, "no element matched");
        return None;
    };

    let text = element_text(element);
    if text.is_empty() {
        debug!(selector = css, "matched element has no text");
        return None;
    }
    Some(text)
}

pub fn digits_only(text: &str) -> String {
    text.chars().filter(char::is_ascii_digit).collect()
}

/// `"#MM93"` → `93`. No hashtag, or one without digits, gives `None`.
pub fn race_number_from_hashtag(hashtag: Option<&str>) -> Option<u32> {
    let digits = digits_only(hashtag?);
    digits.parse().ok()
}

/// `"181CM"` → `181`. Zero is a placeholder on the site, not a measurement.
pub fn measurement_from_text(text: Option<&str>) -> Option<u32> {
    let digits = digits_only(text?);
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => None,
        Ok(value) => Some(value),
    }
}
