use scraper::Html;
use tracing::debug;

use super::bio::{BioField, BioTable};
use super::{country, extract_field, measurement_from_text, race_number_from_hashtag};

pub const NAME: &str = "span[class*='rider-hero__info-name']";
pub const HASHTAG: &str = "span[class*='rider-hero__info-hashtag']";
pub const TEAM: &str = "span[class*='rider-hero__details-team']";
pub const COUNTRY: &str = "span[class*='rider-hero__details-country']";
pub const WIDGET_HEADER: &str = "h2[class='widget-header__title']";

const LEGEND_MARKERS: [&str; 2] = ["MOTOGP", "LEGEND"];

/// Raw rider fields as scraped. Every field may be absent; the validator
/// decides what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiderFields {
    pub name: Option<String>,
    pub hashtag: Option<String>,
    pub race_number: Option<u32>,
    pub team: Option<String>,
    pub bike: Option<String>,
    /// ISO2 code, when the country name was recognized.
    pub country: Option<String>,
    /// Country text as shown on the page.
    pub country_name: Option<String>,
    pub place_of_birth: Option<String>,
    /// `dd/mm/yyyy` as shown on the page.
    pub date_of_birth: Option<String>,
    pub height_cm: Option<u32>,
    pub weight_kg: Option<u32>,
    pub legend: bool,
}

fn mentions_legend(text: &str) -> bool {
    LEGEND_MARKERS.iter().any(|marker| text.contains(marker))
}

/// Parses one rider page. Missing elements leave fields absent; this never fails.
pub fn parse_rider(html: &str) -> RiderFields {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let hashtag = extract_field(root, HASHTAG);
    let country_name = extract_field(root, COUNTRY);
    let country = country_name.as_deref().and_then(country::to_iso2);
    if country.is_none() {
        if let Some(name) = country_name.as_deref() {
            debug!(country = name, "country not recognized");
        }
    }

    let bio = BioTable::from_document(root);
    let bike = bio.get(BioField::Bike).map(str::to_string);
    let header = extract_field(root, WIDGET_HEADER);
    let legend = bike.as_deref().is_some_and(mentions_legend)
        || header.as_deref().is_some_and(|h| h.contains("LEGEND"));

    let date_of_birth = bio
        .get(BioField::DateOfBirth)
        .filter(|dob| !dob.contains('-'))
        .map(str::to_string);

    let mut fields = RiderFields {
        name: extract_field(root, NAME),
        race_number: race_number_from_hashtag(hashtag.as_deref()),
        hashtag,
        team: extract_field(root, TEAM),
        bike,
        country: country.map(str::to_string),
        country_name,
        place_of_birth: bio.get(BioField::PlaceOfBirth).map(str::to_string),
        date_of_birth,
        height_cm: measurement_from_text(bio.get(BioField::Height)),
        weight_kg: measurement_from_text(bio.get(BioField::Weight)),
        legend,
    };

    if fields.legend {
        fields.bike = None;
        fields.height_cm = None;
        fields.weight_kg = None;
    }
    fields
}

#[cfg(test)]
pub(crate) mod fixtures {
    /// Builds a rider page the way the site lays it out.
    pub fn rider_page(
        name: &str,
        hashtag: &str,
        team: &str,
        country: &str,
        bio: [&str; 5],
    ) -> String {
        let labels = ["Bike", "Date of birth", "Place of birth", "Height", "Weight"];
        let rows: String = labels
            .iter()
            .zip(bio)
            .map(|(label, value)| format!("<div><p>{label}</p><p>{value}</p></div>"))
            .collect();
        format!(
            r#"<html><body>
              <div class="rider-hero">
                <span class="rider-hero__info-name">{name}</span>
                <span class="rider-hero__info-hashtag">{hashtag}</span>
                <span class="rider-hero__details-team">{team}</span>
                <span class="rider-hero__details-country">{country}</span>
              </div>
              <div class="rider-bio__table">{rows}</div>
            </body></html>"#
        )
    }
}
