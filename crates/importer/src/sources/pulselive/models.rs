use serde::{Deserialize, Serialize};

use crate::class::GpClass;
use crate::parse::country;
use crate::parse::{EventFields, RiderFields};

const FINISHED: &str = "FINISHED";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Season {
    pub id: String,
    pub year: i32,
    #[serde(default)]
    pub current: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Country {
    pub iso: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Circuit {
    pub name: Option<String>,
    pub place: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiEvent {
    pub id: String,
    pub name: Option<String>,
    pub sponsored_name: Option<String>,
    pub circuit: Option<Circuit>,
    pub country: Option<Country>,
    pub date_start: Option<String>,
    pub date_end: Option<String>,
    #[serde(default)]
    pub test: bool,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Named {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Team {
    pub constructor: Option<Named>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CareerStep {
    pub number: Option<u32>,
    pub short_nickname: Option<String>,
    pub sponsored_team: Option<String>,
    pub team: Option<Team>,
    pub category: Option<Named>,
    pub season: Option<i32>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ApiRider {
    pub id: String,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub birth_city: Option<String>,
    pub birth_date: Option<String>,
    pub country: Option<Country>,
    pub current_career_step: Option<CareerStep>,
}

/// `/riders/{id}`: the rider plus every season they raced.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RiderProfile {
    #[serde(flatten)]
    pub rider: ApiRider,
    #[serde(default)]
    pub career: Vec<CareerStep>,
}

fn upper(text: Option<&str>) -> Option<String> {
    let text = text?.trim();
    (!text.is_empty()).then(|| text.to_uppercase())
}

impl ApiEvent {
    /// Same shape the calendar page produces, so both go through one validator.
    pub fn to_fields(&self) -> EventFields {
        let status = upper(self.status.as_deref());
        EventFields {
            name: upper(self.name.as_deref()),
            track: upper(self.circuit.as_ref().and_then(|c| c.name.as_deref())),
            event_type: Some(if self.test { "TEST" } else { "RACE" }.to_string()),
            start_date: self.date_start.clone(),
            end_date: self.date_end.clone(),
            completed: status.as_deref() == Some(FINISHED),
            status,
        }
    }
}

impl ApiRider {
    pub fn class(&self) -> Option<GpClass> {
        let category = self.current_career_step.as_ref()?.category.as_ref()?.name.as_deref()?;
        GpClass::try_from(category).ok()
    }

    /// "Name Surname", or whichever half the API sent.
    pub fn full_name(&self) -> Option<String> {
        match (self.name.as_deref(), self.surname.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first.trim(), last.trim())),
            (first, last) => first.or(last).map(|part| part.trim().to_string()),
        }
    }

    pub fn to_fields(&self) -> RiderFields {
        let step = self.current_career_step.as_ref();
        let number = step.and_then(|s| s.number);

        let name = upper(self.full_name().as_deref());
        let hashtag = step
            .and_then(|s| upper(s.short_nickname.as_deref()))
            .map(|nick| match number {
                Some(n) if !nick.ends_with(&n.to_string()) => format!("#{nick}{n}"),
                _ => format!("#{nick}"),
            });

        let country_name = upper(self.country.as_ref().and_then(|c| c.name.as_deref()));
        let country = self
            .country
            .as_ref()
            .and_then(|c| c.iso.as_deref())
            .and_then(country::to_iso2)
            .or_else(|| country_name.as_deref().and_then(country::to_iso2))
            .map(str::to_string);

        RiderFields {
            name,
            hashtag,
            race_number: number,
            team: upper(step.and_then(|s| s.sponsored_team.as_deref())),
            bike: upper(
                step.and_then(|s| s.team.as_ref())
                    .and_then(|t| t.constructor.as_ref())
                    .and_then(|c| c.name.as_deref()),
            ),
            country,
            country_name,
            place_of_birth: upper(self.birth_city.as_deref()),
            date_of_birth: self.birth_date.clone(),
            height_cm: None,
            weight_kg: None,
            legend: false,
        }
    }
}
