use serde::{Deserialize, Serialize};

use crate::ImporterError;

/// A racing category, each with its own rider grid on the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GpClass {
    #[serde(rename = "MOTOGP")]
    MotoGp,
    #[serde(rename = "MOTO2")]
    Moto2,
    #[serde(rename = "MOTO3")]
    Moto3,
    #[serde(rename = "MOTOE")]
    MotoE,
}

impl GpClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MotoGp => "MOTOGP",
            Self::Moto2 => "MOTO2",
            Self::Moto3 => "MOTO3",
            Self::MotoE => "MOTOE",
        }
    }

    /// Lower-case form used in the listing page's grid class names.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::MotoGp => "motogp",
            Self::Moto2 => "moto2",
            Self::Moto3 => "moto3",
            Self::MotoE => "motoe",
        }
    }

    pub fn all() -> &'static [GpClass] {
        &[Self::MotoGp, Self::Moto2, Self::Moto3, Self::MotoE]
    }

    fn parse_str(s: &str) -> Result<Self, ImporterError> {
        // The API decorates names ("MotoGP™"), so keep only alphanumerics.
        let normalized: String = s
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .collect::<String>()
            .to_ascii_uppercase();
        match normalized.as_str() {
            "MOTOGP" | "GP" => Ok(Self::MotoGp),
            "MOTO2" => Ok(Self::Moto2),
            "MOTO3" => Ok(Self::Moto3),
            "MOTOE" => Ok(Self::MotoE),
            _ => Err(ImporterError::ImportError(format!(
                "Unknown GP class: '{}'. Available: {}",
                s,
                Self::all()
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

impl TryFrom<&str> for GpClass {
    type Error = ImporterError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse_str(value)
    }
}

impl std::str::FromStr for GpClass {
    type Err = ImporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl std::fmt::Display for GpClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
