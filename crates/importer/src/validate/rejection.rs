use std::fmt;

use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Rider,
    Event,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rider => write!(f, "rider"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// Why a scraped field set could not become a record.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error(
    "{entity} field '{field}' failed '{constraint}' (value: {})",
    .value.as_deref().unwrap_or("<absent>")
)]
pub struct Rejection {
    pub entity: Entity,
    pub field: String,
    pub constraint: String,
    /// Offending value as text; `None` when the field was absent.
    pub value: Option<String>,
}

impl Rejection {
    pub fn missing(entity: Entity, field: &str) -> Self {
        Self {
            entity,
            field: field.to_string(),
            constraint: "required".to_string(),
            value: None,
        }
    }

    pub fn invalid(
        entity: Entity,
        field: &str,
        constraint: &str,
        value: impl Into<String>,
    ) -> Self {
        Self {
            entity,
            field: field.to_string(),
            constraint: constraint.to_string(),
            value: Some(value.into()),
        }
    }

    /// First failing field (alphabetically, so the choice is stable) of a
    /// `validator` run. Record-level errors sort first.
    pub fn from_errors(entity: Entity, errors: &ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs))
            .collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let Some((field, error)) = fields
            .into_iter()
            .find_map(|(field, errs)| errs.first().map(|e| (field, e.clone())))
        else {
            return Self {
                entity,
                field: "<record>".to_string(),
                constraint: errors.to_string(),
                value: None,
            };
        };

        let mut constraint = error.code.to_string();
        let bounds: Vec<String> = ["min", "max"]
            .iter()
            .filter_map(|key| {
                error
                    .params
                    .get(*key)
                    .map(|bound| format!("{key}={bound}"))
            })
            .collect();
        if !bounds.is_empty() {
            constraint = format!("{constraint}({})", bounds.join(", "));
        }

        let text = |value: &serde_json::Value| match value {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        let value = error.params.get("value").map(text);
        // Record-level checks name their field in a param.
        let field = error.params.get("field").map(text).unwrap_or(field);

        Self {
            entity,
            field,
            constraint,
            value,
        }
    }
}
