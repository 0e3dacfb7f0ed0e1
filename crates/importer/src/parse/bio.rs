use std::collections::HashMap;

use scraper::ElementRef;

use super::{element_text, selector};

/// Value cells of the rider bio table (the label cell is the first `<p>`).
pub const BIO_CELLS: &str = "div[class='rider-bio__table'] > div > p + p";

/// Cell text the site uses for "not available".
pub const PLACEHOLDER: &str = "-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BioField {
    Bike,
    DateOfBirth,
    PlaceOfBirth,
    Height,
    Weight,
}

/// Position of each field in the bio table. The only place that knows the layout.
pub const BIO_LAYOUT: [BioField; 5] = [
    BioField::Bike,
    BioField::DateOfBirth,
    BioField::PlaceOfBirth,
    BioField::Height,
    BioField::Weight,
];

/// Bio table values keyed by field rather than position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BioTable {
    values: HashMap<BioField, String>,
}

impl BioTable {
    pub fn from_document(root: ElementRef<'_>) -> Self {
        let Some(cells) = selector(BIO_CELLS) else {
            return Self::default();
        };
        Self::from_cells(root.select(&cells).map(element_text))
    }

    /// Maps cell texts to fields by position; extra cells are ignored.
    pub fn from_cells<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values = BIO_LAYOUT
            .iter()
            .zip(cells)
            .filter_map(|(field, text)| {
                let text = text.into().trim().to_string();
                (!text.is_empty() && text != PLACEHOLDER).then_some((*field, text))
            })
            .collect();
        Self { values }
    }

    pub fn get(&self, field: BioField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
