//! Closed-form price estimate used when the trained model is unusable

use crate::error::StructuralInputError;
use crate::models::{fields, AttributeValue, HouseAttributes};

pub const BASE_PRICE: f64 = 180_000.0;
pub const PRICE_PER_AREA_UNIT: f64 = 165.0;
pub const PRICE_PER_BEDROOM: f64 = 15_000.0;
pub const PRICE_PER_BATHROOM: f64 = 20_000.0;

pub const MIN_FALLBACK_PRICE: f64 = 120_000.0;
pub const MAX_FALLBACK_PRICE: f64 = 900_000.0;

/// Fixed amounts added when a categorical field has the given value
pub const BONUSES: [(&str, &str, f64); 4] = [
    (fields::PREFAREA, "yes", 40_000.0),
    (fields::AIRCONDITIONING, "yes", 18_000.0),
    (fields::FURNISHINGSTATUS, "furnished", 30_000.0),
    (fields::MAINROAD, "yes", 25_000.0),
];

pub const FALLBACK_NOTE: &str = "fallback formula used";

/// Deterministic fallback estimator. Pure, no I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormulaFallback;

impl FormulaFallback {
    /// Estimate a price, returning it with a non-empty diagnostic
    pub fn price(&self, attributes: &HouseAttributes) -> Result<(f64, String), StructuralInputError> {
        let area = required_integer(attributes, fields::AREA)?;
        let bedrooms = required_integer(attributes, fields::BEDROOMS)?;
        let bathrooms = required_integer(attributes, fields::BATHROOMS)?;

        let bonus: f64 = BONUSES
            .iter()
            .filter(|(field, expected, _)| {
                attributes.get(field).and_then(AttributeValue::as_str) == Some(*expected)
            })
            .map(|(_, _, amount)| amount)
            .sum();

        let price = BASE_PRICE
            + area as f64 * PRICE_PER_AREA_UNIT
            + bedrooms as f64 * PRICE_PER_BEDROOM
            + bathrooms as f64 * PRICE_PER_BATHROOM
            + bonus;

        Ok((
            price.clamp(MIN_FALLBACK_PRICE, MAX_FALLBACK_PRICE),
            FALLBACK_NOTE.to_string(),
        ))
    }
}

fn required_integer(attributes: &HouseAttributes, field: &str) -> Result<i64, StructuralInputError> {
    let value = attributes
        .get(field)
        .ok_or_else(|| StructuralInputError::Missing(field.to_string()))?;
    value.as_i64().ok_or_else(|| StructuralInputError::NotInteger {
        field: field.to_string(),
        value: value.to_string(),
    })
}
