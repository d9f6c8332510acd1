//! Prediction form validation
//!
//! Checks submitted attributes against the ranges the prediction form
//! allows before they reach the predictor.

use predictor_lib::models::{fields, HouseAttributes};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Allowed ranges for the numeric form fields
pub const NUMERIC_RANGES: [(&str, RangeInclusive<i64>); 5] = [
    (fields::AREA, 500..=50_000),
    (fields::BEDROOMS, 1..=10),
    (fields::BATHROOMS, 1..=10),
    (fields::STORIES, 1..=5),
    (fields::PARKING, 0..=10),
];

const YES_NO: [&str; 2] = ["yes", "no"];

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a prediction form; an empty list means the form is acceptable
pub fn validate_form(attributes: &HouseAttributes) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for (field, range) in NUMERIC_RANGES {
        match attributes.get(field) {
            None => errors.push(FieldError::new(field, "This field is required.")),
            Some(value) => match value.as_i64() {
                None => errors.push(FieldError::new(field, "Not a valid integer value.")),
                Some(n) if !range.contains(&n) => errors.push(FieldError::new(
                    field,
                    format!(
                        "Number must be between {} and {}.",
                        range.start(),
                        range.end()
                    ),
                )),
                Some(_) => {}
            },
        }
    }

    for field in fields::BINARY {
        check_choice(attributes, field, &YES_NO, &mut errors);
    }
    check_choice(
        attributes,
        fields::FURNISHINGSTATUS,
        &fields::FURNISHING_CHOICES,
        &mut errors,
    );

    errors
}

fn check_choice(
    attributes: &HouseAttributes,
    field: &str,
    choices: &[&str],
    errors: &mut Vec<FieldError>,
) {
    match attributes.get(field).map(|v| v.as_str()) {
        None => errors.push(FieldError::new(field, "This field is required.")),
        Some(Some(value)) if choices.contains(&value) => {}
        Some(_) => errors.push(FieldError::new(
            field,
            format!("Not a valid choice, expected one of: {}.", choices.join(", ")),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> HouseAttributes {
        HouseAttributes::new()
            .with(fields::AREA, 2000)
            .with(fields::BEDROOMS, 3)
            .with(fields::BATHROOMS, 2)
            .with(fields::STORIES, 2)
            .with(fields::PARKING, 0)
            .with(fields::MAINROAD, "yes")
            .with(fields::GUESTROOM, "no")
            .with(fields::BASEMENT, "no")
            .with(fields::HOTWATERHEATING, "no")
            .with(fields::AIRCONDITIONING, "yes")
            .with(fields::PREFAREA, "no")
            .with(fields::FURNISHINGSTATUS, "semi-furnished")
    }

    #[test]
    fn test_valid_form_passes() {
        assert!(validate_form(&valid_form()).is_empty());
    }

    #[test]
    fn test_range_bounds_inclusive() {
        let form = valid_form()
            .with(fields::AREA, 500)
            .with(fields::STORIES, 5)
            .with(fields::PARKING, 10);
        assert!(validate_form(&form).is_empty());

        let form = valid_form().with(fields::AREA, 499).with(fields::STORIES, 6);
        let errors = validate_form(&form);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["area", "stories"]);
        assert_eq!(errors[0].message, "Number must be between 500 and 50000.");
    }

    #[test]
    fn test_missing_and_non_integer_fields() {
        let mut form = valid_form().with(fields::BATHROOMS, 1.5);
        form.remove(fields::BEDROOMS);

        let errors = validate_form(&form);
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0], FieldError::new("bedrooms", "This field is required."));
        assert_eq!(errors[1].field, "bathrooms");
    }

    #[test]
    fn test_choice_fields() {
        let form = valid_form()
            .with(fields::MAINROAD, "maybe")
            .with(fields::FURNISHINGSTATUS, "luxury")
            .with(fields::BASEMENT, 1);

        let errors = validate_form(&form);
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["mainroad", "basement", "furnishingstatus"]);
    }
}
