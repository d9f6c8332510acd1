//! Feature preprocessing for ML inference
//!
//! Turns raw house attributes into the exact row the trained model was fit
//! on: categorical encoding, one-hot expansion, zero-fill of absent
//! columns, and reordering to the artifact's `feature_columns`.
//!
//! Two recovery policies apply here and both can silently change what the
//! model sees:
//! - a category outside an encoder's vocabulary is encoded as code 0, the
//!   encoder's first vocabulary entry;
//! - a feature column the row cannot supply is filled with 0.

use crate::artifact::{CategoricalEncoder, ModelArtifact};
use crate::error::PreprocessError;
use crate::models::{AttributeValue, HouseAttributes};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Separator between a base field and its category in one-hot column names
pub const ONE_HOT_SEPARATOR: char = '_';

/// Model-ready single row, ordered as the artifact's feature columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| self.values[idx])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds feature rows against a loaded artifact
#[derive(Debug, Clone, Copy, Default)]
pub struct FeaturePreprocessor;

impl FeaturePreprocessor {
    pub fn new() -> Self {
        Self
    }

    pub fn build_vector(
        &self,
        attributes: &HouseAttributes,
        artifact: &ModelArtifact,
    ) -> Result<FeatureRow, PreprocessError> {
        let mut row: BTreeMap<String, AttributeValue> = attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        for (column, encoder) in artifact.encoders() {
            if let Some(value) = row.get_mut(column) {
                let code = encode(column, encoder.as_ref(), value)?;
                *value = AttributeValue::Integer(code as i64);
            }
        }

        let feature_columns = artifact.feature_columns();
        for base in one_hot_bases(attributes, feature_columns) {
            // Encoded fields hold their label code here, so they never match a suffix
            let category = row.get(base).map(AttributeValue::label);
            let prefix = format!("{}{}", base, ONE_HOT_SEPARATOR);
            for column in feature_columns {
                if let Some(suffix) = column.strip_prefix(&prefix) {
                    let hot = category.as_deref() == Some(suffix);
                    row.insert(column.clone(), AttributeValue::Integer(i64::from(hot)));
                }
            }
            row.remove(base);
        }

        let mut values = Vec::with_capacity(feature_columns.len());
        for column in feature_columns {
            let value = match row.get(column) {
                Some(value) => value.as_f64().ok_or_else(|| PreprocessError::NonNumeric {
                    column: column.clone(),
                    value: value.to_string(),
                })?,
                None => {
                    debug!(column = %column, "Feature column absent, filling with 0");
                    0.0
                }
            };
            values.push(value);
        }

        Ok(FeatureRow {
            columns: feature_columns.to_vec(),
            values,
        })
    }
}

/// Encode one categorical value; unknown categories fall back to code 0
fn encode(
    column: &str,
    encoder: &dyn CategoricalEncoder,
    value: &AttributeValue,
) -> Result<usize, PreprocessError> {
    let label = value.label();
    match encoder.transform(&label) {
        Ok(code) => Ok(code),
        Err(unknown) => {
            let Some(first) = encoder.classes().first() else {
                return Err(PreprocessError::MalformedEncoder {
                    column: column.to_string(),
                    reason: "empty vocabulary".to_string(),
                });
            };
            warn!(
                column = %column,
                value = %unknown.value,
                substitute = %first,
                "Unknown category, using first vocabulary entry"
            );
            Ok(0)
        }
    }
}

/// Raw fields that expand into one-hot columns expected by the model.
///
/// A column qualifies when it is not itself a raw key and the part before
/// the first separator names a raw key.
fn one_hot_bases<'a>(
    attributes: &'a HouseAttributes,
    feature_columns: &'a [String],
) -> BTreeSet<&'a str> {
    feature_columns
        .iter()
        .filter(|column| !attributes.contains_key(column))
        .filter_map(|column| column.split_once(ONE_HOT_SEPARATOR))
        .map(|(base, _)| base)
        .filter(|base| attributes.contains_key(base))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{IdentityScaler, LabelEncoder, LinearRegressor};
    use crate::models::fields;

    fn encoder(classes: &[&str]) -> Box<dyn CategoricalEncoder> {
        Box::new(LabelEncoder::new(
            classes.iter().map(|c| c.to_string()).collect(),
        ))
    }

    fn artifact(columns: &[&str], encoders: Vec<(&str, Box<dyn CategoricalEncoder>)>) -> ModelArtifact {
        ModelArtifact::new(
            Box::new(LinearRegressor::new(vec![1.0; columns.len()], 0.0)),
            Box::new(IdentityScaler),
            encoders
                .into_iter()
                .map(|(name, enc)| (name.to_string(), enc))
                .collect(),
            columns.iter().map(|c| c.to_string()).collect(),
        )
    }

    fn house() -> HouseAttributes {
        HouseAttributes::new()
            .with(fields::AREA, 2000)
            .with(fields::BEDROOMS, 3)
            .with(fields::MAINROAD, "yes")
            .with(fields::FURNISHINGSTATUS, "semi-furnished")
    }

    #[test]
    fn test_label_encoding_and_order() {
        let artifact = artifact(
            &["mainroad", "bedrooms", "area"],
            vec![("mainroad", encoder(&["no", "yes"]))],
        );
        let row = FeaturePreprocessor::new()
            .build_vector(&house().with(fields::FURNISHINGSTATUS, "x"), &artifact)
            .unwrap();

        assert_eq!(row.columns(), ["mainroad", "bedrooms", "area"]);
        assert_eq!(row.values(), [1.0, 3.0, 2000.0]);
    }

    #[test]
    fn test_unknown_category_uses_first_entry() {
        let artifact = artifact(&["mainroad"], vec![("mainroad", encoder(&["no", "yes"]))]);
        let attrs = house().with(fields::MAINROAD, "sometimes");

        let row = FeaturePreprocessor::new().build_vector(&attrs, &artifact).unwrap();
        assert_eq!(row.get("mainroad"), Some(0.0));
    }

    #[test]
    fn test_empty_vocabulary_is_malformed() {
        let artifact = artifact(&["mainroad"], vec![("mainroad", encoder(&[]))]);
        let err = FeaturePreprocessor::new().build_vector(&house(), &artifact).unwrap_err();
        assert!(matches!(err, PreprocessError::MalformedEncoder { .. }));
    }

    #[test]
    fn test_one_hot_expansion_drops_base_column() {
        let artifact = artifact(
            &[
                "area",
                "furnishingstatus_furnished",
                "furnishingstatus_semi-furnished",
                "furnishingstatus_unfurnished",
            ],
            vec![],
        );
        let row = FeaturePreprocessor::new().build_vector(&house(), &artifact).unwrap();

        assert_eq!(row.values(), [2000.0, 0.0, 1.0, 0.0]);
        assert!(row.get("furnishingstatus").is_none());
    }

    #[test]
    fn test_one_hot_compares_encoded_value() {
        let artifact = artifact(
            &[
                "furnishingstatus_furnished",
                "furnishingstatus_semi-furnished",
                "furnishingstatus_unfurnished",
            ],
            vec![(
                "furnishingstatus",
                encoder(&["furnished", "semi-furnished", "unfurnished"]),
            )],
        );
        let row = FeaturePreprocessor::new().build_vector(&house(), &artifact).unwrap();
        assert_eq!(row.values(), [0.0, 0.0, 0.0]);
        assert!(row.get("furnishingstatus").is_none());
    }

    #[test]
    fn test_one_hot_matches_code_suffix_after_encoding() {
        let artifact = artifact(
            &["furnishingstatus_0", "furnishingstatus_1", "furnishingstatus_2"],
            vec![(
                "furnishingstatus",
                encoder(&["furnished", "semi-furnished", "unfurnished"]),
            )],
        );
        let row = FeaturePreprocessor::new().build_vector(&house(), &artifact).unwrap();
        assert_eq!(row.values(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_missing_columns_zero_filled() {
        let artifact = artifact(&["area", "stories", "parking"], vec![]);
        let row = FeaturePreprocessor::new().build_vector(&house(), &artifact).unwrap();
        assert_eq!(row.values(), [2000.0, 0.0, 0.0]);
    }

    #[test]
    fn test_unencoded_text_is_non_numeric() {
        let artifact = artifact(&["area", "mainroad"], vec![]);
        let err = FeaturePreprocessor::new().build_vector(&house(), &artifact).unwrap_err();
        match err {
            PreprocessError::NonNumeric { column, value } => {
                assert_eq!(column, "mainroad");
                assert_eq!(value, "yes");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_extra_attributes_dropped() {
        let artifact = artifact(&["area"], vec![]);
        let row = FeaturePreprocessor::new()
            .build_vector(&house().with("garden", "large"), &artifact)
            .unwrap();
        assert_eq!(row.len(), 1);
    }
}
