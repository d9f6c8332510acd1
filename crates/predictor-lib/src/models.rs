//! Core data models for the house price predictor

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute names submitted with every prediction request
pub mod fields {
    pub const AREA: &str = "area";
    pub const BEDROOMS: &str = "bedrooms";
    pub const BATHROOMS: &str = "bathrooms";
    pub const STORIES: &str = "stories";
    pub const PARKING: &str = "parking";
    pub const MAINROAD: &str = "mainroad";
    pub const GUESTROOM: &str = "guestroom";
    pub const BASEMENT: &str = "basement";
    pub const HOTWATERHEATING: &str = "hotwaterheating";
    pub const AIRCONDITIONING: &str = "airconditioning";
    pub const PREFAREA: &str = "prefarea";
    pub const FURNISHINGSTATUS: &str = "furnishingstatus";

    pub const NUMERIC: [&str; 5] = [AREA, BEDROOMS, BATHROOMS, STORIES, PARKING];

    pub const BINARY: [&str; 6] = [
        MAINROAD,
        GUESTROOM,
        BASEMENT,
        HOTWATERHEATING,
        AIRCONDITIONING,
        PREFAREA,
    ];

    pub const FURNISHING_CHOICES: [&str; 3] = ["furnished", "semi-furnished", "unfurnished"];
}

/// A single raw attribute value as submitted upstream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Numeric view of the value; numeric strings are accepted
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            AttributeValue::Integer(i) => *i as f64,
            AttributeValue::Number(n) => *n,
            AttributeValue::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Integer view of the value; integral floats and integer strings are accepted
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Number(n) if n.is_finite() && n.fract() == 0.0 => Some(*n as i64),
            AttributeValue::Number(_) => None,
            AttributeValue::Text(s) => s.trim().parse::<i64>().ok(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Category label used for encoder lookups and one-hot matching
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Number(n) => write!(f, "{}", n),
            AttributeValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Integer(i64::from(value))
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Integer(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// Raw house attributes keyed by attribute name.
///
/// Key order carries no meaning; the preprocessor derives column order
/// from the artifact alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseAttributes(BTreeMap<String, AttributeValue>);

impl HouseAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(name.into(), value.into());
    }

    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AttributeValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<AttributeValue>> FromIterator<(K, V)> for HouseAttributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Typed house features as submitted by the prediction form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HouseFeatures {
    pub area: u32,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub stories: u32,
    pub parking: u32,
    pub mainroad: String,
    pub guestroom: String,
    pub basement: String,
    pub hotwaterheating: String,
    pub airconditioning: String,
    pub prefarea: String,
    pub furnishingstatus: String,
}

impl From<&HouseFeatures> for HouseAttributes {
    fn from(features: &HouseFeatures) -> Self {
        HouseAttributes::new()
            .with(fields::AREA, features.area)
            .with(fields::BEDROOMS, features.bedrooms)
            .with(fields::BATHROOMS, features.bathrooms)
            .with(fields::STORIES, features.stories)
            .with(fields::PARKING, features.parking)
            .with(fields::MAINROAD, features.mainroad.as_str())
            .with(fields::GUESTROOM, features.guestroom.as_str())
            .with(fields::BASEMENT, features.basement.as_str())
            .with(fields::HOTWATERHEATING, features.hotwaterheating.as_str())
            .with(fields::AIRCONDITIONING, features.airconditioning.as_str())
            .with(fields::PREFAREA, features.prefarea.as_str())
            .with(fields::FURNISHINGSTATUS, features.furnishingstatus.as_str())
    }
}

/// Which path produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    /// Trained model, full success
    Model,
    /// Closed-form fallback formula
    Fallback,
    /// Fixed constant used when the formula itself could not run
    DefaultConstant,
    /// No price could be produced
    Unavailable,
}

/// Outcome of a single prediction call.
///
/// Only the constructors below exist, so an absent price always carries
/// a diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    price: Option<f64>,
    diagnostic: Option<String>,
    source: PredictionSource,
}

impl PredictionResult {
    /// Trained-model price, no diagnostic
    pub fn success(price: f64) -> Self {
        Self {
            price: Some(price),
            diagnostic: None,
            source: PredictionSource::Model,
        }
    }

    /// Usable price obtained through a degraded path
    pub fn degraded(price: f64, source: PredictionSource, diagnostic: impl Into<String>) -> Self {
        Self {
            price: Some(price),
            diagnostic: Some(diagnostic.into()),
            source,
        }
    }

    /// Hard failure: no price at all
    pub fn failed(diagnostic: impl Into<String>) -> Self {
        Self {
            price: None,
            diagnostic: Some(diagnostic.into()),
            source: PredictionSource::Unavailable,
        }
    }

    pub fn price(&self) -> Option<f64> {
        self.price
    }

    pub fn diagnostic(&self) -> Option<&str> {
        self.diagnostic.as_deref()
    }

    pub fn source(&self) -> PredictionSource {
        self.source
    }

    pub fn is_degraded(&self) -> bool {
        self.price.is_some() && self.diagnostic.is_some()
    }
}
