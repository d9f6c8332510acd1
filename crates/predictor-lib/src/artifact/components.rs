//! Capability interfaces for fitted artifact components
//!
//! The predictor only sees [`Regressor`], [`Scaler`] and
//! [`CategoricalEncoder`]. Concrete adapters are chosen by the `kind` tag
//! of each component in the artifact file.

use crate::error::{InferenceError, ScalingError, UnknownCategory};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use tract_onnx::prelude::*;

/// Trained regression model
pub trait Regressor: Send + Sync + fmt::Debug {
    /// Predict a single value from one feature row
    fn predict(&self, row: &[f64]) -> Result<f64, InferenceError>;

    /// Adapter kind, for introspection
    fn kind(&self) -> &'static str;
}

/// Numeric transformer fit during training
pub trait Scaler: Send + Sync + fmt::Debug {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError>;
}

/// Fitted categorical encoder with a fixed vocabulary
pub trait CategoricalEncoder: Send + Sync + fmt::Debug {
    /// Vocabulary in code order
    fn classes(&self) -> &[String];

    fn transform(&self, value: &str) -> Result<usize, UnknownCategory>;
}

/// Serialized regressor description
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressorSpec {
    Linear {
        coefficients: Vec<f64>,
        #[serde(default)]
        intercept: f64,
    },
    Onnx {
        /// Relative paths resolve against the artifact's directory
        path: PathBuf,
    },
}

impl RegressorSpec {
    pub fn build(self, base_dir: &Path, n_features: usize) -> Result<Box<dyn Regressor>> {
        match self {
            RegressorSpec::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.iter().any(|c| !c.is_finite()) || !intercept.is_finite() {
                    anyhow::bail!("linear model has non-finite parameters");
                }
                Ok(Box::new(LinearRegressor {
                    coefficients,
                    intercept,
                }))
            }
            RegressorSpec::Onnx { path } => {
                let path = if path.is_absolute() {
                    path
                } else {
                    base_dir.join(path)
                };
                Ok(Box::new(OnnxRegressor::load(&path, n_features)?))
            }
        }
    }
}

/// Serialized scaler description
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    MinMax { min: Vec<f64>, scale: Vec<f64> },
    Identity,
}

impl ScalerSpec {
    pub fn build(self) -> Result<Box<dyn Scaler>> {
        match self {
            ScalerSpec::Standard { mean, scale } => {
                if mean.len() != scale.len() {
                    anyhow::bail!(
                        "standard scaler has {} means but {} scales",
                        mean.len(),
                        scale.len()
                    );
                }
                Ok(Box::new(StandardScaler { mean, scale }))
            }
            ScalerSpec::MinMax { min, scale } => {
                if min.len() != scale.len() {
                    anyhow::bail!(
                        "min-max scaler has {} minimums but {} scales",
                        min.len(),
                        scale.len()
                    );
                }
                Ok(Box::new(MinMaxScaler { min, scale }))
            }
            ScalerSpec::Identity => Ok(Box::new(IdentityScaler)),
        }
    }
}

/// Serialized encoder description
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncoderSpec {
    Label { classes: Vec<String> },
}

impl EncoderSpec {
    pub fn build(self) -> Box<dyn CategoricalEncoder> {
        match self {
            EncoderSpec::Label { classes } => Box::new(LabelEncoder::new(classes)),
        }
    }
}

/// Ordinary linear model: `intercept + coefficients . row`
#[derive(Debug, Clone)]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Self {
        Self {
            coefficients,
            intercept,
        }
    }
}

impl Regressor for LinearRegressor {
    fn predict(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.coefficients.len() {
            return Err(InferenceError::WidthMismatch {
                expected: self.coefficients.len(),
                actual: row.len(),
            });
        }
        let dot: f64 = self
            .coefficients
            .iter()
            .zip(row)
            .map(|(c, x)| c * x)
            .sum();
        Ok(self.intercept + dot)
    }

    fn kind(&self) -> &'static str {
        "linear"
    }
}

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// ONNX regressor run through tract
pub struct OnnxRegressor {
    plan: TractModel,
    n_features: usize,
}

impl OnnxRegressor {
    /// Load and optimize an ONNX model for a `[1, n_features]` f32 input
    pub fn load(path: &Path, n_features: usize) -> Result<Self> {
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .with_context(|| format!("Failed to parse ONNX model {:?}", path))?
            .with_input_fact(0, f32::fact([1, n_features]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .context("Failed to optimize model")?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(Self { plan, n_features })
    }
}

impl fmt::Debug for OnnxRegressor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxRegressor")
            .field("n_features", &self.n_features)
            .finish_non_exhaustive()
    }
}

impl Regressor for OnnxRegressor {
    fn predict(&self, row: &[f64]) -> Result<f64, InferenceError> {
        if row.len() != self.n_features {
            return Err(InferenceError::WidthMismatch {
                expected: self.n_features,
                actual: row.len(),
            });
        }
        let data: Vec<f32> = row.iter().map(|v| *v as f32).collect();
        let input: Tensor = tract_ndarray::Array2::from_shape_vec((1, self.n_features), data)
            .map_err(|e| InferenceError::Backend(e.to_string()))?
            .into();

        let result = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| InferenceError::Backend(e.to_string()))?;
        let output = result.first().ok_or(InferenceError::EmptyOutput)?;
        let view = output
            .to_array_view::<f32>()
            .map_err(|e| InferenceError::Backend(e.to_string()))?;

        view.iter()
            .next()
            .map(|v| f64::from(*v))
            .ok_or(InferenceError::EmptyOutput)
    }

    fn kind(&self) -> &'static str {
        "onnx"
    }
}

/// `(x - mean) / scale`, a zero scale leaves the centered value unscaled
#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }
}

impl Scaler for StandardScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError> {
        check_width(self.mean.len(), row.len())?;
        let scaled: Vec<f64> = row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect();
        check_finite(scaled)
    }
}

/// `(x - min) * scale`
#[derive(Debug, Clone)]
pub struct MinMaxScaler {
    min: Vec<f64>,
    scale: Vec<f64>,
}

impl Scaler for MinMaxScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError> {
        check_width(self.min.len(), row.len())?;
        let scaled: Vec<f64> = row
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(x, (min, scale))| (x - min) * scale)
            .collect();
        check_finite(scaled)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct IdentityScaler;

impl Scaler for IdentityScaler {
    fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError> {
        Ok(row.to_vec())
    }
}

fn check_width(expected: usize, actual: usize) -> Result<(), ScalingError> {
    if expected != actual {
        return Err(ScalingError::WidthMismatch { expected, actual });
    }
    Ok(())
}

fn check_finite(values: Vec<f64>) -> Result<Vec<f64>, ScalingError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(ScalingError::NonFinite(idx)),
        None => Ok(values),
    }
}

/// Label encoder: code is the index in `classes`
#[derive(Debug, Clone)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }
}

impl CategoricalEncoder for LabelEncoder {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn transform(&self, value: &str) -> Result<usize, UnknownCategory> {
        self.classes
            .iter()
            .position(|c| c == value)
            .ok_or_else(|| UnknownCategory {
                value: value.to_string(),
            })
    }
}
