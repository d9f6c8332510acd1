//! Error taxonomy for the prediction pipeline
//!
//! Every error here is recovered somewhere inside the crate. Only the
//! diagnostic string derived from it reaches the caller of
//! [`HousePricePredictor::predict_price`](crate::predictor::HousePricePredictor::predict_price).

use std::path::PathBuf;
use thiserror::Error;

/// Failure to load a model artifact from disk
#[derive(Debug, Error)]
pub enum ArtifactLoadError {
    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read model file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse model file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("model file {} is missing required key '{key}'", path.display())]
    MissingKey { path: PathBuf, key: &'static str },

    #[error("model file {} is invalid: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}

/// Observed categorical value outside an encoder's vocabulary.
///
/// Never surfaced to callers; the preprocessor substitutes code 0.
#[derive(Debug, Clone, Error)]
#[error("unknown category '{value}'")]
pub struct UnknownCategory {
    pub value: String,
}

/// Failure to build the model-ready feature row
#[derive(Debug, Clone, Error)]
pub enum PreprocessError {
    #[error("encoder for '{column}' is malformed: {reason}")]
    MalformedEncoder { column: String, reason: String },

    #[error("column '{column}' is not numeric (value: {value})")]
    NonNumeric { column: String, value: String },
}

/// Failure of the fitted scaler; the pipeline continues unscaled
#[derive(Debug, Clone, Error)]
pub enum ScalingError {
    #[error("scaler expects {expected} features, row has {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("scaler produced a non-finite value at position {0}")]
    NonFinite(usize),
}

/// Failure of the regressor or of its output coercion
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("model expects {expected} features, row has {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("model backend error: {0}")]
    Backend(String),

    #[error("model produced no output")]
    EmptyOutput,

    #[error("model produced a non-finite value: {0}")]
    NonFinite(f64),
}

/// Attributes unusable even by the fallback formula
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StructuralInputError {
    #[error("required field '{0}' is missing")]
    Missing(String),

    #[error("field '{field}' is not an integer (value: {value})")]
    NotInteger { field: String, value: String },
}

/// Failure anywhere along the trained-model path
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("preprocessing failed: {0}")]
    Preprocess(#[from] PreprocessError),

    #[error("inference failed: {0}")]
    Inference(#[from] InferenceError),
}
