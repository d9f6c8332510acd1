//! ML prediction engine

mod fallback;
mod features;
mod inference;
mod output;

pub use fallback::{
    FormulaFallback, BONUSES, FALLBACK_NOTE, MAX_FALLBACK_PRICE, MIN_FALLBACK_PRICE,
};
pub use features::{FeaturePreprocessor, FeatureRow, ONE_HOT_SEPARATOR};
pub use inference::{
    HousePricePredictor, InferenceStats, PredictorConfig, DEFAULT_PREDICTION_NOTE, DEFAULT_PRICE,
    MODEL_UNAVAILABLE,
};
pub use output::{OutputConfig, OutputFormatter, MAX_MODEL_PRICE, MIN_MODEL_PRICE};

use crate::artifact::ModelInfo;
use crate::models::{HouseAttributes, PredictionResult};

/// Trait for price prediction implementations
pub trait PricePredictor: Send + Sync {
    /// Predict a price; degraded paths are reported through the diagnostic
    fn predict_price(&self, attributes: &HouseAttributes) -> PredictionResult;

    /// Summary of the loaded artifact, if any
    fn model_info(&self) -> Option<ModelInfo>;

    /// Counters since construction
    fn stats(&self) -> InferenceStats;

    fn is_model_loaded(&self) -> bool;
}
