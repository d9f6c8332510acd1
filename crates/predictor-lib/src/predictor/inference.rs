//! Price inference with graceful degradation
//!
//! Runs preprocess -> scale -> infer -> clamp against a shared read-only
//! artifact. Any failure on the model path drops to the closed-form
//! fallback, so callers get a usable price whenever the attributes allow it.

use super::fallback::FormulaFallback;
use super::features::FeaturePreprocessor;
use super::output::{OutputConfig, OutputFormatter};
use super::PricePredictor;
use crate::artifact::{LoadOutcome, ModelArtifact, ModelInfo};
use crate::error::{PipelineError, StructuralInputError};
use crate::models::{HouseAttributes, PredictionResult, PredictionSource};
use crate::observability::PredictorMetrics;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Diagnostic used when no artifact is loaded
pub const MODEL_UNAVAILABLE: &str = "model unavailable";

/// Diagnostic marker for the fixed-constant path
pub const DEFAULT_PREDICTION_NOTE: &str = "default prediction used";

/// Price reported when even the fallback formula cannot run
pub const DEFAULT_PRICE: f64 = 300_000.0;

/// Predictor configuration
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    /// Clamp bounds for trained-model output
    pub output: OutputConfig,
    /// Price for the fixed-constant path
    pub default_price: f64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            default_price: DEFAULT_PRICE,
        }
    }
}

/// Inference statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InferenceStats {
    pub total_predictions: u64,
    pub fallback_predictions: u64,
    pub failed_predictions: u64,
}

/// House price predictor over an optional trained artifact
pub struct HousePricePredictor {
    artifact: Option<Arc<ModelArtifact>>,
    preprocessor: FeaturePreprocessor,
    fallback: FormulaFallback,
    output_formatter: OutputFormatter,
    default_price: f64,
    metrics: PredictorMetrics,
    total_count: AtomicU64,
    fallback_count: AtomicU64,
    failure_count: AtomicU64,
}

impl HousePricePredictor {
    pub fn new(artifact: Option<Arc<ModelArtifact>>, config: PredictorConfig) -> Self {
        let metrics = PredictorMetrics::new();
        match artifact.as_deref() {
            Some(a) => metrics.set_model_info(
                a.metadata().model_name.as_deref().unwrap_or("unnamed"),
                a.model().kind(),
            ),
            None => metrics.clear_model_info(),
        }

        Self {
            artifact,
            preprocessor: FeaturePreprocessor::new(),
            fallback: FormulaFallback,
            output_formatter: OutputFormatter::with_config(config.output),
            default_price: if config.default_price.is_finite() {
                config.default_price
            } else {
                warn!(
                    default_price = config.default_price,
                    "Non-finite default price, using {}",
                    DEFAULT_PRICE
                );
                DEFAULT_PRICE
            },
            metrics,
            total_count: AtomicU64::new(0),
            fallback_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    /// Create a predictor without a model (always uses the fallback)
    pub fn new_without_model() -> Self {
        Self::new(None, PredictorConfig::default())
    }

    pub fn from_outcome(outcome: LoadOutcome, config: PredictorConfig) -> Self {
        Self::new(outcome.into_artifact(), config)
    }

    pub fn artifact(&self) -> Option<&Arc<ModelArtifact>> {
        self.artifact.as_ref()
    }

    /// Predict a price; never panics and never returns `(None, None)`
    pub fn predict_price(&self, attributes: &HouseAttributes) -> PredictionResult {
        let start = Instant::now();

        let result = match self.artifact.as_deref() {
            None => {
                debug!("No model loaded, using fallback formula");
                self.fallback(attributes, MODEL_UNAVAILABLE)
            }
            Some(artifact) => match self.run_model(artifact, attributes) {
                Ok(price) => PredictionResult::success(price),
                Err(e) => {
                    warn!(error = %e, "Model path failed, using fallback formula");
                    self.fallback(attributes, &e.to_string())
                }
            },
        };

        self.record(&result, start);
        result
    }

    fn run_model(
        &self,
        artifact: &ModelArtifact,
        attributes: &HouseAttributes,
    ) -> Result<f64, PipelineError> {
        let row = self.preprocessor.build_vector(attributes, artifact)?;

        let input = match artifact.scaler().transform(row.values()) {
            Ok(scaled) => scaled,
            Err(e) => {
                warn!(error = %e, "Scaling failed, continuing with unscaled features");
                row.values().to_vec()
            }
        };

        let raw = artifact.model().predict(&input)?;
        if self.output_formatter.is_clamped(raw) {
            debug!(raw, "Model output outside price bounds, clamping");
        }
        Ok(self.output_formatter.format(raw)?)
    }

    fn fallback(&self, attributes: &HouseAttributes, cause: &str) -> PredictionResult {
        match self.fallback.price(attributes) {
            Ok((price, note)) => PredictionResult::degraded(
                price,
                PredictionSource::Fallback,
                format!("{}; {}", cause, note),
            ),
            Err(e @ StructuralInputError::NotInteger { .. }) => {
                warn!(error = %e, "Attributes unusable, no price produced");
                PredictionResult::failed(format!("{}; {}", cause, e))
            }
            Err(e @ StructuralInputError::Missing(_)) => {
                warn!(error = %e, "Fallback formula failed, using default price");
                PredictionResult::degraded(
                    self.default_price,
                    PredictionSource::DefaultConstant,
                    format!("{}; {}; {}", cause, e, DEFAULT_PREDICTION_NOTE),
                )
            }
        }
    }

    fn record(&self, result: &PredictionResult, start: Instant) {
        self.total_count.fetch_add(1, Ordering::Relaxed);
        match result.source() {
            PredictionSource::Model => {}
            PredictionSource::Fallback | PredictionSource::DefaultConstant => {
                self.fallback_count.fetch_add(1, Ordering::Relaxed);
            }
            PredictionSource::Unavailable => {
                self.failure_count.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.metrics.observe_prediction_latency(start.elapsed().as_secs_f64());
        self.metrics.inc_predictions(result.source());
    }

    /// Get inference statistics
    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_predictions: self.total_count.load(Ordering::Relaxed),
            fallback_predictions: self.fallback_count.load(Ordering::Relaxed),
            failed_predictions: self.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl PricePredictor for HousePricePredictor {
    fn predict_price(&self, attributes: &HouseAttributes) -> PredictionResult {
        HousePricePredictor::predict_price(self, attributes)
    }

    fn model_info(&self) -> Option<ModelInfo> {
        self.artifact.as_deref().map(ModelArtifact::info)
    }

    fn stats(&self) -> InferenceStats {
        HousePricePredictor::stats(self)
    }

    fn is_model_loaded(&self) -> bool {
        self.artifact.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::{
        CategoricalEncoder, IdentityScaler, LabelEncoder, LinearRegressor, Regressor, Scaler,
        StandardScaler,
    };
    use crate::error::{InferenceError, ScalingError};
    use crate::models::fields;
    use std::collections::BTreeMap;

    #[derive(Debug)]
    struct FailingRegressor;

    impl Regressor for FailingRegressor {
        fn predict(&self, _row: &[f64]) -> Result<f64, InferenceError> {
            Err(InferenceError::Backend("weights corrupted".to_string()))
        }

        fn kind(&self) -> &'static str {
            "failing"
        }
    }

    #[derive(Debug)]
    struct FailingScaler;

    impl Scaler for FailingScaler {
        fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError> {
            Err(ScalingError::WidthMismatch {
                expected: row.len() + 1,
                actual: row.len(),
            })
        }
    }

    const COLUMNS: [&str; 4] = ["area", "bedrooms", "mainroad", "prefarea"];

    fn encoders() -> BTreeMap<String, Box<dyn CategoricalEncoder>> {
        ["mainroad", "prefarea"]
            .into_iter()
            .map(|name| {
                let enc: Box<dyn CategoricalEncoder> =
                    Box::new(LabelEncoder::new(vec!["no".into(), "yes".into()]));
                (name.to_string(), enc)
            })
            .collect()
    }

    fn artifact_with(model: Box<dyn Regressor>, scaler: Box<dyn Scaler>) -> Arc<ModelArtifact> {
        Arc::new(ModelArtifact::new(
            model,
            scaler,
            encoders(),
            COLUMNS.iter().map(|c| c.to_string()).collect(),
        ))
    }

    fn linear(coefficients: [f64; 4], intercept: f64) -> Box<dyn Regressor> {
        Box::new(LinearRegressor::new(coefficients.to_vec(), intercept))
    }

    fn house() -> HouseAttributes {
        HouseAttributes::new()
            .with(fields::AREA, 2000)
            .with(fields::BEDROOMS, 3)
            .with(fields::BATHROOMS, 2)
            .with(fields::STORIES, 2)
            .with(fields::PARKING, 1)
            .with(fields::MAINROAD, "yes")
            .with(fields::GUESTROOM, "no")
            .with(fields::BASEMENT, "no")
            .with(fields::HOTWATERHEATING, "no")
            .with(fields::AIRCONDITIONING, "yes")
            .with(fields::PREFAREA, "yes")
            .with(fields::FURNISHINGSTATUS, "furnished")
    }

    #[test]
    fn test_full_success_has_no_diagnostic() {
        // 100*2000 + 10000*3 + 20000*1 + 50000*1 + 5000
        let artifact = artifact_with(
            linear([100.0, 10_000.0, 20_000.0, 50_000.0], 5_000.0),
            Box::new(IdentityScaler),
        );
        let predictor = HousePricePredictor::new(Some(artifact), PredictorConfig::default());

        let result = predictor.predict_price(&house());
        assert_eq!(result.price(), Some(305_000.0));
        assert!(result.diagnostic().is_none());
        assert_eq!(result.source(), PredictionSource::Model);
    }

    #[test]
    fn test_scaled_inference() {
        let scaler = StandardScaler::new(vec![1000.0, 0.0, 0.0, 0.0], vec![10.0, 1.0, 1.0, 1.0]);
        let artifact =
            artifact_with(linear([1_000.0, 0.0, 0.0, 0.0], 100_000.0), Box::new(scaler));
        let predictor = HousePricePredictor::new(Some(artifact), PredictorConfig::default());

        // (2000 - 1000) / 10 = 100 -> 100_000 + 100 * 1000
        assert_eq!(predictor.predict_price(&house()).price(), Some(200_000.0));
    }

    #[test]
    fn test_no_artifact_matches_fallback_formula() {
        let predictor = HousePricePredictor::new_without_model();
        let result = predictor.predict_price(&house());

        assert_eq!(result.price(), Some(708_000.0));
        assert_eq!(result.source(), PredictionSource::Fallback);
        assert!(result.diagnostic().unwrap().contains(MODEL_UNAVAILABLE));
        assert!(!predictor.is_model_loaded());
        assert!(predictor.model_info().is_none());
    }

    #[test]
    fn test_inference_failure_falls_back() {
        let artifact = artifact_with(Box::new(FailingRegressor), Box::new(IdentityScaler));
        let predictor = HousePricePredictor::new(Some(artifact), PredictorConfig::default());

        let result = predictor.predict_price(&house());
        let (expected, _) = FormulaFallback.price(&house()).unwrap();
        assert_eq!(result.price(), Some(expected));
        let diagnostic = result.diagnostic().unwrap();
        assert!(diagnostic.contains("inference failed"), "{}", diagnostic);
        assert!(diagnostic.contains("weights corrupted"), "{}", diagnostic);
    }

    #[test]
    fn test_scaling_failure_is_not_fatal() {
        let artifact = artifact_with(linear([100.0, 0.0, 0.0, 0.0], 0.0), Box::new(FailingScaler));
        let predictor = HousePricePredictor::new(Some(artifact), PredictorConfig::default());

        let result = predictor.predict_price(&house());
        assert_eq!(result.price(), Some(200_000.0));
        assert!(result.diagnostic().is_none());
    }

    #[test]
    fn test_preprocess_failure_falls_back() {
        let artifact = Arc::new(ModelArtifact::new(
            linear([1.0, 1.0, 1.0, 1.0], 0.0),
            Box::new(IdentityScaler),
            BTreeMap::new(),
            COLUMNS.iter().map(|c| c.to_string()).collect(),
        ));
        let predictor = HousePricePredictor::new(Some(artifact), PredictorConfig::default());

        let result = predictor.predict_price(&house());
        assert_eq!(result.price(), Some(708_000.0));
        assert!(result.diagnostic().unwrap().contains("preprocessing failed"));
    }

    #[test]
    fn test_output_clamped_at_both_bounds() {
        let high = artifact_with(linear([10_000.0, 0.0, 0.0, 0.0], 0.0), Box::new(IdentityScaler));
        let predictor = HousePricePredictor::new(Some(high), PredictorConfig::default());
        let result = predictor.predict_price(&house());
        assert_eq!(result.price(), Some(2_000_000.0));
        assert!(result.diagnostic().is_none());

        let low = artifact_with(linear([-10_000.0, 0.0, 0.0, 0.0], 0.0), Box::new(IdentityScaler));
        let predictor = HousePricePredictor::new(Some(low), PredictorConfig::default());
        assert_eq!(predictor.predict_price(&house()).price(), Some(50_000.0));
    }

    #[test]
    fn test_nan_bounds_do_not_panic() {
        let high = artifact_with(linear([10_000.0, 0.0, 0.0, 0.0], 0.0), Box::new(IdentityScaler));
        let config = PredictorConfig {
            output: OutputConfig {
                min_price: f64::NAN,
                max_price: 2_000_000.0,
            },
            default_price: f64::NAN,
        };
        let predictor = HousePricePredictor::new(Some(high), config);
        assert_eq!(predictor.predict_price(&house()).price(), Some(2_000_000.0));

        let mut attrs = house();
        attrs.remove(fields::AREA);
        let config = PredictorConfig {
            default_price: f64::INFINITY,
            ..PredictorConfig::default()
        };
        let predictor = HousePricePredictor::new(None, config);
        assert_eq!(predictor.predict_price(&attrs).price(), Some(DEFAULT_PRICE));
    }

    #[test]
    fn test_missing_numeric_field_uses_default_price() {
        let predictor = HousePricePredictor::new_without_model();
        let mut attrs = house();
        attrs.remove(fields::AREA);

        let result = predictor.predict_price(&attrs);
        assert_eq!(result.price(), Some(DEFAULT_PRICE));
        assert_eq!(result.source(), PredictionSource::DefaultConstant);
        assert!(result.diagnostic().unwrap().contains(DEFAULT_PREDICTION_NOTE));
    }

    #[test]
    fn test_unusable_numeric_field_has_no_price() {
        let predictor = HousePricePredictor::new_without_model();
        let attrs = house().with(fields::BATHROOMS, "two");

        let result = predictor.predict_price(&attrs);
        assert!(result.price().is_none());
        assert!(result.diagnostic().is_some());
        assert_eq!(predictor.stats().failed_predictions, 1);
    }

    #[test]
    fn test_stats_track_paths() {
        let predictor = HousePricePredictor::new_without_model();
        predictor.predict_price(&house());
        predictor.predict_price(&house());

        let stats = predictor.stats();
        assert_eq!(stats.total_predictions, 2);
        assert_eq!(stats.fallback_predictions, 2);
        assert_eq!(stats.failed_predictions, 0);
    }
}
