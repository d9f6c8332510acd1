//! Observability infrastructure for the price predictor
//!
//! Provides:
//! - Prometheus metrics (prediction latency, predictions by source, model info, history size)
//! - Structured JSON logging with tracing

use crate::models::PredictionSource;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter_vec, register_int_gauge,
    GaugeVec, Histogram, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Default histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.00001, 0.00005, 0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<PredictorMetricsInner> = OnceLock::new();

struct PredictorMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    model_info: GaugeVec,
    model_loaded: IntGauge,
    history_records: IntGauge,
}

impl PredictorMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "house_price_prediction_latency_seconds",
                "Time spent producing a price prediction",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "house_price_predictions_total",
                "Predictions served, by the path that produced them",
                &["source"]
            )
            .expect("Failed to register predictions_total"),

            model_info: register_gauge_vec!(
                "house_price_model_info",
                "Information about the currently loaded model artifact",
                &["model_name", "model_kind"]
            )
            .expect("Failed to register model_info"),

            model_loaded: register_int_gauge!(
                "house_price_model_loaded",
                "1 when a trained artifact is loaded, 0 when running on the fallback formula"
            )
            .expect("Failed to register model_loaded"),

            history_records: register_int_gauge!(
                "house_price_history_records",
                "Number of stored prediction records"
            )
            .expect("Failed to register history_records"),
        }
    }
}

/// Predictor metrics for Prometheus exposition
///
/// This is a lightweight handle to the global metrics instance.
/// Multiple clones share the same underlying metrics.
#[derive(Clone)]
pub struct PredictorMetrics {
    _private: (),
}

impl Default for PredictorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &PredictorMetricsInner {
        GLOBAL_METRICS.get_or_init(PredictorMetricsInner::new)
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_predictions(&self, source: PredictionSource) {
        self.inner()
            .predictions_total
            .with_label_values(&[source_label(source)])
            .inc();
    }

    /// Update model info; the previous label set is dropped
    pub fn set_model_info(&self, model_name: &str, model_kind: &str) {
        self.inner().model_info.reset();
        self.inner()
            .model_info
            .with_label_values(&[model_name, model_kind])
            .set(1.0);
        self.inner().model_loaded.set(1);
    }

    pub fn clear_model_info(&self) {
        self.inner().model_info.reset();
        self.inner().model_loaded.set(0);
    }

    pub fn set_history_records(&self, count: i64) {
        self.inner().history_records.set(count);
    }
}

fn source_label(source: PredictionSource) -> &'static str {
    match source {
        PredictionSource::Model => "model",
        PredictionSource::Fallback => "fallback",
        PredictionSource::DefaultConstant => "default",
        PredictionSource::Unavailable => "unavailable",
    }
}

/// Structured logger for service events
///
/// Provides consistent JSON-formatted logging for predictions,
/// artifact loading and lifecycle events.
#[derive(Clone)]
pub struct StructuredLogger {
    service_name: String,
}

impl StructuredLogger {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Log a served prediction
    pub fn log_prediction(
        &self,
        user_id: &str,
        price: Option<f64>,
        source: PredictionSource,
        diagnostic: Option<&str>,
    ) {
        match diagnostic {
            None => info!(
                event = "prediction_generated",
                service = %self.service_name,
                user_id = %user_id,
                price = ?price,
                source = source_label(source),
                "Generated price prediction"
            ),
            Some(diagnostic) => warn!(
                event = "prediction_degraded",
                service = %self.service_name,
                user_id = %user_id,
                price = ?price,
                source = source_label(source),
                diagnostic = %diagnostic,
                "Generated price prediction on a degraded path"
            ),
        }
    }

    /// Log a successful artifact load
    pub fn log_artifact_loaded(&self, path: &str, model_name: Option<&str>, features: usize) {
        info!(
            event = "artifact_loaded",
            service = %self.service_name,
            path = %path,
            model_name = ?model_name,
            features = features,
            "Model artifact ready"
        );
    }

    /// Log an artifact that could not be loaded
    pub fn log_artifact_unavailable(&self, path: &str, reason: &str) {
        warn!(
            event = "artifact_unavailable",
            service = %self.service_name,
            path = %path,
            reason = %reason,
            "Model artifact unavailable, serving fallback predictions"
        );
    }

    /// Log service startup
    pub fn log_startup(&self, version: &str, model_loaded: bool) {
        info!(
            event = "service_started",
            service = %self.service_name,
            version = %version,
            model_loaded = model_loaded,
            "House price service started"
        );
    }

    /// Log service shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            service = %self.service_name,
            reason = %reason,
            "House price service shutting down"
        );
    }
}
