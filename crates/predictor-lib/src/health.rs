//! Service health derived from live state
//!
//! The artifact component is fixed by the one-time load at startup. The
//! predictor component is recomputed from inference counters on every probe,
//! so a loaded model that keeps failing shows up as degraded.

use crate::artifact::LoadOutcome;
use crate::predictor::{InferenceStats, PricePredictor};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Predictions observed before the fallback share is judged
pub const MIN_OBSERVED_PREDICTIONS: u64 = 20;

/// Status of a single component or of the whole service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    Healthy,
    /// Still answering, but with fallback pricing
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentHealth {
    pub status: ComponentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentHealth {
    fn healthy() -> Self {
        Self {
            status: ComponentStatus::Healthy,
            message: None,
        }
    }

    fn degraded(message: impl Into<String>) -> Self {
        Self {
            status: ComponentStatus::Degraded,
            message: Some(message.into()),
        }
    }
}

/// Body of the liveness probe
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: ComponentStatus,
    pub artifact: ComponentHealth,
    pub predictor: ComponentHealth,
    pub inference: InferenceStats,
    pub checked_at: DateTime<Utc>,
}

/// Body of the readiness probe
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Health of the running service
#[derive(Debug)]
pub struct ServiceHealth {
    artifact: ComponentHealth,
    ready: AtomicBool,
}

impl ServiceHealth {
    pub fn from_outcome(outcome: &LoadOutcome) -> Self {
        let artifact = match outcome.error() {
            None => ComponentHealth::healthy(),
            Some(e) => ComponentHealth::degraded(e.to_string()),
        };
        Self {
            artifact,
            ready: AtomicBool::new(false),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn report(&self, predictor: &dyn PricePredictor) -> HealthReport {
        let inference = predictor.stats();
        let predictor = predictor_health(predictor.is_model_loaded(), &inference);

        let status = if self.artifact.status == ComponentStatus::Healthy
            && predictor.status == ComponentStatus::Healthy
        {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Degraded
        };

        HealthReport {
            status,
            artifact: self.artifact.clone(),
            predictor,
            inference,
            checked_at: Utc::now(),
        }
    }

    pub fn readiness(&self) -> ReadinessResponse {
        if self.ready.load(Ordering::Acquire) {
            ReadinessResponse {
                ready: true,
                reason: None,
            }
        } else {
            ReadinessResponse {
                ready: false,
                reason: Some("Service not yet initialized".to_string()),
            }
        }
    }
}

fn predictor_health(model_loaded: bool, stats: &InferenceStats) -> ComponentHealth {
    if !model_loaded {
        return ComponentHealth::degraded("no model loaded, serving fallback formula");
    }
    // With a model loaded every fallback is a model-path failure
    if stats.total_predictions >= MIN_OBSERVED_PREDICTIONS
        && stats.fallback_predictions * 2 > stats.total_predictions
    {
        return ComponentHealth::degraded(format!(
            "{} of {} predictions fell back to the formula",
            stats.fallback_predictions, stats.total_predictions
        ));
    }
    ComponentHealth::healthy()
}
