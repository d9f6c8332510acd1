//! House price prediction library
//!
//! This crate provides the core functionality for:
//! - Loading trained model artifacts (regressor, scaler, encoders, feature layout)
//! - Feature preprocessing and price inference
//! - Closed-form fallback pricing when the model is unusable
//! - Per-user prediction history
//! - Health checks and observability

pub mod artifact;
pub mod error;
pub mod health;
pub mod history;
pub mod models;
pub mod observability;
pub mod predictor;

pub use artifact::{ArtifactLoader, LoadOutcome, ModelArtifact, ModelInfo};
pub use health::{ComponentHealth, ComponentStatus, HealthReport, ReadinessResponse, ServiceHealth};
pub use history::{DashboardStats, HistoryError, Page, PredictionRecord, PredictionStore};
pub use models::*;
pub use observability::{PredictorMetrics, StructuredLogger};
pub use predictor::{HousePricePredictor, PredictorConfig, PricePredictor};
