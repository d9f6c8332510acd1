//! Trained model artifact: regressor, scaler, encoders and feature layout

mod components;
mod loader;

pub use components::{
    CategoricalEncoder, EncoderSpec, IdentityScaler, LabelEncoder, LinearRegressor,
    MinMaxScaler, OnnxRegressor, Regressor, RegressorSpec, Scaler, ScalerSpec, StandardScaler,
};
pub use loader::{ArtifactLoader, LoadOutcome, DEFAULT_ARTIFACT_PATH};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Descriptive metadata recorded by the training job.
///
/// Never consulted by prediction logic.
#[derive(Debug, Clone, Default)]
pub struct ArtifactMetadata {
    pub model_name: Option<String>,
    pub training_date: Option<String>,
    pub metrics: BTreeMap<String, f64>,
    pub checksum: Option<String>,
    pub source: Option<PathBuf>,
}

/// Serializable summary of a loaded artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: Option<String>,
    pub model_kind: String,
    pub training_date: Option<String>,
    pub metrics: BTreeMap<String, f64>,
    pub features: Vec<String>,
    pub checksum: Option<String>,
}

/// Immutable bundle of fitted components.
///
/// `feature_columns` fixes the width and order of every model input row.
#[derive(Debug)]
pub struct ModelArtifact {
    model: Box<dyn Regressor>,
    scaler: Box<dyn Scaler>,
    encoders: BTreeMap<String, Box<dyn CategoricalEncoder>>,
    feature_columns: Vec<String>,
    metadata: ArtifactMetadata,
}

impl ModelArtifact {
    pub fn new(
        model: Box<dyn Regressor>,
        scaler: Box<dyn Scaler>,
        encoders: BTreeMap<String, Box<dyn CategoricalEncoder>>,
        feature_columns: Vec<String>,
    ) -> Self {
        Self {
            model,
            scaler,
            encoders,
            feature_columns,
            metadata: ArtifactMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ArtifactMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn model(&self) -> &dyn Regressor {
        self.model.as_ref()
    }

    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    pub fn encoders(&self) -> &BTreeMap<String, Box<dyn CategoricalEncoder>> {
        &self.encoders
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            model_name: self.metadata.model_name.clone(),
            model_kind: self.model.kind().to_string(),
            training_date: self.metadata.training_date.clone(),
            metrics: self.metadata.metrics.clone(),
            features: self.feature_columns.clone(),
            checksum: self.metadata.checksum.clone(),
        }
    }
}
