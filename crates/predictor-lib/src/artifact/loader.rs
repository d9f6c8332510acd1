//! Artifact loading with typed outcomes
//!
//! Loading never panics and never returns an error through `?` to the
//! caller: a missing or broken artifact produces [`LoadOutcome::Failed`]
//! and the service keeps running on the fallback formula.

use super::{
    ArtifactMetadata, CategoricalEncoder, EncoderSpec, ModelArtifact, RegressorSpec, ScalerSpec,
};
use crate::error::ArtifactLoadError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Default artifact location, relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "models/house_price_model.json";

const KEY_MODEL: &str = "model";
const KEY_SCALER: &str = "scaler";
const KEY_ENCODERS: &str = "label_encoders";
const KEY_FEATURES: &str = "feature_columns";

/// Result of an artifact load attempt
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(Arc<ModelArtifact>),
    Failed(ArtifactLoadError),
}

impl LoadOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadOutcome::Loaded(_))
    }

    pub fn artifact(&self) -> Option<&Arc<ModelArtifact>> {
        match self {
            LoadOutcome::Loaded(artifact) => Some(artifact),
            LoadOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ArtifactLoadError> {
        match self {
            LoadOutcome::Loaded(_) => None,
            LoadOutcome::Failed(e) => Some(e),
        }
    }

    pub fn into_artifact(self) -> Option<Arc<ModelArtifact>> {
        match self {
            LoadOutcome::Loaded(artifact) => Some(artifact),
            LoadOutcome::Failed(_) => None,
        }
    }
}

/// Loads serialized artifact bundles from disk
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Load and validate the bundle at `path`
    pub fn load(path: impl AsRef<Path>) -> LoadOutcome {
        let path = path.as_ref();
        match Self::try_load(path) {
            Ok(artifact) => {
                info!(
                    path = %path.display(),
                    model_name = ?artifact.metadata().model_name,
                    model_kind = artifact.model().kind(),
                    features = artifact.feature_columns().len(),
                    checksum = ?artifact.metadata().checksum,
                    "Model artifact loaded"
                );
                LoadOutcome::Loaded(Arc::new(artifact))
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Model artifact unavailable");
                LoadOutcome::Failed(e)
            }
        }
    }

    fn try_load(path: &Path) -> Result<ModelArtifact, ArtifactLoadError> {
        if !path.exists() {
            return Err(ArtifactLoadError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path).map_err(|source| ArtifactLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let root: Value = serde_json::from_slice(&bytes).map_err(|e| malformed(path, e))?;
        let Value::Object(root) = root else {
            return Err(malformed(path, "top level is not an object"));
        };

        let model: RegressorSpec = required(path, &root, KEY_MODEL)?;
        let scaler: ScalerSpec = required(path, &root, KEY_SCALER)?;
        let encoders: BTreeMap<String, EncoderSpec> = required(path, &root, KEY_ENCODERS)?;
        let feature_columns: Vec<String> = required(path, &root, KEY_FEATURES)?;

        if feature_columns.is_empty() {
            return Err(ArtifactLoadError::Invalid {
                path: path.to_path_buf(),
                reason: "feature_columns is empty".to_string(),
            });
        }

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let model = model
            .build(base_dir, feature_columns.len())
            .map_err(|e| malformed(path, format!("{:#}", e)))?;
        let scaler = scaler
            .build()
            .map_err(|e| malformed(path, format!("{:#}", e)))?;
        let encoders: BTreeMap<String, Box<dyn CategoricalEncoder>> = encoders
            .into_iter()
            .map(|(column, spec)| (column, spec.build()))
            .collect();

        let metadata = ArtifactMetadata {
            model_name: optional_text(&root, "model_name"),
            training_date: optional_text(&root, "training_date"),
            metrics: optional_metrics(&root, "model_metrics"),
            checksum: Some(compute_checksum(&bytes)),
            source: Some(path.to_path_buf()),
        };

        Ok(ModelArtifact::new(model, scaler, encoders, feature_columns).with_metadata(metadata))
    }
}

fn malformed(path: &Path, reason: impl ToString) -> ArtifactLoadError {
    ArtifactLoadError::Malformed {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

/// Deserialize a required key; `null` counts as missing
fn required<T: DeserializeOwned>(
    path: &Path,
    root: &Map<String, Value>,
    key: &'static str,
) -> Result<T, ArtifactLoadError> {
    match root.get(key) {
        None | Some(Value::Null) => Err(ArtifactLoadError::MissingKey {
            path: path.to_path_buf(),
            key,
        }),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| malformed(path, format!("{}: {}", key, e))),
    }
}

/// Strings are kept, numbers are rendered, anything else is ignored
fn optional_text(root: &Map<String, Value>, key: &str) -> Option<String> {
    match root.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric entries only; other entries are skipped
fn optional_metrics(root: &Map<String, Value>, key: &str) -> BTreeMap<String, f64> {
    root.get(key)
        .and_then(Value::as_object)
        .map(|metrics| {
            metrics
                .iter()
                .filter_map(|(name, value)| value.as_f64().map(|v| (name.clone(), v)))
                .collect()
        })
        .unwrap_or_default()
}

/// SHA256 of the artifact bytes, hex-encoded
fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
