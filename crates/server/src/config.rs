//! Server configuration

use anyhow::{Context, Result};
use predictor_lib::artifact::DEFAULT_ARTIFACT_PATH;
use predictor_lib::history::DEFAULT_PAGE_SIZE;
use predictor_lib::predictor::{
    OutputConfig, PredictorConfig, DEFAULT_PRICE, MAX_MODEL_PRICE, MIN_MODEL_PRICE,
};
use serde::Deserialize;

/// Environment variable prefix, e.g. `HPP_API_PORT`
pub const ENV_PREFIX: &str = "HPP";

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Path of the serialized model artifact
    #[serde(default = "default_artifact_path")]
    pub artifact_path: String,

    /// HTTP listen port
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Lower clamp bound for model output
    #[serde(default = "default_min_price")]
    pub min_price: f64,

    /// Upper clamp bound for model output
    #[serde(default = "default_max_price")]
    pub max_price: f64,

    /// Price for the fixed-constant path
    #[serde(default = "default_price")]
    pub default_price: f64,

    /// Records per history page
    #[serde(default = "default_history_page_size")]
    pub history_page_size: usize,

    /// Service name attached to structured log events
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

fn default_artifact_path() -> String {
    DEFAULT_ARTIFACT_PATH.to_string()
}

fn default_api_port() -> u16 {
    8080
}

fn default_min_price() -> f64 {
    MIN_MODEL_PRICE
}

fn default_max_price() -> f64 {
    MAX_MODEL_PRICE
}

fn default_price() -> f64 {
    DEFAULT_PRICE
}

fn default_history_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_service_name() -> String {
    "house-price-server".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            artifact_path: default_artifact_path(),
            api_port: default_api_port(),
            min_price: default_min_price(),
            max_price: default_max_price(),
            default_price: default_price(),
            history_page_size: default_history_page_size(),
            service_name: default_service_name(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `HPP_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_builder(
            config::Config::builder().add_source(config::Environment::with_prefix(ENV_PREFIX)),
        )
    }

    fn from_builder(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<Self> {
        let config: Self = builder
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid HPP_* configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("min_price", self.min_price),
            ("max_price", self.max_price),
            ("default_price", self.default_price),
        ] {
            if !value.is_finite() {
                anyhow::bail!("Invalid HPP_* configuration: {} must be finite, got {}", name, value);
            }
        }
        if self.history_page_size == 0 {
            anyhow::bail!("Invalid HPP_* configuration: history_page_size must be at least 1");
        }
        Ok(())
    }

    pub fn predictor_config(&self) -> PredictorConfig {
        PredictorConfig {
            output: OutputConfig {
                min_price: self.min_price,
                max_price: self.max_price,
            },
            default_price: self.default_price,
        }
    }
}
