//! Prediction output coercion and clamping
//!
//! Converts raw regressor output into a plain `f64` price inside the
//! plausible house-price range.

use crate::error::InferenceError;
use serde::Deserialize;
use tracing::warn;

/// Lowest price the trained model may report
pub const MIN_MODEL_PRICE: f64 = 50_000.0;

/// Highest price the trained model may report
pub const MAX_MODEL_PRICE: f64 = 2_000_000.0;

/// Bounds applied to trained-model output
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct OutputConfig {
    pub min_price: f64,
    pub max_price: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            min_price: MIN_MODEL_PRICE,
            max_price: MAX_MODEL_PRICE,
        }
    }
}

/// Formats raw model outputs into a bounded price
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self {
            config: OutputConfig::default(),
        }
    }

    /// Bounds are reordered if given inverted; non-finite bounds fall back
    /// to the defaults
    pub fn with_config(config: OutputConfig) -> Self {
        if !config.min_price.is_finite() || !config.max_price.is_finite() {
            warn!(
                min_price = config.min_price,
                max_price = config.max_price,
                "Non-finite price bounds, using defaults"
            );
            return Self::new();
        }
        let (min_price, max_price) = if config.min_price <= config.max_price {
            (config.min_price, config.max_price)
        } else {
            (config.max_price, config.min_price)
        };
        Self {
            config: OutputConfig {
                min_price,
                max_price,
            },
        }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Clamp a raw output; out-of-range values are clamped, not rejected
    pub fn format(&self, raw: f64) -> Result<f64, InferenceError> {
        if !raw.is_finite() {
            return Err(InferenceError::NonFinite(raw));
        }
        Ok(raw.clamp(self.config.min_price, self.config.max_price))
    }

    pub fn is_clamped(&self, raw: f64) -> bool {
        raw < self.config.min_price || raw > self.config.max_price
    }
}

impl Default for OutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_range_value_untouched() {
        let formatter = OutputFormatter::new();
        assert_eq!(formatter.format(425_000.5).unwrap(), 425_000.5);
        assert!(!formatter.is_clamped(425_000.5));
    }

    #[test]
    fn test_out_of_range_values_clamped() {
        let formatter = OutputFormatter::new();
        assert_eq!(formatter.format(9_000_000.0).unwrap(), MAX_MODEL_PRICE);
        assert_eq!(formatter.format(-10.0).unwrap(), MIN_MODEL_PRICE);
        assert!(formatter.is_clamped(-10.0));
    }

    #[test]
    fn test_non_finite_rejected() {
        let formatter = OutputFormatter::new();
        assert!(matches!(
            formatter.format(f64::NAN),
            Err(InferenceError::NonFinite(_))
        ));
        assert!(formatter.format(f64::INFINITY).is_err());
    }

    #[test]
    fn test_inverted_bounds_reordered() {
        let formatter = OutputFormatter::with_config(OutputConfig {
            min_price: 500.0,
            max_price: 100.0,
        });
        assert_eq!(formatter.config().min_price, 100.0);
        assert_eq!(formatter.format(1_000.0).unwrap(), 500.0);
    }

    #[test]
    fn test_non_finite_bounds_use_defaults() {
        for (min_price, max_price) in [
            (f64::NAN, MAX_MODEL_PRICE),
            (MIN_MODEL_PRICE, f64::NAN),
            (f64::NEG_INFINITY, f64::INFINITY),
        ] {
            let formatter = OutputFormatter::with_config(OutputConfig {
                min_price,
                max_price,
            });
            assert_eq!(*formatter.config(), OutputConfig::default());
            assert_eq!(formatter.format(9_000_000.0).unwrap(), MAX_MODEL_PRICE);
        }
    }
}
