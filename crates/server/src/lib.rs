//! House price prediction HTTP service
//!
//! Serves the predictor, per-user history and model introspection over
//! axum, with health probes and Prometheus metrics.

pub mod api;
pub mod config;
pub mod validation;
