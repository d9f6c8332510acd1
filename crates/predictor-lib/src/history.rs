//! Per-user prediction history
//!
//! In-memory key-value store of served predictions keyed by user id, with
//! newest-first pagination and dashboard statistics.

use crate::models::{HouseAttributes, PredictionSource};
use crate::observability::PredictorMetrics;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tracing::debug;

/// Records per history page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Records considered by dashboard statistics
pub const DASHBOARD_RECENT: usize = 10;

/// A stored prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: u64,
    pub user_id: String,
    pub attributes: HouseAttributes,
    pub predicted_price: f64,
    pub source: PredictionSource,
    pub predicted_at: DateTime<Utc>,
}

/// One page of a newest-first listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub pages: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.page < self.pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

/// Summary over a user's most recent predictions
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    /// All predictions for the user, not just the recent window
    pub total_predictions: usize,
    pub avg_price: f64,
    pub max_price: f64,
    pub min_price: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("prediction {0} not found")]
    NotFound(u64),

    #[error("prediction {0} belongs to another user")]
    Forbidden(u64),
}

/// Prediction store keyed by user
pub struct PredictionStore {
    by_user: DashMap<String, Vec<PredictionRecord>>,
    owners: DashMap<u64, String>,
    next_id: AtomicU64,
    metrics: PredictorMetrics,
}

impl Default for PredictionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionStore {
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
            owners: DashMap::new(),
            next_id: AtomicU64::new(1),
            metrics: PredictorMetrics::new(),
        }
    }

    /// Store a prediction and return the saved record
    pub fn record(
        &self,
        user_id: &str,
        attributes: HouseAttributes,
        predicted_price: f64,
        source: PredictionSource,
    ) -> PredictionRecord {
        let record = PredictionRecord {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id: user_id.to_string(),
            attributes,
            predicted_price,
            source,
            predicted_at: Utc::now(),
        };

        // Owner is published while the user's shard is still locked, so a
        // listed record is always visible to `get` and `delete`
        let mut records = self.by_user.entry(user_id.to_string()).or_default();
        records.push(record.clone());
        self.owners.insert(record.id, user_id.to_string());
        drop(records);
        self.metrics.set_history_records(self.owners.len() as i64);

        debug!(user_id = %user_id, id = record.id, "Prediction recorded");
        record
    }

    /// Newest-first page; page numbers start at 1
    pub fn page(&self, user_id: &str, page: usize, per_page: usize) -> Page<PredictionRecord> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let (items, total) = match self.by_user.get(user_id) {
            Some(records) => (
                records
                    .iter()
                    .rev()
                    .skip((page - 1).saturating_mul(per_page))
                    .take(per_page)
                    .cloned()
                    .collect(),
                records.len(),
            ),
            None => (Vec::new(), 0),
        };

        Page {
            items,
            page,
            per_page,
            total,
            pages: total.div_ceil(per_page),
        }
    }

    /// The `n` newest records
    pub fn recent(&self, user_id: &str, n: usize) -> Vec<PredictionRecord> {
        self.by_user
            .get(user_id)
            .map(|records| records.iter().rev().take(n).cloned().collect())
            .unwrap_or_default()
    }

    pub fn count(&self, user_id: &str) -> usize {
        self.by_user.get(user_id).map(|r| r.len()).unwrap_or(0)
    }

    pub fn get(&self, user_id: &str, id: u64) -> Result<PredictionRecord, HistoryError> {
        self.check_owner(user_id, id)?;
        self.by_user
            .get(user_id)
            .and_then(|records| records.iter().find(|r| r.id == id).cloned())
            .ok_or(HistoryError::NotFound(id))
    }

    /// Delete one of the user's own predictions
    pub fn delete(&self, user_id: &str, id: u64) -> Result<(), HistoryError> {
        self.check_owner(user_id, id)?;

        let mut records = self
            .by_user
            .get_mut(user_id)
            .ok_or(HistoryError::NotFound(id))?;
        records.retain(|r| r.id != id);
        self.owners.remove(&id);
        drop(records);
        self.metrics.set_history_records(self.owners.len() as i64);

        debug!(user_id = %user_id, id, "Prediction deleted");
        Ok(())
    }

    /// Total over all records, price statistics over the most recent ones
    pub fn dashboard(&self, user_id: &str) -> DashboardStats {
        let recent = self.recent(user_id, DASHBOARD_RECENT);
        let total_predictions = self.count(user_id);
        if recent.is_empty() {
            return DashboardStats {
                total_predictions,
                ..Default::default()
            };
        }

        let prices: Vec<f64> = recent.iter().map(|r| r.predicted_price).collect();
        DashboardStats {
            total_predictions,
            avg_price: prices.iter().sum::<f64>() / prices.len() as f64,
            max_price: prices.iter().copied().fold(f64::MIN, f64::max),
            min_price: prices.iter().copied().fold(f64::MAX, f64::min),
        }
    }

    fn check_owner(&self, user_id: &str, id: u64) -> Result<(), HistoryError> {
        let owner = self
            .owners
            .get(&id)
            .map(|o| o.value().clone())
            .ok_or(HistoryError::NotFound(id))?;
        if owner != user_id {
            return Err(HistoryError::Forbidden(id));
        }
        Ok(())
    }
}
