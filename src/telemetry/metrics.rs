//! Metrics
//!
//! Token lifecycle metrics collection interfaces and implementations.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::types::TokenStatus;

/// Metric labels.
pub type MetricLabels = HashMap<String, String>;

/// Token metrics interface.
pub trait TokenMetrics: Send + Sync {
    /// Record a token issuance.
    fn record_issued(&self);

    /// Record the outcome of a validate or consume call.
    fn record_check(&self, operation: &str, status: TokenStatus);

    /// Record a revocation.
    fn record_revoked(&self, removed: bool);

    /// Record a maintenance purge.
    fn record_purged(&self, count: u64);

    /// Record a failed operation.
    fn record_error(&self, operation: &str, error_code: &str);
}

/// No-op metrics implementation.
pub struct NoOpMetrics;

impl TokenMetrics for NoOpMetrics {
    fn record_issued(&self) {}
    fn record_check(&self, _operation: &str, _status: TokenStatus) {}
    fn record_revoked(&self, _removed: bool) {}
    fn record_purged(&self, _count: u64) {}
    fn record_error(&self, _operation: &str, _error_code: &str) {}
}

/// No-op metrics singleton.
pub fn no_op_metrics() -> NoOpMetrics {
    NoOpMetrics
}

/// Metric entry for in-memory storage.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    pub name: String,
    pub value: f64,
    pub labels: MetricLabels,
    pub timestamp: i64,
}

/// In-memory metrics for testing.
#[derive(Default)]
pub struct InMemoryMetrics {
    entries: Mutex<Vec<MetricEntry>>,
}

impl InMemoryMetrics {
    /// Create new in-memory metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded entries.
    pub fn get_entries(&self) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get entries by name.
    pub fn get_entries_by_name(&self, name: &str) -> Vec<MetricEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect()
    }

    /// Sum of values recorded under `name`.
    pub fn total(&self, name: &str) -> f64 {
        self.get_entries_by_name(name).iter().map(|e| e.value).sum()
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn record(&self, name: &str, value: f64, labels: MetricLabels) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(MetricEntry {
                name: name.to_string(),
                value,
                labels,
                timestamp: chrono::Utc::now().timestamp_millis(),
            });
    }
}

impl TokenMetrics for InMemoryMetrics {
    fn record_issued(&self) {
        self.record("auth_tokens_issued_total", 1.0, MetricLabels::new());
    }

    fn record_check(&self, operation: &str, status: TokenStatus) {
        let mut labels = MetricLabels::new();
        labels.insert("operation".to_string(), operation.to_string());
        labels.insert("status".to_string(), status.as_label().to_string());
        self.record("auth_token_checks_total", 1.0, labels);
    }

    fn record_revoked(&self, removed: bool) {
        let mut labels = MetricLabels::new();
        labels.insert("removed".to_string(), removed.to_string());
        self.record("auth_token_revocations_total", 1.0, labels);
    }

    fn record_purged(&self, count: u64) {
        self.record("auth_tokens_purged_total", count as f64, MetricLabels::new());
    }

    fn record_error(&self, operation: &str, error_code: &str) {
        let mut labels = MetricLabels::new();
        labels.insert("operation".to_string(), operation.to_string());
        labels.insert("error_code".to_string(), error_code.to_string());
        self.record("auth_token_errors_total", 1.0, labels);
    }
}

/// Create in-memory metrics for testing.
pub fn create_in_memory_metrics() -> InMemoryMetrics {
    InMemoryMetrics::new()
}
