//! Delegation metrics
//!
//! - Counters only
//! - Monotonic increase
//! - Thread-safe but lock-minimal

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::tracker::{DelegationTracker, DiagnosticEntry};
use crate::delegation::DelegationStatus;

/// Counters over validation passes and rejections
///
/// All counters use Relaxed atomics; values are exact once writers finish.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Completed validations
    validations: AtomicU64,
    /// Validations that ended delegable
    delegable: AtomicU64,
    /// Validations that ended non-delegable
    rejected: AtomicU64,
    no_del_support_by_column: AtomicU64,
    async_predicate: AtomicU64,
    impure_node: AtomicU64,
    undelegatable_function: AtomicU64,
    other: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    fn status_counter(&self, status: DelegationStatus) -> &AtomicU64 {
        match status {
            DelegationStatus::NoDelSupportByColumn => &self.no_del_support_by_column,
            DelegationStatus::AsyncPredicate => &self.async_predicate,
            DelegationStatus::ImpureNode => &self.impure_node,
            DelegationStatus::UndelegatableFunction => &self.undelegatable_function,
            DelegationStatus::Other => &self.other,
        }
    }

    pub fn increment_status(&self, status: DelegationStatus) {
        self.status_counter(status).fetch_add(1, Ordering::Relaxed);
    }

    pub fn status_count(&self, status: DelegationStatus) -> u64 {
        self.status_counter(status).load(Ordering::Relaxed)
    }

    pub fn increment_validations(&self, delegable: bool) {
        self.validations.fetch_add(1, Ordering::Relaxed);
        if delegable {
            self.delegable.fetch_add(1, Ordering::Relaxed);
        } else {
            self.rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get current snapshot of all metrics as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| String::from("{}"))
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validations: self.validations.load(Ordering::Relaxed),
            delegable: self.delegable.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            no_del_support_by_column: self.no_del_support_by_column.load(Ordering::Relaxed),
            async_predicate: self.async_predicate.load(Ordering::Relaxed),
            impure_node: self.impure_node.load(Ordering::Relaxed),
            undelegatable_function: self.undelegatable_function.load(Ordering::Relaxed),
            other: self.other.load(Ordering::Relaxed),
        }
    }
}

impl DelegationTracker for MetricsRegistry {
    fn record(&self, entry: &DiagnosticEntry) {
        self.increment_status(entry.status);
    }

    fn record_verdict(&self, delegable: bool) {
        self.increment_validations(delegable);
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub validations: u64,
    pub delegable: u64,
    pub rejected: u64,
    pub no_del_support_by_column: u64,
    pub async_predicate: u64,
    pub impure_node: u64,
    pub undelegatable_function: u64,
    pub other: u64,
}
