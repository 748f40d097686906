//! Delegation telemetry
//!
//! Each rejected node produces one `DiagnosticEntry`. Entries are
//! append-only and never influence analysis. Trackers are shared by
//! concurrent validation passes and must accept concurrent appends.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::events::Event;
use super::logger::{Logger, Severity};
use crate::delegation::DelegationStatus;
use crate::syntax::{NodeId, NodeKind};

/// A single telemetry record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEntry {
    /// Unique record ID
    pub id: Uuid,

    /// When the rejection was recorded
    pub timestamp: DateTime<Utc>,

    pub status: DelegationStatus,

    /// Rejected node
    pub node: NodeId,

    pub node_kind: NodeKind,

    /// Enclosing function being validated
    pub function: String,

    /// Free-form classification detail
    pub context: String,
}

impl DiagnosticEntry {
    pub fn new(
        status: DelegationStatus,
        node: NodeId,
        node_kind: NodeKind,
        function: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            status,
            node,
            node_kind,
            function: function.into(),
            context: context.into(),
        }
    }

    /// Serialize to a JSON line
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }
}

/// Sink for delegation telemetry
pub trait DelegationTracker: Send + Sync {
    /// Append an entry
    fn record(&self, entry: &DiagnosticEntry);

    /// Observe the verdict of a completed validation
    fn record_verdict(&self, _delegable: bool) {}
}

/// In-memory tracker
#[derive(Debug, Default, Clone)]
pub struct MemoryTracker {
    entries: Arc<Mutex<Vec<DiagnosticEntry>>>,
}

impl MemoryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded entries, in append order
    pub fn entries(&self) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn entries_with_status(&self, status: DelegationStatus) -> Vec<DiagnosticEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.status == status)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DelegationTracker for MemoryTracker {
    fn record(&self, entry: &DiagnosticEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.clone());
    }
}

/// Tracker that writes each entry as a structured log line
#[derive(Debug, Clone, Copy)]
pub struct LogTracker {
    severity: Severity,
}

impl LogTracker {
    pub fn new(severity: Severity) -> Self {
        Self { severity }
    }
}

impl Default for LogTracker {
    fn default() -> Self {
        Self::new(Severity::Info)
    }
}

impl DelegationTracker for LogTracker {
    fn record(&self, entry: &DiagnosticEntry) {
        let id = entry.id.to_string();
        let node = entry.node.to_string();
        let timestamp = entry.timestamp.to_rfc3339();
        Logger::log(
            self.severity,
            Event::DelegationRejected.as_str(),
            &[
                ("context", &entry.context),
                ("function", &entry.function),
                ("id", &id),
                ("kind", entry.node_kind.as_str()),
                ("node", &node),
                ("status", entry.status.as_str()),
                ("timestamp", &timestamp),
            ],
        );
    }
}

/// Tracker that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracker;

impl DelegationTracker for NullTracker {
    fn record(&self, _entry: &DiagnosticEntry) {}
}

/// Forwards to several trackers in order
#[derive(Default, Clone)]
pub struct FanOutTracker {
    sinks: Vec<Arc<dyn DelegationTracker>>,
}

impl FanOutTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn DelegationTracker>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl DelegationTracker for FanOutTracker {
    fn record(&self, entry: &DiagnosticEntry) {
        for sink in &self.sinks {
            sink.record(entry);
        }
    }

    fn record_verdict(&self, delegable: bool) {
        for sink in &self.sinks {
            sink.record_verdict(delegable);
        }
    }
}
