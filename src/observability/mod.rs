//! Observability subsystem
//!
//! This module provides:
//! - Structured logging (JSON, stderr)
//! - Delegation counters
//! - Per-rejection telemetry through `DelegationTracker`
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on analysis verdicts
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use delegation_analyzer::observability::{log_event, Event, MemoryTracker};
//!
//! log_event(Event::ConfigLoaded);
//!
//! let tracker = MemoryTracker::new();
//! // ... validate ...
//! for entry in tracker.entries() {
//!     println!("{}", entry.to_json());
//! }
//! ```

mod events;
mod logger;
mod metrics;
mod tracker;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use tracker::{
    DelegationTracker, DiagnosticEntry, FanOutTracker, LogTracker, MemoryTracker, NullTracker,
};

#[cfg(test)]
pub(crate) use logger::capture_log;

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event at its own severity with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
