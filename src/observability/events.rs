//! Observable events
//!
//! Events are explicit and typed.

use std::fmt;

use super::logger::Severity;

/// Observable events of the analyzer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Configuration loaded
    ConfigLoaded,
    /// Analysis case loaded
    CaseLoaded,

    /// Validation of an expression begins
    DelegationCheckBegin,
    /// Validation of an expression complete
    DelegationCheckComplete,
    /// A node was judged non-delegable
    DelegationRejected,
    /// An expansion references an entity the provider does not know
    EntityMetadataMissing,

    /// Explain begins
    ExplainBegin,
    /// Explain complete
    ExplainComplete,

    /// Command failed
    CommandFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::CaseLoaded => "CASE_LOADED",
            Event::DelegationCheckBegin => "DELEGATION_CHECK_BEGIN",
            Event::DelegationCheckComplete => "DELEGATION_CHECK_COMPLETE",
            Event::DelegationRejected => "DELEGATION_REJECTED",
            Event::EntityMetadataMissing => "ENTITY_METADATA_MISSING",
            Event::ExplainBegin => "EXPLAIN_BEGIN",
            Event::ExplainComplete => "EXPLAIN_COMPLETE",
            Event::CommandFailed => "COMMAND_FAILED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DelegationCheckBegin
            | Event::DelegationCheckComplete
            | Event::DelegationRejected => Severity::Trace,
            Event::EntityMetadataMissing => Severity::Warn,
            Event::CommandFailed => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
