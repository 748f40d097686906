//! Capability registry errors

use thiserror::Error;

/// Result type for metadata registration
pub type CapabilityResult<T> = Result<T, CapabilityError>;

/// Errors raised while assembling metadata registries.
///
/// Lookups never fail with these; an unknown entity is an ordinary
/// "not delegable" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    #[error("Entity already registered: {0}")]
    DuplicateEntity(String),

    #[error("Display name '{display}' maps to both '{first}' and '{second}'")]
    AmbiguousDisplayName {
        display: String,
        first: String,
        second: String,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}
