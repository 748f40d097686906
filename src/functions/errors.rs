//! # Function Errors

use thiserror::Error;

/// Result type for function registry operations
pub type FunctionResult<T> = Result<T, FunctionError>;

/// Function registry errors
#[derive(Debug, Clone, Error)]
pub enum FunctionError {
    #[error("Function not found: {0}")]
    NotFound(String),

    #[error("Function already exists: {0}")]
    AlreadyExists(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl FunctionError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            FunctionError::NotFound(_) => "DELEG_FUNCTION_NOT_FOUND",
            FunctionError::AlreadyExists(_) => "DELEG_FUNCTION_EXISTS",
            FunctionError::Internal(_) => "DELEG_FUNCTION_INTERNAL",
        }
    }
}
