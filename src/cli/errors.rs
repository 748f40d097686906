//! CLI-specific error types
//!
//! Every CLI error ends the command with a non-zero exit code.

use std::fmt;
use std::io;

use crate::capability::CapabilityError;
use crate::config::ConfigError;
use crate::functions::FunctionError;
use crate::syntax::NameError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/input file)
    IoError,
    /// Analysis case is malformed
    InvalidCase,
    /// Enclosing function is not registered
    UnknownFunction,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "DELEG_CLI_CONFIG_ERROR",
            Self::IoError => "DELEG_CLI_IO_ERROR",
            Self::InvalidCase => "DELEG_CLI_INVALID_CASE",
            Self::UnknownFunction => "DELEG_CLI_UNKNOWN_FUNCTION",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Malformed analysis case
    pub fn invalid_case(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidCase, msg)
    }

    pub fn unknown_function(name: &str) -> Self {
        Self::new(
            CliErrorCode::UnknownFunction,
            format!("Function '{}' is not registered", name),
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_case(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config_error(format!("{} ({})", e, e.code()))
    }
}

impl From<CapabilityError> for CliError {
    fn from(e: CapabilityError) -> Self {
        Self::invalid_case(e.to_string())
    }
}

impl From<NameError> for CliError {
    fn from(e: NameError) -> Self {
        Self::invalid_case(e.to_string())
    }
}

impl From<FunctionError> for CliError {
    fn from(e: FunctionError) -> Self {
        match e {
            FunctionError::NotFound(name) => Self::unknown_function(&name),
            other => Self::invalid_case(other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
