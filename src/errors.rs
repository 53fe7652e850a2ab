//! Error types for stack construction and synthesis

use thiserror::Error;

use crate::domain::{NetworkError, ValidationError};

/// Errors that can occur while building, synthesizing or applying a stack
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StackError {
    /// A stack parameter is malformed, missing or inconsistent
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// No environment profile with the given name
    #[error("Unknown environment profile: {0}")]
    UnknownProfile(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Filesystem error while reading parameters or writing templates
    #[error("I/O error: {0}")]
    Io(String),

    /// The provisioning engine rejected the graph
    #[error("Provisioning engine error: {0}")]
    Engine(String),
}

impl StackError {
    /// Shorthand for an [`StackError::InvalidParameter`]
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        StackError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Attach the offending parameter name to a CIDR parsing failure
    pub fn from_network(name: impl Into<String>, err: NetworkError) -> Self {
        StackError::invalid(name, err.to_string())
    }

    /// Whether this is the parameter validation failure raised by `build`
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, StackError::InvalidParameter { .. })
    }
}

/// Result type for stack operations
pub type StackResult<T> = Result<T, StackError>;

impl From<serde_json::Error> for StackError {
    fn from(err: serde_json::Error) -> Self {
        StackError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for StackError {
    fn from(err: std::io::Error) -> Self {
        StackError::Io(err.to_string())
    }
}

impl From<ValidationError> for StackError {
    fn from(err: ValidationError) -> Self {
        StackError::InvalidParameter {
            name: err.parameter().to_string(),
            reason: err.to_string(),
        }
    }
}
