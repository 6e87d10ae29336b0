//! Alert Model Error Types

use thiserror::Error;

/// Errors raised while building an alert record
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// Severity outside the known scale
    #[error("Invalid severity: {0}")]
    InvalidSeverity(String),

    /// Status outside the known lifecycle states
    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    /// Dismiss-until timestamp not in `YYYY-MM-DDTHH:MM:SS.ffffffZ` form
    #[error("Invalid dismissUntil value {value:?}: expected YYYY-MM-DDTHH:MM:SS.ffffffZ")]
    InvalidDismissUntil { value: String },

    /// Missing required field
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field present but of the wrong shape
    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidField {
        field: String,
        value: String,
        reason: String,
    },

    /// Reserved; fingerprint resolution never fails
    #[error("Invalid fingerprint input: {0}")]
    InvalidFingerprintInput(String),

    /// Configuration could not be loaded or failed validation
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Record could not be rendered
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Name of the offending field, when the error is tied to one
    pub fn field(&self) -> Option<&str> {
        match self {
            ModelError::InvalidSeverity(_) => Some("severity"),
            ModelError::InvalidStatus(_) => Some("status"),
            ModelError::InvalidDismissUntil { .. } => Some("dismissUntil"),
            ModelError::MissingField(field) => Some(*field),
            ModelError::InvalidField { field, .. } => Some(field.as_str()),
            ModelError::InvalidFingerprintInput(_) => Some("fingerprint"),
            ModelError::Config(_) | ModelError::Serialization(_) => None,
        }
    }
}

impl From<config::ConfigError> for ModelError {
    fn from(err: config::ConfigError) -> Self {
        ModelError::Config(err.to_string())
    }
}

/// Result alias for alert model operations
pub type Result<T> = std::result::Result<T, ModelError>;
