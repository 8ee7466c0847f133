//! Error taxonomy for the computation core
//!
//! Errors are values that classify the failure precisely enough for the
//! transport layer to pick a status code and for a client to act on the
//! message. Engines fail fast on the first violated precondition; no
//! partial results are ever returned.

use thiserror::Error;

/// Machine-readable error codes (stable across releases)
pub mod codes {
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const TYPE_ERROR: &str = "TYPE_ERROR";
    pub const INSUFFICIENT_DATA: &str = "INSUFFICIENT_DATA";
    pub const DIV_ZERO: &str = "DIV_ZERO";
    pub const UNEXPECTED: &str = "UNEXPECTED";
}

/// Classified failure of a statistical computation or its input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StatError {
    /// Malformed shape, out-of-range value, or invalid enumerated option
    #[error("Invalid input value: {0}")]
    Validation(String),

    /// A required field was absent from the request
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A value had the wrong type (non-numeric where a number is required)
    #[error("Invalid data type: {0}")]
    InvalidType(String),

    /// Sample too small for the requested statistic
    #[error("Invalid input value: {0}")]
    InsufficientData(String),

    /// Degenerate input: zero-size group or zero dispersion
    #[error("Division by zero encountered during calculation.")]
    DivisionByZero,

    /// Catch-all; must not occur for inputs satisfying documented preconditions
    #[error("An unexpected error occurred. Please try again later.")]
    Unexpected(String),
}

impl StatError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StatError::Validation(msg.into())
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        StatError::MissingField(field.into())
    }

    pub fn invalid_type(msg: impl Into<String>) -> Self {
        StatError::InvalidType(msg.into())
    }

    pub fn insufficient_data(msg: impl Into<String>) -> Self {
        StatError::InsufficientData(msg.into())
    }

    /// Stable code for logging and clients
    pub fn code(&self) -> &'static str {
        match self {
            StatError::Validation(_) => codes::VALIDATION_ERROR,
            StatError::MissingField(_) => codes::MISSING_FIELD,
            StatError::InvalidType(_) => codes::TYPE_ERROR,
            StatError::InsufficientData(_) => codes::INSUFFICIENT_DATA,
            StatError::DivisionByZero => codes::DIV_ZERO,
            StatError::Unexpected(_) => codes::UNEXPECTED,
        }
    }

    /// True for failures caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StatError::Unexpected(_))
    }
}

pub type StatResult<T> = Result<T, StatError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(StatError::validation("x").code(), "VALIDATION_ERROR");
        assert_eq!(StatError::DivisionByZero.code(), "DIV_ZERO");
        assert_eq!(StatError::insufficient_data("x").code(), "INSUFFICIENT_DATA");
    }

    #[test]
    fn messages_match_wire_contract() {
        let e = StatError::validation("Proportions must be between 0 and 1.");
        assert_eq!(
            e.to_string(),
            "Invalid input value: Proportions must be between 0 and 1."
        );
        assert_eq!(
            StatError::DivisionByZero.to_string(),
            "Division by zero encountered during calculation."
        );
    }

    #[test]
    fn unexpected_is_not_a_client_error() {
        assert!(!StatError::Unexpected("boom".into()).is_client_error());
        assert!(StatError::DivisionByZero.is_client_error());
    }
}
