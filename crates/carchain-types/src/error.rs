use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("subject identifier must not be empty")]
    EmptySubject,

    #[error("subject identifier {0:?} has leading or trailing whitespace")]
    UntrimmedSubject(String),

    #[error("{0:?} is not a canonical lowercase hex digest")]
    NonCanonicalHex(String),

    #[error("telemetry field {field} is not a finite number")]
    NonFiniteField { field: &'static str },
}
