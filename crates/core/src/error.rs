//! Core error types for resource model validation.
//!
//! All errors are explicit and typed - no panics allowed.

use thiserror::Error;

/// Core error type for model and codec operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A field the remote service requires was left empty.
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    /// A record holds a value the remote service would reject.
    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a missing field error.
    pub const fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Create an invalid record error.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord {
            reason: reason.into(),
        }
    }
}

/// The standard Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_display() {
        let err = Error::missing_field("world");
        assert_eq!(err.to_string(), "missing required field 'world'");
    }

    #[test]
    fn test_invalid_record_display() {
        let err = Error::invalid_record("radius must be positive");
        assert!(err.to_string().contains("radius must be positive"));
    }
}
