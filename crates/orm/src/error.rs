//! Error types for the ORM core
//!
//! Recoverable failures (storage, decoding, missing rows, relationship
//! resolution) are surfaced as `ModelError`. Programmer errors — a field tag
//! that resolves to no descriptor, a missing identifier field, a lifecycle
//! precondition violation — panic instead of returning an error.

use std::fmt;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// ORM error type alias
pub type OrmError = ModelError;

/// ORM result type alias
pub type OrmResult<T> = ModelResult<T>;

/// Error types for ORM operations
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Storage boundary failure, propagated unchanged
    Database(String),
    /// Row not found in storage
    NotFound(String),
    /// A requested column is missing from a result row
    ColumnNotFound(String),
    /// Value decoding/encoding error
    Serialization(String),
    /// Relationship resolution failed
    Relationship(String),
    /// Query building error
    Query(String),
    /// Schema execution error
    Schema(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Database(msg) => write!(f, "Database error: {}", msg),
            ModelError::NotFound(what) => write!(f, "Record not found: {}", what),
            ModelError::ColumnNotFound(column) => write!(f, "Column not found: {}", column),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ModelError::Relationship(msg) => write!(f, "Relationship error: {}", msg),
            ModelError::Query(msg) => write!(f, "Query error: {}", msg),
            ModelError::Schema(msg) => write!(f, "Schema error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

// Convert from anyhow errors
impl From<anyhow::Error> for ModelError {
    fn from(err: anyhow::Error) -> Self {
        ModelError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ModelError::ColumnNotFound("name".to_string());
        assert_eq!(err.to_string(), "Column not found: name");

        let err = ModelError::NotFound("galaxies(42)".to_string());
        assert_eq!(err.to_string(), "Record not found: galaxies(42)");
    }

    #[test]
    fn test_serde_json_conversion() {
        let json_err = serde_json::from_str::<i64>("not a number").unwrap_err();
        let err: ModelError = json_err.into();
        assert!(matches!(err, ModelError::Serialization(_)));
    }
}
