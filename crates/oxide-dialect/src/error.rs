//! Error types for dialect resolution.

use crate::field::ScalarKind;

/// Errors that can occur while resolving dialect-specific SQL.
#[derive(Debug, thiserror::Error)]
pub enum DialectError {
    /// No column type could be determined for a field.
    #[error("invalid sql type {type_name} ({kind}) for field '{field}' in dialect {dialect}")]
    UnresolvedType {
        /// The dialect that was asked.
        dialect: &'static str,
        /// The field being resolved.
        field: String,
        /// Name of the field's value type.
        type_name: String,
        /// Kind of the innermost value that was inspected.
        kind: ScalarKind,
    },

    /// No dialect is registered under the requested name.
    #[error("unknown dialect: {0}")]
    UnknownDialect(String),

    /// A catalog query failed on the connection.
    #[error("catalog query failed: {0}")]
    Catalog(String),

    /// A model description is structurally invalid.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// IO error (reading model files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for dialect operations.
pub type Result<T> = std::result::Result<T, DialectError>;
