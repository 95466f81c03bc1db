//! Schema error types
//!
//! Error codes:
//! - TIDE_SCHEMA_UNKNOWN_COLUMN (REJECT)
//! - TIDE_SCHEMA_DUPLICATE_COLUMN (REJECT)
//! - TIDE_SCHEMA_INVALID_TYPE (REJECT)
//! - TIDE_SCHEMA_INVALID_BOUNDS (REJECT)
//! - TIDE_SCHEMA_NOT_INDEXABLE (REJECT)
//! - TIDE_SCHEMA_INVALID_BUCKET (REJECT)
//! - TIDE_SCHEMA_RECORD_MISMATCH (REJECT)
//! - TIDE_SCHEMA_MALFORMED (FATAL)

use std::fmt;

/// Severity levels for schema errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, store state unchanged
    Reject,
    /// Schema definition unusable, startup must abort
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Schema-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorCode {
    /// Column name not present in schema
    TideSchemaUnknownColumn,
    /// Column declared twice
    TideSchemaDuplicateColumn,
    /// Unknown or unsupported column type
    TideSchemaInvalidType,
    /// Column bounds do not fit the type or are inverted
    TideSchemaInvalidBounds,
    /// Column type cannot be indexed, or column already indexed
    TideSchemaNotIndexable,
    /// Bucket size is not a positive finite number
    TideSchemaInvalidBucket,
    /// Record does not match the schema
    TideSchemaRecordMismatch,
    /// Schema definition could not be parsed
    TideSchemaMalformed,
}

impl SchemaErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            SchemaErrorCode::TideSchemaUnknownColumn => "TIDE_SCHEMA_UNKNOWN_COLUMN",
            SchemaErrorCode::TideSchemaDuplicateColumn => "TIDE_SCHEMA_DUPLICATE_COLUMN",
            SchemaErrorCode::TideSchemaInvalidType => "TIDE_SCHEMA_INVALID_TYPE",
            SchemaErrorCode::TideSchemaInvalidBounds => "TIDE_SCHEMA_INVALID_BOUNDS",
            SchemaErrorCode::TideSchemaNotIndexable => "TIDE_SCHEMA_NOT_INDEXABLE",
            SchemaErrorCode::TideSchemaInvalidBucket => "TIDE_SCHEMA_INVALID_BUCKET",
            SchemaErrorCode::TideSchemaRecordMismatch => "TIDE_SCHEMA_RECORD_MISMATCH",
            SchemaErrorCode::TideSchemaMalformed => "TIDE_SCHEMA_MALFORMED",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            SchemaErrorCode::TideSchemaMalformed => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for SchemaErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Schema error type with full context
#[derive(Debug, Clone)]
pub struct SchemaError {
    /// Error code
    code: SchemaErrorCode,
    /// Human-readable message
    message: String,
    /// Column name if applicable
    column: Option<String>,
}

impl SchemaError {
    fn new(code: SchemaErrorCode, message: String, column: Option<String>) -> Self {
        Self {
            code,
            message,
            column,
        }
    }

    /// Create an unknown column error
    pub fn unknown_column(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::TideSchemaUnknownColumn,
            format!("No such attribute '{}'", name),
            Some(name),
        )
    }

    /// Create a duplicate column error
    pub fn duplicate_column(name: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::TideSchemaDuplicateColumn,
            format!("Column '{}' declared more than once", name),
            Some(name),
        )
    }

    /// Create an invalid type error
    pub fn invalid_type(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::TideSchemaInvalidType,
            format!("Column '{}': {}", name, reason.into()),
            Some(name),
        )
    }

    /// Create an invalid bounds error
    pub fn invalid_bounds(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::TideSchemaInvalidBounds,
            format!("Column '{}': {}", name, reason.into()),
            Some(name),
        )
    }

    /// Create a not indexable error
    pub fn not_indexable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::TideSchemaNotIndexable,
            format!("Column '{}' cannot be indexed: {}", name, reason.into()),
            Some(name),
        )
    }

    /// Create an invalid bucket size error
    pub fn invalid_bucket(name: impl Into<String>, bucket_size: f64) -> Self {
        let name = name.into();
        Self::new(
            SchemaErrorCode::TideSchemaInvalidBucket,
            format!(
                "Column '{}': bucket size {} must be positive and finite",
                name, bucket_size
            ),
            Some(name),
        )
    }

    /// Create a record mismatch error
    pub fn record_mismatch(reason: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::TideSchemaRecordMismatch, reason.into(), None)
    }

    /// Create a malformed schema error
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::new(SchemaErrorCode::TideSchemaMalformed, reason.into(), None)
    }

    /// Returns the error code
    pub fn code(&self) -> SchemaErrorCode {
        self.code
    }

    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the column name if applicable
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for SchemaError {}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            SchemaErrorCode::TideSchemaUnknownColumn.code(),
            "TIDE_SCHEMA_UNKNOWN_COLUMN"
        );
        assert_eq!(
            SchemaErrorCode::TideSchemaInvalidBucket.code(),
            "TIDE_SCHEMA_INVALID_BUCKET"
        );
    }

    #[test]
    fn test_only_malformed_is_fatal() {
        assert_eq!(SchemaErrorCode::TideSchemaMalformed.severity(), Severity::Fatal);
        assert_eq!(SchemaErrorCode::TideSchemaNotIndexable.severity(), Severity::Reject);
    }

    #[test]
    fn test_error_display() {
        let err = SchemaError::unknown_column("AGE");
        let display = err.to_string();
        assert!(display.contains("REJECT"));
        assert!(display.contains("TIDE_SCHEMA_UNKNOWN_COLUMN"));
        assert!(display.contains("AGE"));
        assert_eq!(err.column(), Some("AGE"));
    }
}
