//! Index error types
//!
//! Error codes:
//! - TIDE_INDEX_BUILD_FAILED (REJECT)
//! - TIDE_INDEX_RECORD_MISMATCH (REJECT)

use std::fmt;

use crate::schema::SchemaError;

/// Severity levels for index errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Request rejected, index state unchanged
    Reject,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
        }
    }
}

/// Index-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexErrorCode {
    /// Index could not be created on the column
    TideIndexBuildFailed,
    /// Record shape does not match the schema being indexed
    TideIndexRecordMismatch,
}

impl IndexErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            IndexErrorCode::TideIndexBuildFailed => "TIDE_INDEX_BUILD_FAILED",
            IndexErrorCode::TideIndexRecordMismatch => "TIDE_INDEX_RECORD_MISMATCH",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        Severity::Reject
    }
}

impl fmt::Display for IndexErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Index error type with full context
#[derive(Debug)]
pub struct IndexError {
    /// Error code
    code: IndexErrorCode,
    /// Human-readable message
    message: String,
    /// Record offset if applicable
    offset: Option<u64>,
    /// Underlying schema error if applicable
    source: Option<SchemaError>,
}

impl IndexError {
    /// Create an index build failed error
    pub fn build_failed(reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::TideIndexBuildFailed,
            message: reason.into(),
            offset: None,
            source: None,
        }
    }

    /// Create an index build failed error caused by the schema
    pub fn rejected_by_schema(source: SchemaError) -> Self {
        Self {
            code: IndexErrorCode::TideIndexBuildFailed,
            message: source.message().to_string(),
            offset: None,
            source: Some(source),
        }
    }

    /// Create a record mismatch error
    pub fn record_mismatch(offset: u64, reason: impl Into<String>) -> Self {
        Self {
            code: IndexErrorCode::TideIndexRecordMismatch,
            message: format!("Record at offset {}: {}", offset, reason.into()),
            offset: Some(offset),
            source: None,
        }
    }

    /// Returns the error code
    pub fn code(&self) -> IndexErrorCode {
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

    /// Returns the record offset if applicable
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.code.severity(), self.code.code(), self.message)
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Result type for index operations
pub type IndexResult<T> = Result<T, IndexError>;
