//! Planner error types
//!
//! Error codes:
//! - TIDE_PLAN_MALFORMED_PREDICATE (REJECT)
//! - TIDE_PLAN_INVARIANT_VIOLATION (FATAL)
//!
//! Neither is retryable: planning is a pure function of its inputs.

use std::fmt;

use crate::index::IndexId;

/// Severity levels for planner errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Expression rejected; the upstream compiler produced bad input
    Reject,
    /// Internal consistency failure between schema, indexes and planner
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

/// Planner-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerErrorCode {
    /// Predicate references an unknown field, operator or incompatible literal
    TidePlanMalformedPredicate,
    /// Schema and index metadata disagree
    TidePlanInvariantViolation,
}

impl PlannerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            PlannerErrorCode::TidePlanMalformedPredicate => "TIDE_PLAN_MALFORMED_PREDICATE",
            PlannerErrorCode::TidePlanInvariantViolation => "TIDE_PLAN_INVARIANT_VIOLATION",
        }
    }

    /// Returns the severity level for this error
    pub fn severity(&self) -> Severity {
        match self {
            PlannerErrorCode::TidePlanMalformedPredicate => Severity::Reject,
            PlannerErrorCode::TidePlanInvariantViolation => Severity::Fatal,
        }
    }
}

impl fmt::Display for PlannerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Planner error type with full context
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerError {
    /// Error code
    code: PlannerErrorCode,
    /// Human-readable message
    message: String,
    /// Field index if applicable
    field: Option<usize>,
}

impl PlannerError {
    /// Create an error for a predicate on a field the schema does not have
    pub fn unknown_field(field: usize, columns: usize) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanMalformedPredicate,
            message: format!(
                "Predicate references field {} but schema has {} columns",
                field, columns
            ),
            field: Some(field),
        }
    }

    /// Create an error for a field name the schema does not have
    pub fn unknown_field_name(name: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanMalformedPredicate,
            message: format!("No such attribute '{}'", name.into()),
            field: None,
        }
    }

    /// Create an error for an operator outside the supported set
    pub fn unknown_operator(op: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanMalformedPredicate,
            message: format!("Invalid operator in predicate: '{}'", op.into()),
            field: None,
        }
    }

    /// Create an error for an operator that cannot be turned into a key range
    pub fn non_range_operator(field: usize, op: &str) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanMalformedPredicate,
            message: format!("Operator '{}' on field {} has no key range", op, field),
            field: Some(field),
        }
    }

    /// Create an error for a literal that does not fit the column
    pub fn literal_mismatch(field: usize, column: &str, reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanMalformedPredicate,
            message: format!("Literal for '{}': {}", column, reason.into()),
            field: Some(field),
        }
    }

    /// Create an invariant violation error
    pub fn invariant_violation(reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanInvariantViolation,
            message: reason.into(),
            field: None,
        }
    }

    /// Create an error for an index id the registry does not know
    pub fn missing_index(index: IndexId, column: &str) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanInvariantViolation,
            message: format!(
                "Column '{}' is indexed by {} but no such index exists",
                column, index
            ),
            field: None,
        }
    }

    /// Create an error for corrupt index metadata on a column
    pub fn corrupt_column_index(field: usize, column: &str, reason: impl Into<String>) -> Self {
        Self {
            code: PlannerErrorCode::TidePlanInvariantViolation,
            message: format!("Column '{}' index metadata: {}", column, reason.into()),
            field: Some(field),
        }
    }

    /// Returns the error code
    pub fn code(&self) -> PlannerErrorCode {
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

    /// Returns the field index if applicable
    pub fn field(&self) -> Option<usize> {
        self.field
    }

    /// Returns true for internal consistency failures
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for PlannerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for PlannerError {}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
