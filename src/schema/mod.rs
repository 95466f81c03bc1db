//! Schema subsystem for tidelog
//!
//! A schema is a fixed, ordered list of typed columns. Column 0 is always the
//! `TIMESTAMP` column. Each column carries its domain bounds and, when
//! indexed, the index id and bucket granularity the planner needs.
//!
//! # Invariants
//!
//! - An indexed column has a positive, finite bucket size
//! - String columns are never indexed
//! - Column names are unique, case-insensitively

mod errors;
mod loader;
mod types;
mod value;

pub use errors::{SchemaError, SchemaErrorCode, SchemaResult, Severity};
pub use loader::{parse_record, ColumnDef, IndexDef, SchemaDef};
pub use types::{Column, ColumnIndex, Schema, SchemaBuilder, TIMESTAMP_COLUMN};
pub use value::{DataType, Value};
