//! Schema definitions loaded from JSON
//!
//! A definition lists user columns; the timestamp column is implicit.
//!
//! ```json
//! {
//!   "columns": [
//!     { "name": "age", "type": "int", "min": 0, "max": 120, "index": { "bucket_size": 1 } },
//!     { "name": "name", "type": "string", "size": 16 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::errors::{SchemaError, SchemaResult};
use super::types::{Schema, TIMESTAMP_COLUMN};
use super::value::{DataType, Value};

/// Index declaration on a column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDef {
    /// Bucketization granularity
    #[serde(default = "default_bucket_size")]
    pub bucket_size: f64,
}

fn default_bucket_size() -> f64 {
    1.0
}

/// Column declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Column name (case-insensitive)
    pub name: String,
    /// Type name: bool, char, short, int, long, ulong, float, double, string
    #[serde(rename = "type")]
    pub type_name: String,
    /// Byte width, strings only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    /// Domain minimum, defaults to the type minimum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<serde_json::Value>,
    /// Domain maximum, defaults to the type maximum
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<serde_json::Value>,
    /// Optional index declaration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexDef>,
}

/// Schema declaration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDef {
    /// User columns in field order
    pub columns: Vec<ColumnDef>,
}

impl SchemaDef {
    /// Parses a definition from a JSON string
    pub fn from_json(content: &str) -> SchemaResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| SchemaError::malformed(format!("Invalid schema JSON: {}", e)))
    }

    /// Builds the column layout. Index declarations are not applied here;
    /// see [`SchemaDef::index_defs`].
    pub fn build(&self) -> SchemaResult<Schema> {
        let mut builder = Schema::builder();

        for col in &self.columns {
            let data_type = DataType::from_name(&col.type_name, col.size).ok_or_else(|| {
                SchemaError::invalid_type(
                    &col.name,
                    format!("unknown type '{}' (size {:?})", col.type_name, col.size),
                )
            })?;

            let min = bound_value(col, data_type, col.min.as_ref(), "min")?
                .unwrap_or_else(|| data_type.min_value());
            let max = bound_value(col, data_type, col.max.as_ref(), "max")?
                .unwrap_or_else(|| data_type.max_value());

            builder = builder.add_column_with_bounds(data_type, &col.name, min, max)?;
        }

        Ok(builder.build())
    }

    /// Declared indexes as `(column name, bucket size)` in declaration order
    pub fn index_defs(&self) -> Vec<(&str, f64)> {
        self.columns
            .iter()
            .filter_map(|c| c.index.as_ref().map(|i| (c.name.as_str(), i.bucket_size)))
            .collect()
    }
}

fn bound_value(
    col: &ColumnDef,
    data_type: DataType,
    json: Option<&serde_json::Value>,
    which: &str,
) -> SchemaResult<Option<Value>> {
    match json {
        None => Ok(None),
        Some(v) => data_type.value_from_json(v).map(Some).ok_or_else(|| {
            SchemaError::invalid_bounds(
                &col.name,
                format!("{} {} is not a valid {}", which, v, data_type),
            )
        }),
    }
}

/// Converts a JSON object into a record aligned with the schema columns.
///
/// Every user column must be present. A missing timestamp is filled with the
/// current time in nanoseconds.
pub fn parse_record(schema: &Schema, json: &serde_json::Value) -> SchemaResult<Vec<Value>> {
    let obj = json
        .as_object()
        .ok_or_else(|| SchemaError::record_mismatch(format!("Record is not an object: {}", json)))?;

    // Keys are matched case-insensitively, like column names.
    let lookup = |name: &str| {
        obj.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    };

    for key in obj.keys() {
        schema.field_index(key).map_err(|_| {
            SchemaError::record_mismatch(format!("Record has undeclared field '{}'", key))
        })?;
    }

    schema
        .columns()
        .iter()
        .map(|col| match lookup(col.name()) {
            Some(v) => col.data_type().value_from_json(v).ok_or_else(|| {
                SchemaError::record_mismatch(format!(
                    "Field '{}': expected {}, got {}",
                    col.name(),
                    col.data_type(),
                    v
                ))
            }),
            None if col.name() == TIMESTAMP_COLUMN => Ok(Value::UInt(current_timestamp())),
            None => Err(SchemaError::record_mismatch(format!(
                "Record is missing field '{}'",
                col.name()
            ))),
        })
        .collect()
}

fn current_timestamp() -> u64 {
    chrono::Utc::now()
        .timestamp_nanos_opt()
        .and_then(|ns| u64::try_from(ns).ok())
        .unwrap_or(0)
}
