//! Column metadata and record schema
//!
//! Every schema starts with the implicit `TIMESTAMP` column (ulong, index 0).
//! Column names are case-insensitive and stored upper-cased.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use super::errors::{SchemaError, SchemaResult};
use super::value::{DataType, Value};
use crate::index::IndexId;

/// Name of the implicit timestamp column
pub const TIMESTAMP_COLUMN: &str = "TIMESTAMP";

/// Index state of a column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnIndex {
    /// Index identifier in the index log
    pub index_id: IndexId,
    /// Bucketization granularity
    pub bucket_size: f64,
}

/// Column metadata, read-only to the planner
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    idx: usize,
    offset: usize,
    name: String,
    data_type: DataType,
    min: Value,
    max: Value,
    index: Option<ColumnIndex>,
}

impl Column {
    /// Field index within the schema
    pub fn idx(&self) -> usize {
        self.idx
    }

    /// Byte offset within a record
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Upper-cased column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column data type
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Domain minimum
    pub fn min(&self) -> &Value {
        &self.min
    }

    /// Domain maximum
    pub fn max(&self) -> &Value {
        &self.max
    }

    /// Returns true if the column is indexed
    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Index state, if indexed
    pub fn index(&self) -> Option<ColumnIndex> {
        self.index
    }

    /// Index identifier, if indexed
    pub fn index_id(&self) -> Option<IndexId> {
        self.index.map(|i| i.index_id)
    }

    /// Bucket size, if indexed
    pub fn index_bucket_size(&self) -> Option<f64> {
        self.index.map(|i| i.bucket_size)
    }

    /// Marks the column as indexed.
    ///
    /// Fails for string columns, already-indexed columns, and bucket sizes
    /// that are not positive and finite.
    pub fn set_indexed(&mut self, index_id: IndexId, bucket_size: f64) -> SchemaResult<()> {
        if !self.data_type.is_indexable() {
            return Err(SchemaError::not_indexable(
                &self.name,
                format!("type {} has no key domain", self.data_type),
            ));
        }
        if self.index.is_some() {
            return Err(SchemaError::not_indexable(&self.name, "already indexed"));
        }
        if !(bucket_size.is_finite() && bucket_size > 0.0) {
            return Err(SchemaError::invalid_bucket(&self.name, bucket_size));
        }

        self.index = Some(ColumnIndex {
            index_id,
            bucket_size,
        });
        Ok(())
    }

    /// Sets index state without validation, to simulate corrupted metadata.
    #[cfg(test)]
    pub(crate) fn force_index(&mut self, index_id: IndexId, bucket_size: f64) {
        self.index = Some(ColumnIndex {
            index_id,
            bucket_size,
        });
    }
}

/// Record schema: an ordered list of columns
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<Column>,
    name_map: HashMap<String, usize>,
    record_size: usize,
}

impl Schema {
    /// Starts a schema with only the implicit timestamp column
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// All columns in field order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column by field index
    pub fn column(&self, idx: usize) -> Option<&Column> {
        self.columns.get(idx)
    }

    pub(crate) fn column_mut(&mut self, idx: usize) -> Option<&mut Column> {
        self.columns.get_mut(idx)
    }

    /// Field index by case-insensitive name
    pub fn field_index(&self, name: &str) -> SchemaResult<usize> {
        self.name_map
            .get(&name.to_ascii_uppercase())
            .copied()
            .ok_or_else(|| SchemaError::unknown_column(name))
    }

    /// Column by case-insensitive name
    pub fn column_by_name(&self, name: &str) -> SchemaResult<&Column> {
        let idx = self.field_index(name)?;
        Ok(&self.columns[idx])
    }

    /// Number of columns, including the timestamp
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false: the timestamp column is always present
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Size of one record in bytes
    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Indexed columns in field order
    pub fn indexed_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_indexed())
    }
}

impl Index<usize> for Schema {
    type Output = Column;

    fn index(&self, idx: usize) -> &Column {
        &self.columns[idx]
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for col in &self.columns {
            writeln!(f, "\t{}: {},", col.name, col.data_type)?;
        }
        write!(f, "}}")
    }
}

/// Builds a schema column by column
#[derive(Debug)]
pub struct SchemaBuilder {
    columns: Vec<Column>,
    offset: usize,
    user_provided_ts: bool,
}

impl SchemaBuilder {
    /// Creates a builder holding the implicit timestamp column
    pub fn new() -> Self {
        let ts_type = DataType::ULong;
        let timestamp = Column {
            idx: 0,
            offset: 0,
            name: TIMESTAMP_COLUMN.to_string(),
            data_type: ts_type,
            min: ts_type.min_value(),
            max: ts_type.max_value(),
            index: None,
        };

        Self {
            columns: vec![timestamp],
            offset: ts_type.size(),
            user_provided_ts: false,
        }
    }

    /// Adds a column spanning the full domain of its type
    pub fn add_column(self, data_type: DataType, name: &str) -> SchemaResult<Self> {
        self.add_column_with_bounds(data_type, name, data_type.min_value(), data_type.max_value())
    }

    /// Adds a column with explicit domain bounds.
    ///
    /// Declaring `TIMESTAMP` is allowed only as ulong and adds no column.
    pub fn add_column_with_bounds(
        mut self,
        data_type: DataType,
        name: &str,
        min: Value,
        max: Value,
    ) -> SchemaResult<Self> {
        let name = name.trim().to_ascii_uppercase();
        if name.is_empty() {
            return Err(SchemaError::invalid_type("<unnamed>", "column name is empty"));
        }

        if name == TIMESTAMP_COLUMN {
            if data_type != DataType::ULong {
                return Err(SchemaError::invalid_type(name, "TIMESTAMP must be of ulong type"));
            }
            self.user_provided_ts = true;
            return Ok(self);
        }

        if self.columns.iter().any(|c| c.name == name) {
            return Err(SchemaError::duplicate_column(name));
        }

        if !data_type.accepts(&min) || !data_type.accepts(&max) {
            return Err(SchemaError::invalid_bounds(
                name,
                format!("bounds do not match type {}", data_type),
            ));
        }
        match min.compare(&max) {
            Some(std::cmp::Ordering::Greater) | None => {
                return Err(SchemaError::invalid_bounds(
                    name,
                    format!("min {} exceeds max {}", min, max),
                ));
            }
            _ => {}
        }

        self.columns.push(Column {
            idx: self.columns.len(),
            offset: self.offset,
            name,
            data_type,
            min,
            max,
            index: None,
        });
        self.offset += data_type.size();
        Ok(self)
    }

    /// Returns true if the caller declared the timestamp column explicitly
    pub fn user_provided_ts(&self) -> bool {
        self.user_provided_ts
    }

    /// Finalizes the schema
    pub fn build(self) -> Schema {
        let name_map = self
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.idx))
            .collect();

        Schema {
            columns: self.columns,
            name_map,
            record_size: self.offset,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
