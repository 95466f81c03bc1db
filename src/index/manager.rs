//! Index log for tidelog
//!
//! Holds every bucket index of a store, addressed by `IndexId`.
//!
//! # API
//!
//! - `add_index(schema, column, bucket_size)` - Create an index and mark the column
//! - `apply_record(schema, record, offset)` - Insert a record into every index
//! - `get(id)` - Direct access to a bucket index
//! - `IndexRegistry::index(id)` - Cost-oracle view used by the planner

use super::btree::{BucketIndex, IndexId, RangeIndex, RecordOffset};
use super::errors::{IndexError, IndexResult};
use crate::schema::{Schema, Value};

/// Read-only view of the indexes, as consumed by the planner
pub trait IndexRegistry {
    /// The index with the given id, if it exists
    fn index(&self, id: IndexId) -> Option<&dyn RangeIndex>;
}

/// Ordered collection of bucket indexes. Ids are positions.
#[derive(Debug, Default)]
pub struct IndexLog {
    indexes: Vec<BucketIndex>,
}

impl IndexLog {
    /// Creates an empty index log
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bucket index on `column` and marks the column indexed.
    ///
    /// The schema is left untouched on failure.
    pub fn add_index(
        &mut self,
        schema: &mut Schema,
        column: &str,
        bucket_size: f64,
    ) -> IndexResult<IndexId> {
        let idx = schema
            .field_index(column)
            .map_err(IndexError::rejected_by_schema)?;
        let id = u32::try_from(self.indexes.len())
            .map(IndexId)
            .map_err(|_| IndexError::build_failed("Index id space exhausted"))?;

        let col = schema
            .column_mut(idx)
            .ok_or_else(|| IndexError::build_failed(format!("Column {} vanished", idx)))?;
        col.set_indexed(id, bucket_size)
            .map_err(IndexError::rejected_by_schema)?;

        self.indexes.push(BucketIndex::new(bucket_size));
        Ok(id)
    }

    /// Inserts a record into every index declared by the schema.
    ///
    /// The record must hold one value per schema column.
    pub fn apply_record(
        &mut self,
        schema: &Schema,
        record: &[Value],
        offset: RecordOffset,
    ) -> IndexResult<()> {
        if record.len() != schema.len() {
            return Err(IndexError::record_mismatch(
                offset,
                format!("expected {} values, got {}", schema.len(), record.len()),
            ));
        }

        for col in schema.indexed_columns() {
            let Some(id) = col.index_id() else { continue };
            let index = self
                .indexes
                .get_mut(id.0 as usize)
                .ok_or_else(|| IndexError::build_failed(format!("Unknown index {}", id)))?;

            if !index.insert_value(&record[col.idx()], offset) {
                return Err(IndexError::record_mismatch(
                    offset,
                    format!("value {} of '{}' has no key", record[col.idx()], col.name()),
                ));
            }
        }

        Ok(())
    }

    /// Direct access to a bucket index
    pub fn get(&self, id: IndexId) -> Option<&BucketIndex> {
        self.indexes.get(id.0 as usize)
    }

    /// Number of indexes
    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    /// Returns true if no index exists
    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

impl IndexRegistry for IndexLog {
    fn index(&self, id: IndexId) -> Option<&dyn RangeIndex> {
        self.get(id).map(|i| i as &dyn RangeIndex)
    }
}
