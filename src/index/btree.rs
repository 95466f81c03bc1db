//! BTreeMap-based bucket index
//!
//! A `BucketIndex` maps bucketized keys to the record offsets whose indexed
//! value falls in that bucket. Offsets per bucket are kept sorted ascending.
//!
//! The index answers the planner's cost question (`approx_count`) by summing
//! bucket populations over a closed key range.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;

use serde::{Deserialize, Serialize};

use crate::schema::Value;

/// Key in the bucketized key domain.
///
/// Keys derived from any 64-bit signed or unsigned column value fit with room
/// to spare, so stepping one bucket past a column's domain never wraps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketKey(i128);

impl BucketKey {
    /// Smallest representable key
    pub const MIN: BucketKey = BucketKey(i128::MIN);
    /// Largest representable key
    pub const MAX: BucketKey = BucketKey(i128::MAX);

    /// Wraps a raw key
    pub const fn new(raw: i128) -> Self {
        BucketKey(raw)
    }

    /// Returns the raw key
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Successor key, `None` at the top of the domain.
    pub fn next(self) -> Option<BucketKey> {
        self.0.checked_add(1).map(BucketKey)
    }

    /// Predecessor key, `None` at the bottom of the domain.
    pub fn prev(self) -> Option<BucketKey> {
        self.0.checked_sub(1).map(BucketKey)
    }
}

impl From<i64> for BucketKey {
    fn from(v: i64) -> Self {
        BucketKey(v as i128)
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of an index within an [`IndexLog`](super::IndexLog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IndexId(pub u32);

impl fmt::Display for IndexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Record offset type
pub type RecordOffset = u64;

/// Cost oracle exposed by an index to the planner.
///
/// Implementations must be cheap, read-only and safe to call from several
/// planning threads at once.
pub trait RangeIndex: Send + Sync {
    /// Approximate number of records whose key lies in `[low, high]`.
    fn approx_count(&self, low: BucketKey, high: BucketKey) -> u64;
}

/// A single column index using BTreeMap for deterministic ordering.
#[derive(Debug)]
pub struct BucketIndex {
    bucket_size: f64,
    tree: BTreeMap<BucketKey, Vec<RecordOffset>>,
}

impl BucketIndex {
    /// Creates a new empty index with the given bucket granularity
    pub fn new(bucket_size: f64) -> Self {
        Self {
            bucket_size,
            tree: BTreeMap::new(),
        }
    }

    /// Insert an offset under an already-bucketized key.
    ///
    /// Maintains sorted ascending order.
    pub fn insert(&mut self, key: BucketKey, offset: RecordOffset) {
        let offsets = self.tree.entry(key).or_default();

        match offsets.binary_search(&offset) {
            Ok(_) => {}
            Err(pos) => offsets.insert(pos, offset),
        }
    }

    /// Insert an offset for a raw value, bucketizing it first.
    ///
    /// Returns false when the value has no key (strings, non-finite floats).
    pub fn insert_value(&mut self, value: &Value, offset: RecordOffset) -> bool {
        match value.to_key(self.bucket_size) {
            Some(key) => {
                self.insert(key, offset);
                true
            }
            None => false,
        }
    }
}

impl RangeIndex for BucketIndex {
    fn approx_count(&self, low: BucketKey, high: BucketKey) -> u64 {
        if low > high {
            return 0;
        }
        self.tree
            .range((Bound::Included(low), Bound::Included(high)))
            .map(|(_, offsets)| offsets.len() as u64)
            .sum()
    }
}
