//! Key-range algebra over the bucketized key domain
//!
//! Ranges are closed: `[low, high]` contains both ends. A range with
//! `low > high` is invalid and matches nothing.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::index::{BucketKey, IndexId};

/// Closed interval of bucketized keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct KeyRange {
    pub low: BucketKey,
    pub high: BucketKey,
}

impl KeyRange {
    /// Creates `[low, high]`; the result may be invalid
    pub fn new(low: BucketKey, high: BucketKey) -> Self {
        Self { low, high }
    }

    /// Range holding exactly one key
    pub fn point(key: BucketKey) -> Self {
        Self::new(key, key)
    }

    /// A canonical invalid range
    pub fn empty() -> Self {
        Self::new(BucketKey::MAX, BucketKey::MIN)
    }

    /// Returns true if `low <= high`
    pub fn is_valid(&self) -> bool {
        self.low <= self.high
    }

    /// Intersection of two ranges. The caller checks validity.
    pub fn intersect(&self, other: &KeyRange) -> KeyRange {
        KeyRange::new(self.low.max(other.low), self.high.min(other.high))
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.low, self.high)
    }
}

/// Per-minterm accumulation of ranges, one per index.
///
/// Iteration is in ascending index id order.
pub(crate) type KeyRangeMap = BTreeMap<IndexId, KeyRange>;

/// Merges `range` into the entry for `id`.
///
/// Returns false, leaving the map untouched, when the merged range is invalid.
pub(crate) fn add_range(ranges: &mut KeyRangeMap, id: IndexId, range: KeyRange) -> bool {
    let merged = match ranges.get(&id) {
        Some(existing) => existing.intersect(&range),
        None => range,
    };

    if !merged.is_valid() {
        return false;
    }
    ranges.insert(id, merged);
    true
}
