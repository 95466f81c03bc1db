//! Index subsystem for tidelog
//!
//! Indexes are in-memory, derived state. Each index covers one column and
//! groups record offsets by bucketized key.
//!
//! # Design Principles
//!
//! - Deterministic: BTreeMap iteration order, sorted offsets
//! - Read-only to the planner: only `approx_count` is consulted
//! - Addressed by `IndexId`, assigned in creation order

mod btree;
mod errors;
mod manager;

pub use btree::{BucketIndex, BucketKey, IndexId, RangeIndex, RecordOffset};
pub use errors::{IndexError, IndexErrorCode, IndexResult, Severity};
pub use manager::{IndexLog, IndexRegistry};
