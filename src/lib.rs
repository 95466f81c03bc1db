//! tidelog - query planning for an append-only record log
//!
//! A schema describes fixed-width records, bucket indexes map keys to record
//! offsets, and the planner turns a filter expression in disjunctive normal
//! form into index-range or full-scan operations.

pub mod cli;
pub mod index;
pub mod observability;
pub mod planner;
pub mod schema;
