//! Query planner subsystem for tidelog
//!
//! Turns a compiled filter expression (minterms ORed, predicates ANDed) into
//! an ordered list of scan operations over the data log.
//!
//! # Design Principles
//!
//! - Deterministic: same expression, schema and index contents give the same plan
//! - Bucket-exact ranges: `GT`/`LT` step a whole bucket past the literal's key,
//!   so with `bucket_size > 1` (or on float columns) values in the literal's
//!   own bucket that satisfy the strict comparison are not covered. Executors
//!   needing exact results must re-check that bucket or use `GE`/`LE`.
//! - Global fallback: one unindexable minterm turns the whole plan into a full scan
//!
//! # Index Selection
//!
//! Per minterm, ranges on the same index are intersected. Among the surviving
//! candidates the smallest `approx_count` wins; ties go to the smaller index id.

mod ast;
mod errors;
mod explain;
mod minterm;
mod planner;
mod range;
mod translate;

pub use ast::{CompiledExpression, Minterm, Predicate, PredicateSpec, RelOp};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
pub use planner::{QueryOp, QueryPlan, QueryPlanner};
pub use range::KeyRange;
