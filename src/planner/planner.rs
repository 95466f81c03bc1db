//! Plan assembly
//!
//! Turns a compiled expression into an ordered list of scan operations:
//!
//! - Unsatisfiable minterms contribute nothing
//! - A minterm with no usable index forces a single full scan for the
//!   whole expression
//! - Every other minterm contributes one index range
//!
//! The planner only borrows its collaborators, so one planner can serve
//! concurrent `plan()` calls.

use std::fmt;

use serde::Serialize;

use super::ast::CompiledExpression;
use super::errors::PlannerResult;
use super::minterm::{MintermOptimizer, MintermOutcome};
use super::range::KeyRange;
use crate::index::{BucketKey, IndexId, IndexRegistry};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::schema::Schema;

/// A single scan operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QueryOp {
    /// Scan the whole data log
    FullScan,
    /// Scan the records whose keys in `index` fall inside `range`
    IndexRange { index: IndexId, range: KeyRange },
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryOp::FullScan => write!(f, "full_scan"),
            QueryOp::IndexRange { index, range } => {
                write!(f, "index_range(index={}, range={})", index, range)
            }
        }
    }
}

/// Ordered scan operations plus what the executor needs to run them.
///
/// Candidates from an `IndexRange` must still be checked against the whole
/// minterm; the range is necessary, not sufficient.
#[derive(Debug)]
pub struct QueryPlan<'a, L: ?Sized> {
    data_log: &'a L,
    schema: &'a Schema,
    expression: CompiledExpression,
    ops: Vec<QueryOp>,
}

impl<'a, L: ?Sized> QueryPlan<'a, L> {
    /// Scan operations in order
    pub fn ops(&self) -> &[QueryOp] {
        &self.ops
    }

    /// Data log the plan reads from
    pub fn data_log(&self) -> &'a L {
        self.data_log
    }

    /// Schema the plan was built against
    pub fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Expression the executor re-evaluates per candidate
    pub fn expression(&self) -> &CompiledExpression {
        &self.expression
    }

    /// Returns true if the plan is a single full scan
    pub fn is_full_scan(&self) -> bool {
        matches!(self.ops.as_slice(), [QueryOp::FullScan])
    }

    /// Returns true if no record can match
    pub fn matches_nothing(&self) -> bool {
        self.ops.is_empty()
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if the plan has no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Operations as a JSON array
    pub fn ops_json(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.ops
                .iter()
                .map(|op| match op {
                    QueryOp::FullScan => serde_json::json!({ "op": "full_scan" }),
                    QueryOp::IndexRange { index, range } => serde_json::json!({
                        "op": "index_range",
                        "index": index.0,
                        "range": [key_json(range.low), key_json(range.high)],
                    }),
                })
                .collect(),
        )
    }
}

/// Keys outside the 64-bit integer domains are rendered as strings
fn key_json(key: BucketKey) -> serde_json::Value {
    let raw = key.raw();
    if let Ok(v) = i64::try_from(raw) {
        serde_json::Value::from(v)
    } else if let Ok(v) = u64::try_from(raw) {
        serde_json::Value::from(v)
    } else {
        serde_json::Value::String(raw.to_string())
    }
}

impl<'a, L: ?Sized> fmt::Display for QueryPlan<'a, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ops.iter().map(|op| op.to_string()).collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Query planner bound to a schema, an index registry and a data log
pub struct QueryPlanner<'a, R: IndexRegistry + ?Sized, L: ?Sized> {
    data_log: &'a L,
    indexes: &'a R,
    schema: &'a Schema,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a, R: IndexRegistry + ?Sized, L: ?Sized> QueryPlanner<'a, R, L> {
    /// Create a new planner
    pub fn new(data_log: &'a L, indexes: &'a R, schema: &'a Schema) -> Self {
        Self {
            data_log,
            indexes,
            schema,
            metrics: None,
        }
    }

    /// Records planning outcomes into `metrics`
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Plan an expression.
    ///
    /// Errors abort planning for the whole expression.
    pub fn plan(&self, expression: &CompiledExpression) -> PlannerResult<QueryPlan<'a, L>> {
        match self.assemble(expression) {
            Ok(ops) => {
                if let Some(m) = self.metrics {
                    m.increment_plans_built();
                }
                let minterms = expression.len().to_string();
                let op_count = ops.len().to_string();
                log_event_with_fields(
                    Event::PlanComplete,
                    &[("minterms", minterms.as_str()), ("ops", op_count.as_str())],
                );

                Ok(QueryPlan {
                    data_log: self.data_log,
                    schema: self.schema,
                    expression: expression.clone(),
                    ops,
                })
            }
            Err(e) => {
                if let Some(m) = self.metrics {
                    m.increment_planning_failures();
                }
                log_event_with_fields(
                    Event::PlanFailed,
                    &[("code", e.code().code()), ("message", e.message())],
                );
                Err(e)
            }
        }
    }

    fn assemble(&self, expression: &CompiledExpression) -> PlannerResult<Vec<QueryOp>> {
        let optimizer = MintermOptimizer::new(self.schema, self.indexes);
        let mut ops = Vec::new();

        for (position, minterm) in expression.iter().enumerate() {
            match optimizer.optimize(minterm)? {
                MintermOutcome::Unsatisfiable => {
                    if let Some(m) = self.metrics {
                        m.increment_minterms_unsatisfiable();
                    }
                    let position = position.to_string();
                    log_event_with_fields(
                        Event::PlanMintermUnsatisfiable,
                        &[("minterm", position.as_str())],
                    );
                }
                MintermOutcome::NoIndexAvailable => {
                    if let Some(m) = self.metrics {
                        m.increment_full_scan_fallbacks();
                    }
                    let position = position.to_string();
                    log_event_with_fields(
                        Event::PlanFullScanFallback,
                        &[("minterm", position.as_str())],
                    );
                    ops.clear();
                    ops.push(QueryOp::FullScan);
                    return Ok(ops);
                }
                MintermOutcome::IndexRange { index, range } => {
                    if let Some(m) = self.metrics {
                        m.add_index_ranges(1);
                    }
                    ops.push(QueryOp::IndexRange { index, range });
                }
            }
        }

        Ok(ops)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexLog;
    use crate::planner::{Minterm, PlannerErrorCode, Predicate};
    use crate::schema::{DataType, Value};

    /// Stand-in for the record store
    #[derive(Debug)]
    struct DataLog;

    /// TIMESTAMP, AGE int [0,120] indexed (id 0), NAME string unindexed
    fn setup() -> (Schema, IndexLog) {
        let mut schema = Schema::builder()
            .add_column_with_bounds(DataType::Int, "age", Value::Int(0), Value::Int(120))
            .unwrap()
            .add_column(DataType::String(16), "name")
            .unwrap()
            .build();
        let mut log = IndexLog::new();
        log.add_index(&mut schema, "age", 1.0).unwrap();
        (schema, log)
    }

    fn index_range(index: u32, low: i64, high: i64) -> QueryOp {
        QueryOp::IndexRange {
            index: IndexId(index),
            range: KeyRange::new(BucketKey::from(low), BucketKey::from(high)),
        }
    }

    fn age_between(low: i64, high: i64) -> Minterm {
        Minterm::new()
            .with_predicate(Predicate::ge(1, Value::Int(low)))
            .with_predicate(Predicate::le(1, Value::Int(high)))
    }

    #[test]
    fn test_range_plan() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let plan = planner
            .plan(&CompiledExpression::new().with_minterm(age_between(30, 40)))
            .unwrap();

        assert_eq!(plan.ops(), &[index_range(0, 30, 40)]);
        assert!(!plan.is_full_scan());
    }

    #[test]
    fn test_unindexed_minterm_forces_full_scan() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let expr = CompiledExpression::new()
            .with_minterm(age_between(30, 40))
            .with_minterm(Minterm::new().with_predicate(Predicate::eq(2, Value::Str("bob".into()))));

        let plan = planner.plan(&expr).unwrap();
        assert_eq!(plan.ops(), &[QueryOp::FullScan]);
        assert!(plan.is_full_scan());
    }

    #[test]
    fn test_full_scan_stops_evaluation() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        // The third minterm references a field that does not exist.
        let expr = CompiledExpression::new()
            .with_minterm(age_between(30, 40))
            .with_minterm(Minterm::new())
            .with_minterm(Minterm::new().with_predicate(Predicate::eq(99, Value::Int(1))));

        assert_eq!(planner.plan(&expr).unwrap().ops(), &[QueryOp::FullScan]);
    }

    #[test]
    fn test_contradiction_yields_empty_plan() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let expr = CompiledExpression::new().with_minterm(
            Minterm::new()
                .with_predicate(Predicate::gt(1, Value::Int(10)))
                .with_predicate(Predicate::lt(1, Value::Int(5))),
        );

        let plan = planner.plan(&expr).unwrap();
        assert!(plan.matches_nothing());
        assert_eq!(plan.to_string(), "[]");
    }

    #[test]
    fn test_empty_expression_yields_empty_plan() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        assert!(planner.plan(&CompiledExpression::new()).unwrap().is_empty());
    }

    #[test]
    fn test_neq_is_ignored_for_index_selection() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let expr = CompiledExpression::new().with_minterm(
            Minterm::new()
                .with_predicate(Predicate::eq(1, Value::Int(50)))
                .with_predicate(Predicate::neq(2, Value::Str("bob".into()))),
        );

        assert_eq!(planner.plan(&expr).unwrap().ops(), &[index_range(0, 50, 50)]);
    }

    #[test]
    fn test_one_op_per_satisfiable_minterm() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let expr = CompiledExpression::new()
            .with_minterm(age_between(10, 20))
            .with_minterm(age_between(50, 40))
            .with_minterm(Minterm::new().with_predicate(Predicate::gt(1, Value::Int(100))));

        let plan = planner.plan(&expr).unwrap();
        assert_eq!(plan.ops(), &[index_range(0, 10, 20), index_range(0, 101, 120)]);
        assert_eq!(
            plan.to_string(),
            "[index_range(index=0, range=[10, 20]), index_range(index=0, range=[101, 120])]"
        );
    }

    #[test]
    fn test_plan_carries_expression_and_data_log() {
        let (schema, log) = setup();
        let data_log = vec![1u8, 2, 3];
        let planner = QueryPlanner::new(data_log.as_slice(), &log, &schema);

        let expr = CompiledExpression::new().with_minterm(age_between(30, 40));
        let plan = planner.plan(&expr).unwrap();

        assert_eq!(plan.expression(), &expr);
        assert_eq!(plan.data_log(), &[1, 2, 3]);
        assert_eq!(plan.schema().len(), 3);
    }

    #[test]
    fn test_error_aborts_whole_expression() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let expr = CompiledExpression::new()
            .with_minterm(age_between(30, 40))
            .with_minterm(Minterm::new().with_predicate(Predicate::eq(1, Value::Str("x".into()))));

        let err = planner.plan(&expr).unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::TidePlanMalformedPredicate);
    }

    #[test]
    fn test_missing_index_is_invariant_violation() {
        let (schema, _log) = setup();
        let empty = IndexLog::new();
        let planner = QueryPlanner::new(&DataLog, &empty, &schema);

        let err = planner
            .plan(&CompiledExpression::new().with_minterm(age_between(30, 40)))
            .unwrap_err();
        assert_eq!(err.code(), PlannerErrorCode::TidePlanInvariantViolation);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_metrics_are_recorded() {
        let (schema, log) = setup();
        let metrics = MetricsRegistry::new();
        let planner = QueryPlanner::new(&DataLog, &log, &schema).with_metrics(&metrics);

        let expr = CompiledExpression::new()
            .with_minterm(age_between(30, 40))
            .with_minterm(age_between(50, 40));
        planner.plan(&expr).unwrap();

        let full = CompiledExpression::new().with_minterm(Minterm::new());
        planner.plan(&full).unwrap();

        let bad = CompiledExpression::new()
            .with_minterm(Minterm::new().with_predicate(Predicate::eq(7, Value::Int(0))));
        planner.plan(&bad).unwrap_err();

        let snap = metrics.snapshot();
        assert_eq!(snap.plans_built, 2);
        assert_eq!(snap.index_ranges_emitted, 1);
        assert_eq!(snap.minterms_unsatisfiable, 1);
        assert_eq!(snap.full_scan_fallbacks, 1);
        assert_eq!(snap.planning_failures, 1);
    }

    #[test]
    fn test_ops_json() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let plan = planner
            .plan(&CompiledExpression::new().with_minterm(age_between(30, 40)))
            .unwrap();
        assert_eq!(
            plan.ops_json(),
            serde_json::json!([{ "op": "index_range", "index": 0, "range": [30, 40] }])
        );

        let plan = planner
            .plan(&CompiledExpression::new().with_minterm(Minterm::new()))
            .unwrap();
        assert_eq!(plan.ops_json(), serde_json::json!([{ "op": "full_scan" }]));
    }

    #[test]
    fn test_deterministic_planning() {
        let (schema, log) = setup();
        let planner = QueryPlanner::new(&DataLog, &log, &schema);

        let expr = CompiledExpression::new()
            .with_minterm(age_between(30, 40))
            .with_minterm(Minterm::new().with_predicate(Predicate::lt(1, Value::Int(7))));

        let first = planner.plan(&expr).unwrap();
        for _ in 0..10 {
            assert_eq!(planner.plan(&expr).unwrap().ops(), first.ops());
        }
    }
}
