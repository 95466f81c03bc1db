//! Planner Scenario Tests
//!
//! End-to-end planning over a schema with one indexed column:
//! - Range conjunctions narrow to one index range
//! - An unindexable clause forces a full scan
//! - Contradictions produce an empty plan
//! - NEQ never selects an index

use tidelog::index::{BucketKey, IndexId, IndexLog};
use tidelog::planner::{
    CompiledExpression, KeyRange, Minterm, PlannerErrorCode, Predicate, QueryOp, QueryPlanner,
};
use tidelog::schema::{DataType, Schema, Value};

// =============================================================================
// Helper Functions
// =============================================================================

const AGE: usize = 1;
const NAME: usize = 2;

/// Records are never read by the planner.
#[derive(Debug)]
struct NoData;

fn setup(bucket_size: f64) -> (Schema, IndexLog) {
    let mut schema = Schema::builder()
        .add_column_with_bounds(DataType::Int, "age", Value::Int(0), Value::Int(120))
        .unwrap()
        .add_column(DataType::String(16), "name")
        .unwrap()
        .build();
    let mut indexes = IndexLog::new();
    indexes.add_index(&mut schema, "age", bucket_size).unwrap();
    (schema, indexes)
}

fn age_range(low: i64, high: i64) -> QueryOp {
    QueryOp::IndexRange {
        index: IndexId(0),
        range: KeyRange::new(BucketKey::from(low), BucketKey::from(high)),
    }
}

fn single(minterm: Minterm) -> CompiledExpression {
    CompiledExpression::new().with_minterm(minterm)
}

fn plan_ops(schema: &Schema, indexes: &IndexLog, expr: &CompiledExpression) -> Vec<QueryOp> {
    QueryPlanner::new(&NoData, indexes, schema)
        .plan(expr)
        .unwrap()
        .ops()
        .to_vec()
}

// =============================================================================
// Documented Scenarios
// =============================================================================

/// age >= 30 AND age <= 40 narrows to [30, 40].
#[test]
fn test_closed_range() {
    let (schema, indexes) = setup(1.0);
    let expr = single(
        Minterm::new()
            .with_predicate(Predicate::ge(AGE, Value::Int(30)))
            .with_predicate(Predicate::le(AGE, Value::Int(40))),
    );

    assert_eq!(plan_ops(&schema, &indexes, &expr), vec![age_range(30, 40)]);
}

/// (age >= 30 AND age <= 40) OR (name == "bob") with name unindexed.
#[test]
fn test_unindexed_disjunct_forces_full_scan() {
    let (schema, indexes) = setup(1.0);
    let expr = CompiledExpression::new()
        .with_minterm(
            Minterm::new()
                .with_predicate(Predicate::ge(AGE, Value::Int(30)))
                .with_predicate(Predicate::le(AGE, Value::Int(40))),
        )
        .with_minterm(Minterm::new().with_predicate(Predicate::eq(NAME, Value::Str("bob".into()))));

    assert_eq!(plan_ops(&schema, &indexes, &expr), vec![QueryOp::FullScan]);
}

/// age > 10 AND age < 5 can never match.
#[test]
fn test_contradiction_is_empty() {
    let (schema, indexes) = setup(1.0);
    let expr = single(
        Minterm::new()
            .with_predicate(Predicate::gt(AGE, Value::Int(10)))
            .with_predicate(Predicate::lt(AGE, Value::Int(5))),
    );

    let plan = QueryPlanner::new(&NoData, &indexes, &schema).plan(&expr).unwrap();
    assert!(plan.matches_nothing());
    assert!(!plan.is_full_scan());
}

/// age == 50 AND name != "bob" uses the age index only.
#[test]
fn test_neq_on_other_column_is_ignored() {
    let (schema, indexes) = setup(1.0);
    let expr = single(
        Minterm::new()
            .with_predicate(Predicate::eq(AGE, Value::Int(50)))
            .with_predicate(Predicate::neq(NAME, Value::Str("bob".into()))),
    );

    assert_eq!(plan_ops(&schema, &indexes, &expr), vec![age_range(50, 50)]);
}

/// NEQ on an indexed column alone cannot use the index.
#[test]
fn test_neq_on_indexed_column_forces_full_scan() {
    let (schema, indexes) = setup(1.0);
    let expr = single(Minterm::new().with_predicate(Predicate::neq(AGE, Value::Int(50))));

    assert_eq!(plan_ops(&schema, &indexes, &expr), vec![QueryOp::FullScan]);
}

// =============================================================================
// Translation Edges
// =============================================================================

/// Strict comparisons step one key past the literal.
#[test]
fn test_strict_bounds_step_by_one() {
    let (schema, indexes) = setup(1.0);

    let gt = single(Minterm::new().with_predicate(Predicate::gt(AGE, Value::Int(10))));
    assert_eq!(plan_ops(&schema, &indexes, &gt), vec![age_range(11, 120)]);

    let lt = single(Minterm::new().with_predicate(Predicate::lt(AGE, Value::Int(5))));
    assert_eq!(plan_ops(&schema, &indexes, &lt), vec![age_range(0, 4)]);
}

/// Comparisons past the column domain match nothing.
#[test]
fn test_past_domain_edges_are_empty() {
    let (schema, indexes) = setup(1.0);

    let above = single(Minterm::new().with_predicate(Predicate::gt(AGE, Value::Int(120))));
    assert!(plan_ops(&schema, &indexes, &above).is_empty());

    let below = single(Minterm::new().with_predicate(Predicate::lt(AGE, Value::Int(0))));
    assert!(plan_ops(&schema, &indexes, &below).is_empty());
}

/// A fractional bound on an integer column keeps every integer that matches.
#[test]
fn test_fractional_bound_on_integer_column() {
    let (schema, indexes) = setup(1.0);

    let below = single(Minterm::new().with_predicate(Predicate::lt(AGE, Value::Float(29.5))));
    assert_eq!(plan_ops(&schema, &indexes, &below), vec![age_range(0, 29)]);

    let above = single(Minterm::new().with_predicate(Predicate::gt(AGE, Value::Float(29.5))));
    assert_eq!(plan_ops(&schema, &indexes, &above), vec![age_range(30, 120)]);

    let exact = single(Minterm::new().with_predicate(Predicate::eq(AGE, Value::Float(29.5))));
    assert!(plan_ops(&schema, &indexes, &exact).is_empty());
}

/// Keys are bucketized before intersection.
#[test]
fn test_bucketized_ranges() {
    let (schema, indexes) = setup(10.0);
    let expr = single(
        Minterm::new()
            .with_predicate(Predicate::ge(AGE, Value::Int(31)))
            .with_predicate(Predicate::le(AGE, Value::Int(39))),
    );

    assert_eq!(plan_ops(&schema, &indexes, &expr), vec![age_range(3, 3)]);
}

/// Unsatisfiable clauses are dropped, the rest are kept in order.
#[test]
fn test_mixed_clauses_keep_order() {
    let (schema, indexes) = setup(1.0);
    let expr = CompiledExpression::new()
        .with_minterm(Minterm::new().with_predicate(Predicate::eq(AGE, Value::Int(70))))
        .with_minterm(
            Minterm::new()
                .with_predicate(Predicate::ge(AGE, Value::Int(90)))
                .with_predicate(Predicate::le(AGE, Value::Int(80))),
        )
        .with_minterm(Minterm::new().with_predicate(Predicate::le(AGE, Value::Int(18))));

    assert_eq!(
        plan_ops(&schema, &indexes, &expr),
        vec![age_range(70, 70), age_range(0, 18)]
    );
}

// =============================================================================
// Errors
// =============================================================================

/// A literal the column cannot hold aborts the whole plan.
#[test]
fn test_incompatible_literal_aborts() {
    let (schema, indexes) = setup(1.0);
    let expr = CompiledExpression::new()
        .with_minterm(Minterm::new().with_predicate(Predicate::eq(AGE, Value::Int(1))))
        .with_minterm(Minterm::new().with_predicate(Predicate::ge(AGE, Value::Str("x".into()))));

    let err = QueryPlanner::new(&NoData, &indexes, &schema)
        .plan(&expr)
        .unwrap_err();
    assert_eq!(err.code(), PlannerErrorCode::TidePlanMalformedPredicate);
}

/// Index metadata pointing at a missing index is an invariant violation.
#[test]
fn test_schema_index_mismatch_is_fatal() {
    let (schema, _) = setup(1.0);
    let empty = IndexLog::new();
    let expr = single(Minterm::new().with_predicate(Predicate::eq(AGE, Value::Int(1))));

    let err = QueryPlanner::new(&NoData, &empty, &schema)
        .plan(&expr)
        .unwrap_err();
    assert_eq!(err.code(), PlannerErrorCode::TidePlanInvariantViolation);
    assert!(err.is_fatal());
}
