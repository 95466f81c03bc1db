//! Predicate-to-range translation
//!
//! With bucket size `b`, literal `v` and column bounds `[cmin, cmax]`:
//!
//! | Operator | Range                               |
//! |----------|-------------------------------------|
//! | EQ       | `[key(v,b), key(v,b)]`              |
//! | GE       | `[key(v,b), key(cmax,b)]`           |
//! | LE       | `[key(cmin,b), key(v,b)]`           |
//! | GT       | `[next(key(v,b)), key(cmax,b)]`     |
//! | LT       | `[key(cmin,b), prev(key(v,b))]`     |
//!
//! When `next`/`prev` leave the key domain the result is the empty range.
//! Fractional literals on integer columns are first rounded toward the
//! matching integers, so `LT 29.5` keeps `29`.

use super::ast::{Predicate, RelOp};
use super::errors::{PlannerError, PlannerResult};
use super::range::KeyRange;
use crate::index::BucketKey;
use crate::schema::{Column, Value};

/// Translates one predicate on an indexed column into a candidate key range.
///
/// `NEQ` and unindexed columns are outside the translator's domain and are
/// reported as errors; the optimizer filters both out before calling.
pub(crate) fn translate(predicate: &Predicate, column: &Column) -> PlannerResult<KeyRange> {
    let field = predicate.field_idx();
    if !predicate.op().is_range_translatable() {
        return Err(PlannerError::non_range_operator(field, predicate.op().symbol()));
    }

    let bucket_size = column.index_bucket_size().ok_or_else(|| {
        PlannerError::corrupt_column_index(field, column.name(), "column is not indexed")
    })?;
    if !(bucket_size.is_finite() && bucket_size > 0.0) {
        return Err(PlannerError::corrupt_column_index(
            field,
            column.name(),
            format!("bucket size {} is not positive and finite", bucket_size),
        ));
    }

    let value = predicate.value();
    if !column.data_type().accepts(value) {
        return Err(PlannerError::literal_mismatch(
            field,
            column.name(),
            format!("{} cannot be compared with {}", value, column.data_type()),
        ));
    }

    let (op, value) = if column.data_type().is_integer() {
        match integral_comparison(predicate.op(), value) {
            Some(comparison) => comparison,
            None => return Ok(KeyRange::empty()),
        }
    } else {
        (predicate.op(), value.clone())
    };

    let key = value.to_key(bucket_size).ok_or_else(|| {
        PlannerError::literal_mismatch(field, column.name(), format!("{} has no key", value))
    })?;

    let range = match op {
        RelOp::Eq => KeyRange::point(key),
        RelOp::Ge => KeyRange::new(key, bound_key(column, column.max(), bucket_size)?),
        RelOp::Le => KeyRange::new(bound_key(column, column.min(), bucket_size)?, key),
        RelOp::Gt => match key.next() {
            Some(low) => KeyRange::new(low, bound_key(column, column.max(), bucket_size)?),
            None => KeyRange::empty(),
        },
        RelOp::Lt => match key.prev() {
            Some(high) => KeyRange::new(bound_key(column, column.min(), bucket_size)?, high),
            None => KeyRange::empty(),
        },
        RelOp::Neq => {
            return Err(PlannerError::non_range_operator(field, predicate.op().symbol()))
        }
    };

    Ok(range)
}

/// Rewrites a fractional literal against an integer column into the
/// equivalent comparison with an integral literal.
///
/// `x < 29.5` becomes `x <= 29` and `x > 29.5` becomes `x >= 30`. Returns
/// `None` for `==`, which no integer satisfies.
fn integral_comparison(op: RelOp, value: &Value) -> Option<(RelOp, Value)> {
    match value {
        Value::Float(v) if v.is_finite() && v.fract() != 0.0 => match op {
            RelOp::Eq => None,
            RelOp::Ge | RelOp::Gt => Some((RelOp::Ge, Value::Float(v.ceil()))),
            RelOp::Le | RelOp::Lt => Some((RelOp::Le, Value::Float(v.floor()))),
            RelOp::Neq => Some((op, value.clone())),
        },
        _ => Some((op, value.clone())),
    }
}

fn bound_key(column: &Column, bound: &Value, bucket_size: f64) -> PlannerResult<BucketKey> {
    bound.to_key(bucket_size).ok_or_else(|| {
        PlannerError::corrupt_column_index(
            column.idx(),
            column.name(),
            format!("domain bound {} has no key", bound),
        )
    })
}
