//! Per-minterm index selection

use super::ast::Minterm;
use super::errors::{PlannerError, PlannerResult};
use super::range::{add_range, KeyRange, KeyRangeMap};
use super::translate::translate;
use crate::index::{IndexId, IndexRegistry};
use crate::schema::Schema;

/// Result of optimizing one minterm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MintermOutcome {
    /// Contradictory predicates; the minterm matches nothing
    Unsatisfiable,
    /// No predicate can be served by an index
    NoIndexAvailable,
    /// Cheapest index and its narrowed range
    IndexRange { index: IndexId, range: KeyRange },
}

/// Chooses the cheapest index range for a minterm
pub(crate) struct MintermOptimizer<'a, R: IndexRegistry + ?Sized> {
    schema: &'a Schema,
    indexes: &'a R,
}

impl<'a, R: IndexRegistry + ?Sized> MintermOptimizer<'a, R> {
    pub(crate) fn new(schema: &'a Schema, indexes: &'a R) -> Self {
        Self { schema, indexes }
    }

    pub(crate) fn optimize(&self, minterm: &Minterm) -> PlannerResult<MintermOutcome> {
        let mut ranges = KeyRangeMap::new();

        for predicate in minterm {
            let column = self
                .schema
                .column(predicate.field_idx())
                .ok_or_else(|| PlannerError::unknown_field(predicate.field_idx(), self.schema.len()))?;

            let Some(index_id) = column.index_id() else {
                continue;
            };
            if !predicate.op().is_range_translatable() {
                continue;
            }

            let range = translate(predicate, column)?;
            if !add_range(&mut ranges, index_id, range) {
                return Ok(MintermOutcome::Unsatisfiable);
            }
        }

        if ranges.is_empty() {
            return Ok(MintermOutcome::NoIndexAvailable);
        }

        let mut best: Option<(IndexId, KeyRange, u64)> = None;
        for (&id, &range) in &ranges {
            let index = self
                .indexes
                .index(id)
                .ok_or_else(|| PlannerError::missing_index(id, self.column_name(id)))?;
            let cost = index.approx_count(range.low, range.high);

            match best {
                Some((_, _, best_cost)) if cost >= best_cost => {}
                _ => best = Some((id, range, cost)),
            }
        }

        match best {
            Some((index, range, _)) => Ok(MintermOutcome::IndexRange { index, range }),
            None => Err(PlannerError::invariant_violation(
                "Candidate ranges present but no index selected",
            )),
        }
    }

    fn column_name(&self, id: IndexId) -> &str {
        self.schema
            .indexed_columns()
            .find(|c| c.index_id() == Some(id))
            .map(|c| c.name())
            .unwrap_or("<unknown>")
    }
}
