//! Compiled expression structures
//!
//! The planner consumes an expression in disjunctive normal form: an ordered
//! list of minterms (ORed), each an ordered list of predicates (ANDed).
//! Predicates address columns by field index and carry a typed literal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{PlannerError, PlannerResult};
use crate::schema::{Schema, Value};

/// Relational operator of a predicate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelOp {
    Eq,
    Neq,
    Ge,
    Le,
    Gt,
    Lt,
}

impl RelOp {
    /// Returns the operator symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Neq => "!=",
            RelOp::Ge => ">=",
            RelOp::Le => "<=",
            RelOp::Gt => ">",
            RelOp::Lt => "<",
        }
    }

    /// Returns false for operators that never describe a contiguous range
    pub fn is_range_translatable(&self) -> bool {
        !matches!(self, RelOp::Neq)
    }
}

impl FromStr for RelOp {
    type Err = PlannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "==" | "=" | "eq" => Ok(RelOp::Eq),
            "!=" | "<>" | "neq" => Ok(RelOp::Neq),
            ">=" | "ge" => Ok(RelOp::Ge),
            "<=" | "le" => Ok(RelOp::Le),
            ">" | "gt" => Ok(RelOp::Gt),
            "<" | "lt" => Ok(RelOp::Lt),
            _ => Err(PlannerError::unknown_operator(s)),
        }
    }
}

impl fmt::Display for RelOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A single compiled predicate: field, operator, literal
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    field_idx: usize,
    op: RelOp,
    value: Value,
}

impl Predicate {
    /// Create a predicate
    pub fn new(field_idx: usize, op: RelOp, value: Value) -> Self {
        Self {
            field_idx,
            op,
            value,
        }
    }

    /// Create an equality predicate
    pub fn eq(field_idx: usize, value: Value) -> Self {
        Self::new(field_idx, RelOp::Eq, value)
    }

    /// Create an inequality predicate
    pub fn neq(field_idx: usize, value: Value) -> Self {
        Self::new(field_idx, RelOp::Neq, value)
    }

    /// Create a range predicate (ge)
    pub fn ge(field_idx: usize, value: Value) -> Self {
        Self::new(field_idx, RelOp::Ge, value)
    }

    /// Create a range predicate (le)
    pub fn le(field_idx: usize, value: Value) -> Self {
        Self::new(field_idx, RelOp::Le, value)
    }

    /// Create a range predicate (gt)
    pub fn gt(field_idx: usize, value: Value) -> Self {
        Self::new(field_idx, RelOp::Gt, value)
    }

    /// Create a range predicate (lt)
    pub fn lt(field_idx: usize, value: Value) -> Self {
        Self::new(field_idx, RelOp::Lt, value)
    }

    /// Field index in the schema
    pub fn field_idx(&self) -> usize {
        self.field_idx
    }

    /// Relational operator
    pub fn op(&self) -> RelOp {
        self.op
    }

    /// Literal value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Renders the predicate with the column name from `schema`
    pub fn describe(&self, schema: &Schema) -> String {
        match schema.column(self.field_idx) {
            Some(col) => format!("{} {} {}", col.name(), self.op, self.value),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} {}", self.field_idx, self.op, self.value)
    }
}

/// Conjunction of predicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Minterm {
    predicates: Vec<Predicate>,
}

impl Minterm {
    /// Creates an empty minterm
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Predicates in order
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Iterates predicates in order
    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }

    /// Number of predicates
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Returns true if the minterm has no predicates
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }
}

impl FromIterator<Predicate> for Minterm {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Minterm {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}

impl fmt::Display for Minterm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.predicates.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(" AND "))
    }
}

/// Disjunction of minterms
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledExpression {
    minterms: Vec<Minterm>,
}

impl CompiledExpression {
    /// Creates an empty expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a minterm
    pub fn with_minterm(mut self, minterm: Minterm) -> Self {
        self.minterms.push(minterm);
        self
    }

    /// Minterms in order
    pub fn minterms(&self) -> &[Minterm] {
        &self.minterms
    }

    /// Iterates minterms in order
    pub fn iter(&self) -> std::slice::Iter<'_, Minterm> {
        self.minterms.iter()
    }

    /// Number of minterms
    pub fn len(&self) -> usize {
        self.minterms.len()
    }

    /// Returns true if the expression has no minterms
    pub fn is_empty(&self) -> bool {
        self.minterms.is_empty()
    }

    /// Binds a name-based expression against a schema.
    ///
    /// Resolves field names (case-insensitively), parses operators and
    /// converts literals to the column type.
    pub fn bind(spec: &[Vec<PredicateSpec>], schema: &Schema) -> PlannerResult<Self> {
        spec.iter()
            .map(|minterm| {
                minterm
                    .iter()
                    .map(|p| p.bind(schema))
                    .collect::<PlannerResult<Minterm>>()
            })
            .collect::<PlannerResult<Vec<Minterm>>>()
            .map(|minterms| Self { minterms })
    }
}

impl FromIterator<Minterm> for CompiledExpression {
    fn from_iter<I: IntoIterator<Item = Minterm>>(iter: I) -> Self {
        Self {
            minterms: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a CompiledExpression {
    type Item = &'a Minterm;
    type IntoIter = std::slice::Iter<'a, Minterm>;

    fn into_iter(self) -> Self::IntoIter {
        self.minterms.iter()
    }
}

impl fmt::Display for CompiledExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.minterms.iter().map(|m| format!("({})", m)).collect();
        write!(f, "{}", parts.join(" OR "))
    }
}

/// Name-based predicate as received in a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateSpec {
    /// Column name
    pub field: String,
    /// Operator: ==, !=, >=, <=, >, < (or eq, neq, ge, le, gt, lt)
    pub op: String,
    /// Literal
    pub value: serde_json::Value,
}

impl PredicateSpec {
    /// Resolves the predicate against a schema
    pub fn bind(&self, schema: &Schema) -> PlannerResult<Predicate> {
        let idx = schema
            .field_index(&self.field)
            .map_err(|_| PlannerError::unknown_field_name(&self.field))?;
        let op: RelOp = self.op.parse()?;

        let col = &schema[idx];
        let value = col.data_type().value_from_json(&self.value).ok_or_else(|| {
            PlannerError::literal_mismatch(
                idx,
                col.name(),
                format!("{} is not a valid {}", self.value, col.data_type()),
            )
        })?;

        Ok(Predicate::new(idx, op, value))
    }
}
