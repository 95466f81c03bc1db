//! Explain plan output
//!
//! Produces deterministic, human-readable explain output for a plan or a
//! planning failure.

use std::fmt;

use serde::Serialize;

use super::errors::PlannerError;
use super::planner::{QueryOp, QueryPlan};

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// FULL_SCAN, INDEX_RANGE or EMPTY (if accepted)
    pub strategy: Option<String>,
    /// Minterms rendered with column names
    pub minterms: Vec<String>,
    /// Operations rendered with column names
    pub operations: Vec<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
}

impl ExplainPlan {
    /// Creates an explain plan from a successful query plan
    pub fn from_plan<L: ?Sized>(plan: &QueryPlan<'_, L>) -> Self {
        let schema = plan.schema();

        let minterms = plan
            .expression()
            .iter()
            .map(|m| {
                let preds: Vec<String> = m.iter().map(|p| p.describe(schema)).collect();
                if preds.is_empty() {
                    "TRUE".to_string()
                } else {
                    preds.join(" AND ")
                }
            })
            .collect();

        let operations = plan
            .ops()
            .iter()
            .map(|op| match op {
                QueryOp::FullScan => "full_scan".to_string(),
                QueryOp::IndexRange { index, range } => {
                    let column = schema
                        .indexed_columns()
                        .find(|c| c.index_id() == Some(*index))
                        .map(|c| c.name())
                        .unwrap_or("?");
                    format!("index_range({} via index {}, {})", column, index, range)
                }
            })
            .collect();

        let strategy = if plan.is_full_scan() {
            "FULL_SCAN"
        } else if plan.matches_nothing() {
            "EMPTY"
        } else {
            "INDEX_RANGE"
        };

        Self {
            accepted: true,
            strategy: Some(strategy.to_string()),
            minterms,
            operations,
            rejection_reason: None,
            rejection_code: None,
        }
    }

    /// Creates an explain plan from a planning error
    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            strategy: None,
            minterms: Vec::new(),
            operations: Vec::new(),
            rejection_reason: Some(err.message().to_string()),
            rejection_code: Some(err.code().code().to_string()),
        }
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            if let Some(strategy) = &self.strategy {
                writeln!(f, "Strategy: {}", strategy)?;
            }
            if !self.minterms.is_empty() {
                writeln!(f, "Minterms:")?;
                for (i, m) in self.minterms.iter().enumerate() {
                    writeln!(f, "  {}. {}", i, m)?;
                }
            }
            if !self.operations.is_empty() {
                writeln!(f, "Operations:")?;
                for op in &self.operations {
                    writeln!(f, "  - {}", op)?;
                }
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
