//! Observable events for tidelog
//!
//! Events are explicit and typed; each carries a fixed name and a default
//! severity.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration file loaded and validated
    ConfigLoaded,
    /// An index was created on a column
    IndexBuilt,

    // Planning
    /// A plan was assembled
    PlanComplete,
    /// A clause had no usable index; the plan degraded to a full scan
    PlanFullScanFallback,
    /// A clause had a contradictory range and was dropped
    PlanMintermUnsatisfiable,
    /// Planning aborted with an error
    PlanFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::IndexBuilt => "INDEX_BUILT",
            Event::PlanComplete => "PLAN_COMPLETE",
            Event::PlanFullScanFallback => "PLAN_FULL_SCAN_FALLBACK",
            Event::PlanMintermUnsatisfiable => "PLAN_MINTERM_UNSATISFIABLE",
            Event::PlanFailed => "PLAN_FAILED",
        }
    }

    /// Default severity of the event
    pub fn severity(&self) -> Severity {
        match self {
            Event::ConfigLoaded | Event::IndexBuilt => Severity::Info,
            Event::PlanComplete | Event::PlanMintermUnsatisfiable => Severity::Trace,
            Event::PlanFullScanFallback => Severity::Info,
            Event::PlanFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
