//! Observability subsystem for tidelog
//!
//! - Structured logging (JSON lines on stderr)
//! - Counter metrics
//! - Typed events
//!
//! Observability is read-only: it never changes what the planner decides.
//!
//! # Usage
//!
//! ```ignore
//! use tidelog::observability::{log_event_with_fields, Event, MetricsRegistry};
//!
//! log_event_with_fields(Event::PlanComplete, &[("ops", "2")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_plans_built();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log an event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
