//! Metrics registry for tidelog
//!
//! - Counters only, monotonic
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Planner counters
///
/// Relaxed ordering: counters are observational and never gate planning.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    plans_built: AtomicU64,
    full_scan_fallbacks: AtomicU64,
    minterms_unsatisfiable: AtomicU64,
    index_ranges_emitted: AtomicU64,
    planning_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment plans built
    pub fn increment_plans_built(&self) {
        self.plans_built.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment full-scan fallbacks
    pub fn increment_full_scan_fallbacks(&self) {
        self.full_scan_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    /// Increment dropped, unsatisfiable minterms
    pub fn increment_minterms_unsatisfiable(&self) {
        self.minterms_unsatisfiable.fetch_add(1, Ordering::Relaxed);
    }

    /// Add emitted index range ops
    pub fn add_index_ranges(&self, count: u64) {
        self.index_ranges_emitted.fetch_add(count, Ordering::Relaxed);
    }

    /// Increment planning failures
    pub fn increment_planning_failures(&self) {
        self.planning_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            plans_built: self.plans_built.load(Ordering::Relaxed),
            full_scan_fallbacks: self.full_scan_fallbacks.load(Ordering::Relaxed),
            minterms_unsatisfiable: self.minterms_unsatisfiable.load(Ordering::Relaxed),
            index_ranges_emitted: self.index_ranges_emitted.load(Ordering::Relaxed),
            planning_failures: self.planning_failures.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub plans_built: u64,
    pub full_scan_fallbacks: u64,
    pub minterms_unsatisfiable: u64,
    pub index_ranges_emitted: u64,
    pub planning_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_counters_start_at_zero() {
        let metrics = MetricsRegistry::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment() {
        let metrics = MetricsRegistry::new();
        metrics.increment_plans_built();
        metrics.increment_plans_built();
        metrics.increment_full_scan_fallbacks();
        metrics.add_index_ranges(3);

        let snap = metrics.snapshot();
        assert_eq!(snap.plans_built, 2);
        assert_eq!(snap.full_scan_fallbacks, 1);
        assert_eq!(snap.index_ranges_emitted, 3);
        assert_eq!(snap.planning_failures, 0);
    }

    #[test]
    fn test_concurrent_increments() {
        let metrics = Arc::new(MetricsRegistry::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..250 {
                        m.increment_minterms_unsatisfiable();
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(metrics.snapshot().minterms_unsatisfiable, 1000);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = MetricsRegistry::new();
        metrics.increment_planning_failures();

        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["planning_failures"], 1);
    }
}
