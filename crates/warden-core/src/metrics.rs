//! Named counters shared by the walker and the comparer
//!
//! A [`Metrics`] value is created by the caller and passed by reference into
//! each component, so independent runs (and tests) never share counters.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counter names emitted by warden-core.
pub mod names {
    pub const WALK_ROOT_COUNT: &str = "walk-root-count";
    pub const DIR_COUNT: &str = "dir-count";
    pub const FILE_COUNT: &str = "file-count";
    pub const IRREGULAR_COUNT: &str = "irregular-count";
    pub const IRREGULAR_IGNORED: &str = "irregular-ignored";
    pub const FILE_HASH_COUNT: &str = "file-hash-count";
    pub const FILE_HASH_OVERSIZED: &str = "file-hash-oversized";
    pub const FILE_HASH_FAILED: &str = "file-hash-failed";
    pub const PATH_EXCLUDED: &str = "path-excluded";
    pub const DIR_CROSS_DEVICE_SKIPPED: &str = "dir-cross-device-skipped";
    pub const STAT_FAILED: &str = "stat-failed";
    pub const PATH_NOT_UNICODE: &str = "path-not-unicode";
    pub const NOTIFICATION_INFO: &str = "notification-info";
    pub const NOTIFICATION_WARNING: &str = "notification-warning";
    pub const NOTIFICATION_ERROR: &str = "notification-error";

    pub const COMPARE_DUPLICATE_PATH: &str = "compare-duplicate-path";
    pub const REPORT_EXCLUDED: &str = "report-excluded";
    pub const REPORT_ADDED: &str = "report-added";
    pub const REPORT_REMOVED: &str = "report-removed";
    pub const REPORT_UNCHANGED: &str = "report-unchanged";
    pub const REPORT_CONTENT_CHANGED: &str = "report-content-changed";
    pub const REPORT_METADATA_CHANGED: &str = "report-metadata-changed";
    pub const REPORT_INDETERMINATE: &str = "report-indeterminate";
}

/// A set of monotonically increasing named counters.
///
/// Safe to increment from many worker threads at once.
#[derive(Debug, Default)]
pub struct Metrics {
    counters: Mutex<BTreeMap<String, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment `name` by one.
    pub fn incr(&self, name: &str) {
        self.add(name, 1);
    }

    /// Increment `name` by `n`. Counters only ever grow.
    pub fn add(&self, name: &str, n: u64) {
        let mut counters = self.lock();
        match counters.get_mut(name) {
            Some(value) => *value = value.saturating_add(n),
            None => {
                counters.insert(name.to_string(), n);
            }
        }
    }

    /// Current value of `name`, if it was ever touched.
    pub fn get(&self, name: &str) -> Option<u64> {
        self.lock().get(name).copied()
    }

    /// All counter names in sorted order.
    pub fn metrics(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    /// A stable copy of every counter.
    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.lock().clone()
    }

    /// Add every counter of `other` into this collector.
    pub fn merge(&self, other: &Metrics) {
        for (name, value) in other.snapshot() {
            self.add(&name, value);
        }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, u64>> {
        // Counters stay meaningful even if a worker panicked mid-increment
        self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn untouched_counter_is_absent() {
        let metrics = Metrics::new();
        assert_eq!(metrics.get(names::FILE_COUNT), None);
    }

    #[test]
    fn incr_and_add_accumulate() {
        let metrics = Metrics::new();
        metrics.incr("a");
        metrics.add("a", 4);
        metrics.add("b", 0);
        assert_eq!(metrics.get("a"), Some(5));
        assert_eq!(metrics.get("b"), Some(0));
    }

    #[test]
    fn metrics_names_are_sorted() {
        let metrics = Metrics::new();
        metrics.incr("zeta");
        metrics.incr("alpha");
        metrics.incr("mid");
        assert_eq!(metrics.metrics(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn merge_adds_counters() {
        let a = Metrics::new();
        let b = Metrics::new();
        a.add("x", 2);
        b.add("x", 3);
        b.incr("y");
        a.merge(&b);
        assert_eq!(a.get("x"), Some(5));
        assert_eq!(a.get("y"), Some(1));
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let metrics = Arc::new(Metrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1000 {
                        metrics.incr(names::FILE_COUNT);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(metrics.get(names::FILE_COUNT), Some(8000));
    }

    #[test]
    fn saturates_instead_of_wrapping() {
        let metrics = Metrics::new();
        metrics.add("big", u64::MAX);
        metrics.incr("big");
        assert_eq!(metrics.get("big"), Some(u64::MAX));
    }
}
