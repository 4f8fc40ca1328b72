//! Lookup statistics tracking.
//!
//! Thread-safe counters for lookup outcomes during a run. Shared across
//! concurrent lookup tasks via `Arc`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::LookupErrorKind;

/// Thread-safe lookup statistics tracker.
///
/// Tracks resolved lookups and failures per error kind using atomic
/// counters. All error kinds are initialized to zero on creation.
pub struct LookupStats {
    resolved: AtomicUsize,
    failures: HashMap<LookupErrorKind, AtomicUsize>,
}

impl LookupStats {
    /// Creates a tracker with all counters at zero.
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in LookupErrorKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }
        LookupStats {
            resolved: AtomicUsize::new(0),
            failures,
        }
    }

    /// Records a successful resolution.
    pub fn record_resolved(&self) {
        self.resolved.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed lookup under its error kind.
    ///
    /// All kinds are initialized in the constructor; a missing counter
    /// indicates a bug and is logged rather than panicking.
    pub fn record_failure(&self, kind: LookupErrorKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment failure counter for {:?} which is not in the map. \
                 This indicates a bug in LookupStats initialization.",
                kind
            );
        }
    }

    /// Number of successful resolutions.
    pub fn resolved(&self) -> usize {
        self.resolved.load(Ordering::SeqCst)
    }

    /// Failure count for one error kind.
    pub fn failure_count(&self, kind: LookupErrorKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Total failure count across all error kinds.
    pub fn total_failures(&self) -> usize {
        LookupErrorKind::iter().map(|k| self.failure_count(k)).sum()
    }

    /// Logs a per-kind failure breakdown at info level, skipping zero rows.
    pub fn log_summary(&self) {
        log::info!(
            "Lookups: {} resolved, {} failed",
            self.resolved(),
            self.total_failures()
        );
        for kind in LookupErrorKind::iter() {
            let count = self.failure_count(kind);
            if count > 0 {
                log::info!("  {}: {}", kind.label(), count);
            }
        }
    }
}

impl Default for LookupStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = LookupStats::new();
        assert_eq!(stats.resolved(), 0);
        assert_eq!(stats.total_failures(), 0);
    }

    #[test]
    fn failures_tracked_per_kind() {
        let stats = LookupStats::new();
        stats.record_failure(LookupErrorKind::RateLimited);
        stats.record_failure(LookupErrorKind::RateLimited);
        stats.record_failure(LookupErrorKind::InvalidAddress);
        assert_eq!(stats.failure_count(LookupErrorKind::RateLimited), 2);
        assert_eq!(stats.failure_count(LookupErrorKind::InvalidAddress), 1);
        assert_eq!(stats.failure_count(LookupErrorKind::ResolverUnavailable), 0);
        assert_eq!(stats.total_failures(), 3);
    }
}
