//! Split metrics.
//!
//! Counters maintained by the split drivers in [`crate::runtime`]. They
//! are updated with relaxed atomics so a monitoring thread can take a
//! [`SplitMetricsSnapshot`] while the split runs.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one reading or writing split.
#[derive(Debug)]
pub struct SplitMetrics {
    /// Records read into tuples.
    pub records_read: AtomicU64,

    /// Tuples handed to the collector.
    pub records_written: AtomicU64,

    /// Failed read or write steps.
    pub errors_total: AtomicU64,

    /// Splits prepared.
    pub prepares_total: AtomicU64,

    /// Splits cleaned up.
    pub cleanups_total: AtomicU64,
}

impl SplitMetrics {
    /// Creates zeroed metrics.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records_read: AtomicU64::new(0),
            records_written: AtomicU64::new(0),
            errors_total: AtomicU64::new(0),
            prepares_total: AtomicU64::new(0),
            cleanups_total: AtomicU64::new(0),
        }
    }

    /// Records a successful read step.
    pub fn record_read(&self) {
        self.records_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a successful write step.
    pub fn record_write(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a failed step.
    pub fn record_error(&self) {
        self.errors_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a prepare.
    pub fn record_prepare(&self) {
        self.prepares_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a cleanup.
    pub fn record_cleanup(&self) {
        self.cleanups_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns a snapshot of the current counters.
    #[must_use]
    pub fn snapshot(&self) -> SplitMetricsSnapshot {
        SplitMetricsSnapshot {
            records_read: self.records_read.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            errors_total: self.errors_total.load(Ordering::Relaxed),
            prepares_total: self.prepares_total.load(Ordering::Relaxed),
            cleanups_total: self.cleanups_total.load(Ordering::Relaxed),
        }
    }
}

impl Default for SplitMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time snapshot of split metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitMetricsSnapshot {
    /// Records read.
    pub records_read: u64,

    /// Records written.
    pub records_written: u64,

    /// Failed steps.
    pub errors_total: u64,

    /// Prepares.
    pub prepares_total: u64,

    /// Cleanups.
    pub cleanups_total: u64,
}
