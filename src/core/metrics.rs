//! Logger metrics for observability
//!
//! Counters for what happened to the events a logger was handed: written,
//! filtered out by level, or failed in the formatter or sink. Relays also
//! count the events their worker took off the channel.

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for logger observability
///
/// # Example
///
/// ```
/// use rust_event_logger::LoggerMetrics;
///
/// let metrics = LoggerMetrics::new();
/// metrics.record_written(12);
/// metrics.record_filtered();
///
/// assert_eq!(metrics.written_count(), 1);
/// assert_eq!(metrics.bytes_written(), 12);
/// assert_eq!(metrics.filtered_count(), 1);
/// ```
#[derive(Debug)]
pub struct LoggerMetrics {
    /// Events that reached the sink
    written_count: AtomicU64,

    /// Bytes handed to the sink
    bytes_written: AtomicU64,

    /// Events below the level filter
    filtered_count: AtomicU64,

    /// Events lost to a formatter or sink error
    failed_count: AtomicU64,

    /// Events a relay worker took off its channel
    relayed_count: AtomicU64,
}

impl LoggerMetrics {
    /// Create a new metrics instance with all counters at zero
    pub const fn new() -> Self {
        Self {
            written_count: AtomicU64::new(0),
            bytes_written: AtomicU64::new(0),
            filtered_count: AtomicU64::new(0),
            failed_count: AtomicU64::new(0),
            relayed_count: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn written_count(&self) -> u64 {
        self.written_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn filtered_count(&self) -> u64 {
        self.filtered_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn failed_count(&self) -> u64 {
        self.failed_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn relayed_count(&self) -> u64 {
        self.relayed_count.load(Ordering::Relaxed)
    }

    /// Record a written event and its size
    #[inline]
    pub fn record_written(&self, bytes: usize) -> u64 {
        self.bytes_written.fetch_add(bytes as u64, Ordering::Relaxed);
        self.written_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_filtered(&self) -> u64 {
        self.filtered_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_failed(&self) -> u64 {
        self.failed_count.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn record_relayed(&self) -> u64 {
        self.relayed_count.fetch_add(1, Ordering::Relaxed)
    }

    /// Failure rate as a percentage (0.0 - 100.0) of events that passed the
    /// filter
    ///
    /// Returns 0.0 if nothing has been attempted.
    pub fn failure_rate(&self) -> f64 {
        let failed = self.failed_count() as f64;
        let total = self.written_count() as f64 + failed;
        if total == 0.0 {
            0.0
        } else {
            (failed / total) * 100.0
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.written_count.store(0, Ordering::Relaxed);
        self.bytes_written.store(0, Ordering::Relaxed);
        self.filtered_count.store(0, Ordering::Relaxed);
        self.failed_count.store(0, Ordering::Relaxed);
        self.relayed_count.store(0, Ordering::Relaxed);
    }
}

impl Default for LoggerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for LoggerMetrics {
    /// Create a snapshot of the current metrics values
    fn clone(&self) -> Self {
        Self {
            written_count: AtomicU64::new(self.written_count()),
            bytes_written: AtomicU64::new(self.bytes_written()),
            filtered_count: AtomicU64::new(self.filtered_count()),
            failed_count: AtomicU64::new(self.failed_count()),
            relayed_count: AtomicU64::new(self.relayed_count()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_new() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.bytes_written(), 0);
        assert_eq!(metrics.filtered_count(), 0);
        assert_eq!(metrics.failed_count(), 0);
        assert_eq!(metrics.relayed_count(), 0);
    }

    #[test]
    fn test_metrics_record_written() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.record_written(10), 0); // Returns previous value
        metrics.record_written(5);
        assert_eq!(metrics.written_count(), 2);
        assert_eq!(metrics.bytes_written(), 15);
    }

    #[test]
    fn test_metrics_failure_rate() {
        let metrics = LoggerMetrics::new();
        assert_eq!(metrics.failure_rate(), 0.0);

        for _ in 0..90 {
            metrics.record_written(1);
        }
        for _ in 0..10 {
            metrics.record_failed();
        }
        // filtered events do not count towards the rate
        metrics.record_filtered();

        let rate = metrics.failure_rate();
        assert!((rate - 10.0).abs() < f64::EPSILON, "Failure rate was {}", rate);
    }

    #[test]
    fn test_metrics_reset_and_snapshot() {
        let metrics = LoggerMetrics::new();
        metrics.record_written(3);
        metrics.record_failed();
        metrics.record_relayed();

        let snapshot = metrics.clone();
        metrics.reset();

        assert_eq!(metrics.written_count(), 0);
        assert_eq!(metrics.relayed_count(), 0);
        assert_eq!(snapshot.relayed_count(), 1);
        assert_eq!(snapshot.written_count(), 1);
        assert_eq!(snapshot.failed_count(), 1);
    }
}
