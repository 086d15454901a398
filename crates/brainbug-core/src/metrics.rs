//! Global atomic counters for BrainBug pipelines.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a command).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    records_dropped: AtomicU64,
    examples_built: AtomicU64,
    pairs_scored: AtomicU64,
    predictions_generated: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            records_dropped: AtomicU64::new(0),
            examples_built: AtomicU64::new(0),
            pairs_scored: AtomicU64::new(0),
            predictions_generated: AtomicU64::new(0),
        }
    }

    pub fn add_records_dropped(&self, n: u64) {
        self.records_dropped.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "records_dropped", n, "counter incremented");
    }

    pub fn add_examples_built(&self, n: u64) {
        self.examples_built.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "examples_built", n, "counter incremented");
    }

    pub fn add_pairs_scored(&self, n: u64) {
        self.pairs_scored.fetch_add(n, Ordering::Relaxed);
        tracing::trace!(metric = "pairs_scored", n, "counter incremented");
    }

    pub fn inc_predictions_generated(&self) {
        self.predictions_generated.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "predictions_generated", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            records_dropped = self.records_dropped(),
            examples_built = self.examples_built(),
            pairs_scored = self.pairs_scored(),
            predictions_generated = self.predictions_generated(),
        );
    }

    pub fn records_dropped(&self) -> u64 {
        self.records_dropped.load(Ordering::Relaxed)
    }

    pub fn examples_built(&self) -> u64 {
        self.examples_built.load(Ordering::Relaxed)
    }

    pub fn pairs_scored(&self) -> u64 {
        self.pairs_scored.load(Ordering::Relaxed)
    }

    pub fn predictions_generated(&self) -> u64 {
        self.predictions_generated.load(Ordering::Relaxed)
    }

    /// Reset all counters to zero (useful in tests).
    pub fn reset(&self) {
        self.records_dropped.store(0, Ordering::Relaxed);
        self.examples_built.store(0, Ordering::Relaxed);
        self.pairs_scored.store(0, Ordering::Relaxed);
        self.predictions_generated.store(0, Ordering::Relaxed);
    }
}
