//! Per-cycle statistics tracking.
//!
//! Counts checked trackers, transitions and fetch failures by kind so the
//! monitor can log a one-line summary at the end of every status pass.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use strum::IntoEnumIterator;

use super::categorization::categorize_fetch_error;
use super::types::{FetchError, FetchFailureKind};

/// Thread-safe cycle statistics tracker.
///
/// All failure kinds are initialized to zero on creation, so lookups never
/// miss. Counters are atomic so the tracker can be shared behind an `Arc`.
pub struct CycleStats {
    checked: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
    failures: HashMap<FetchFailureKind, AtomicUsize>,
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl CycleStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FetchFailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }
        CycleStats {
            checked: AtomicUsize::new(0),
            opened: AtomicUsize::new(0),
            closed: AtomicUsize::new(0),
            failures,
        }
    }

    /// Records a tracker that produced a verdict.
    pub fn record_checked(&self) {
        self.checked.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_opened(&self) {
        self.opened.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_closed(&self) {
        self.closed.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a fetch failure under its categorized kind.
    pub fn record_failure(&self, error: &FetchError) {
        let kind = categorize_fetch_error(error);
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a check whose task panicked before producing a verdict.
    pub fn record_aborted(&self) {
        if let Some(counter) = self.failures.get(&FetchFailureKind::Aborted) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn checked(&self) -> usize {
        self.checked.load(Ordering::SeqCst)
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn failure_count(&self, kind: FetchFailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures
            .values()
            .map(|c| c.load(Ordering::SeqCst))
            .sum()
    }

    /// Logs a summary line, plus one line per non-zero failure kind.
    pub fn log_summary(&self) {
        info!(
            "Status pass: {} checked, {} opened, {} closed, {} failed",
            self.checked(),
            self.opened(),
            self.closed(),
            self.total_failures()
        );
        for kind in FetchFailureKind::iter() {
            let count = self.failure_count(kind);
            if count > 0 {
                info!("   {}: {}", kind, count);
            }
        }
    }
}
