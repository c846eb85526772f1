//! Scheduler counters. The crate has no `log`-style dependency and none of
//! this runs anywhere a logger could flush safely (interrupt context, no
//! allocator) — a counter block incremented on the same events a real
//! tracing layer would log is the observability this module actually needs.

use core::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct SchedulerMetrics {
    pub unblocks: AtomicU64,
    pub blocks: AtomicU64,
    pub yields: AtomicU64,
    pub heir_changes: AtomicU64,
    pub migrations: AtomicU64,
}

impl SchedulerMetrics {
    pub const fn new() -> Self {
        SchedulerMetrics {
            unblocks: AtomicU64::new(0),
            blocks: AtomicU64::new(0),
            yields: AtomicU64::new(0),
            heir_changes: AtomicU64::new(0),
            migrations: AtomicU64::new(0),
        }
    }

    pub fn record_unblock(&self) {
        self.unblocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_block(&self) {
        self.blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_yield(&self) {
        self.yields.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_heir_change(&self) {
        self.heir_changes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_migration(&self) {
        self.migrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> SchedulerMetricsSnapshot {
        SchedulerMetricsSnapshot {
            unblocks: self.unblocks.load(Ordering::Relaxed),
            blocks: self.blocks.load(Ordering::Relaxed),
            yields: self.yields.load(Ordering::Relaxed),
            heir_changes: self.heir_changes.load(Ordering::Relaxed),
            migrations: self.migrations.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SchedulerMetricsSnapshot {
    pub unblocks: u64,
    pub blocks: u64,
    pub yields: u64,
    pub heir_changes: u64,
    pub migrations: u64,
}

pub static METRICS: SchedulerMetrics = SchedulerMetrics::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_increment() {
        let m = SchedulerMetrics::new();
        assert_eq!(m.snapshot(), SchedulerMetricsSnapshot::default());
        m.record_unblock();
        m.record_block();
        m.record_heir_change();
        let snap = m.snapshot();
        assert_eq!(snap.unblocks, 1);
        assert_eq!(snap.blocks, 1);
        assert_eq!(snap.heir_changes, 1);
        assert_eq!(snap.yields, 0);
    }
}
