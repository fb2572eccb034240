use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::mailbox::ReconcileReport;

/// Lock-free counters describing how frames moved through the relay
#[derive(Debug, Default)]
pub struct RelayStats {
    direct_writes: AtomicU64,
    deferred_writes: AtomicU64,
    dropped_writes: AtomicU64,
    reconciled_frames: AtomicU64,
    stale_frames: AtomicU64,
    pruned_slots: AtomicU64,
    skipped_reconciliations: AtomicU64,
    passes: AtomicU64,
}

/// Point-in-time copy of [`RelayStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RelayStatsSnapshot {
    pub direct_writes: u64,
    pub deferred_writes: u64,
    pub dropped_writes: u64,
    pub reconciled_frames: u64,
    /// Pending frames superseded by a newer direct write before reconciliation
    pub stale_frames: u64,
    pub pruned_slots: u64,
    pub skipped_reconciliations: u64,
    pub passes: u64,
}

impl RelayStats {
    pub fn record_direct(&self) {
        self.direct_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_deferred(&self) {
        self.deferred_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pass(&self) {
        self.passes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconcile(&self, report: ReconcileReport) {
        self.reconciled_frames
            .fetch_add(report.applied as u64, Ordering::Relaxed);
        self.stale_frames
            .fetch_add(report.stale as u64, Ordering::Relaxed);
        self.pruned_slots
            .fetch_add(report.pruned as u64, Ordering::Relaxed);
    }

    /// Slots closed outside a reconciliation
    pub fn record_pruned(&self, count: usize) {
        self.pruned_slots.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_skipped_reconcile(&self) {
        self.skipped_reconciliations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> RelayStatsSnapshot {
        RelayStatsSnapshot {
            direct_writes: self.direct_writes.load(Ordering::Relaxed),
            deferred_writes: self.deferred_writes.load(Ordering::Relaxed),
            dropped_writes: self.dropped_writes.load(Ordering::Relaxed),
            reconciled_frames: self.reconciled_frames.load(Ordering::Relaxed),
            stale_frames: self.stale_frames.load(Ordering::Relaxed),
            pruned_slots: self.pruned_slots.load(Ordering::Relaxed),
            skipped_reconciliations: self.skipped_reconciliations.load(Ordering::Relaxed),
            passes: self.passes.load(Ordering::Relaxed),
        }
    }
}

impl RelayStatsSnapshot {
    /// Frames accepted by either path
    pub fn accepted_writes(&self) -> u64 {
        self.direct_writes + self.deferred_writes
    }
}
