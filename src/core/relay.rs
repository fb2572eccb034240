//! Cross-thread frame handoff between producers and the render thread.
//!
//! Two mutexes guard disjoint data:
//!
//! - the registry lock, held by the render thread for a whole pass and only
//!   *tried* by producers;
//! - the mailbox lock, always taken by producers (one frame copy) and only
//!   *tried* by the render thread.
//!
//! A producer that loses the race for the registry drops its frame into the
//! window's pending slot instead of waiting out the pass. The render thread
//! merges pending slots at the start of a pass when the mailbox is free and
//! otherwise leaves them for the next pass. Lock order is always registry, then
//! mailbox, then the retirement queue.
//!
//! A window closed during a pass while the mailbox is busy is pushed onto the
//! retirement queue, a short list guarded by its own mutex that is only ever
//! held for a push or a drain. Whoever next holds the mailbox drains it, so a
//! producer on the mailbox path sees the window as closed straight away.
//!
//! Every submission is stamped from one counter while its lock is held, so a
//! pending frame older than a later direct write is discarded at reconcile
//! time instead of rolling the window back.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use super::mailbox::{Deposit, Mailbox, ReconcileReport};
use super::registry::{WindowEntry, WindowRegistry};
use super::stats::{RelayStats, RelayStatsSnapshot};
use super::window::WindowDimensions;
use crate::error::BackendError;
use crate::traits::{SurfaceBackend, SurfaceId};

/// Which path a submitted frame took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Written straight into the display buffer
    Direct,
    /// Parked in the mailbox until the next reconciliation
    Deferred,
    /// The window has been destroyed; the frame was dropped
    Closed,
}

impl SubmitOutcome {
    pub fn is_closed(self) -> bool {
        self == SubmitOutcome::Closed
    }
}

/// Registry and mailbox shared between producers and the render thread
#[derive(Debug, Default)]
pub struct FrameRelay {
    registry: Mutex<WindowRegistry>,
    mailbox: Mutex<Mailbox>,
    retiring: Mutex<Vec<SurfaceId>>,
    sequence: AtomicU64,
    stats: RelayStats,
}

impl FrameRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window and its pending-frame slot
    #[track_caller]
    pub fn register(&self, id: SurfaceId, dimensions: WindowDimensions, title: &str) {
        let mut registry = self.lock_registry();
        let mut mailbox = self.lock_mailbox();
        registry.register(id, dimensions, title);
        mailbox.open_slot(id, dimensions);
        log::debug!(
            "registered {id} \"{title}\" ({}x{})",
            dimensions.width,
            dimensions.height
        );
    }

    /// Destroy the backend surface and drop the window with its slot.
    ///
    /// Panics if `id` is not a live window.
    #[track_caller]
    pub fn unregister<B: SurfaceBackend + ?Sized>(
        &self,
        id: SurfaceId,
        backend: &mut B,
    ) -> WindowEntry {
        let mut registry = self.lock_registry();
        assert!(registry.contains(id), "cannot destroy unknown {id}");
        backend.destroy_surface(id);
        let entry = registry.unregister(id);
        self.lock_mailbox().close_slot(id);
        log::debug!("destroyed {id} \"{}\"", entry.title());
        entry
    }

    /// Hand a complete frame to a window from any thread.
    ///
    /// Never waits for a render pass: if the registry is busy the frame goes to
    /// the mailbox. Panics if `bytes` is not exactly one frame for the window, or
    /// if `id` was never registered.
    #[track_caller]
    pub fn submit_frame(&self, id: SurfaceId, bytes: &[u8]) -> SubmitOutcome {
        if let Some(mut registry) = self.try_lock_registry() {
            if registry.contains(id) {
                let generation = self.next_generation();
                registry.write_direct(id, bytes, generation);
                self.stats.record_direct();
                return SubmitOutcome::Direct;
            }
            assert!(registry.is_retired(id), "frame submitted to unknown {id}");
            self.stats.record_dropped();
            return SubmitOutcome::Closed;
        }

        let mut mailbox = self.lock_mailbox();
        self.drain_retiring(&mut mailbox);
        let generation = self.next_generation();
        match mailbox.deposit(id, bytes, generation) {
            Deposit::Stored => {
                self.stats.record_deferred();
                SubmitOutcome::Deferred
            }
            Deposit::Closed => {
                self.stats.record_dropped();
                SubmitOutcome::Closed
            }
        }
    }

    /// One render pass. Returns `false` iff no windows were registered when the
    /// pass started; the pass that closes the last window still returns `true`.
    pub fn run_pass<B: SurfaceBackend + ?Sized>(
        &self,
        backend: &mut B,
        on_error: &dyn Fn(&BackendError),
    ) -> bool {
        let mut registry = self.lock_registry();
        self.stats.record_pass();

        match self.try_lock_mailbox() {
            Some(mut mailbox) => {
                let report = mailbox.reconcile(&mut registry);
                self.stats.record_reconcile(report);
                self.drain_retiring(&mut mailbox);
                if report != ReconcileReport::default() {
                    log::trace!(
                        "reconciled {} pending frame(s), {} stale, pruned {} slot(s)",
                        report.applied,
                        report.stale,
                        report.pruned
                    );
                }
            }
            None => {
                self.stats.record_skipped_reconcile();
                log::trace!("mailbox busy, reconciliation deferred");
            }
        }

        if registry.is_empty() {
            return false;
        }

        let mut delete_queue = Vec::new();
        for (id, entry) in registry.iter() {
            if backend.should_close(id) {
                delete_queue.push(id);
                continue;
            }
            if let Err(err) = backend.present(id, entry.frame()) {
                on_error(&err);
            }
            backend.poll_events();
        }

        for id in delete_queue {
            backend.destroy_surface(id);
            let entry = registry.unregister(id);
            match self.try_lock_mailbox() {
                Some(mut mailbox) => {
                    mailbox.close_slot(id);
                }
                None => self.lock_retiring().push(id),
            }
            log::debug!("{id} \"{}\" closed by request", entry.title());
        }

        true
    }

    /// Exclusive access to the registry, blocking
    pub fn lock_registry(&self) -> MutexGuard<'_, WindowRegistry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn try_lock_registry(&self) -> Option<MutexGuard<'_, WindowRegistry>> {
        try_lock(&self.registry)
    }

    /// Exclusive access to the mailbox, blocking
    pub fn lock_mailbox(&self) -> MutexGuard<'_, Mailbox> {
        self.mailbox.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn try_lock_mailbox(&self) -> Option<MutexGuard<'_, Mailbox>> {
        try_lock(&self.mailbox)
    }

    /// Copy of a window's current display buffer
    pub fn current_frame(&self, id: SurfaceId) -> Option<Vec<u8>> {
        self.lock_registry().get(id).map(|entry| entry.pixels().to_vec())
    }

    pub fn window_count(&self) -> usize {
        self.lock_registry().len()
    }

    pub fn stats(&self) -> RelayStatsSnapshot {
        self.stats.snapshot()
    }

    fn lock_retiring(&self) -> MutexGuard<'_, Vec<SurfaceId>> {
        self.retiring.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the slots of windows removed while the mailbox was busy
    fn drain_retiring(&self, mailbox: &mut Mailbox) {
        let mut retiring = self.lock_retiring();
        if retiring.is_empty() {
            return;
        }
        let closed = retiring
            .drain(..)
            .filter(|id| mailbox.close_slot(*id))
            .count();
        self.stats.record_pruned(closed);
    }

    // Callers hold the lock guarding the buffer the stamp is written to
    fn next_generation(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

// Buffers are always overwritten whole, so a panicking holder cannot leave
// a torn frame behind and poisoning is safe to ignore.
fn try_lock<T>(mutex: &Mutex<T>) -> Option<MutexGuard<'_, T>> {
    match mutex.try_lock() {
        Ok(guard) => Some(guard),
        Err(TryLockError::Poisoned(poisoned)) => Some(poisoned.into_inner()),
        Err(TryLockError::WouldBlock) => None,
    }
}

/// Cloneable handle producers use to push frames from any thread
#[derive(Debug, Clone)]
pub struct FrameSubmitter {
    relay: Arc<FrameRelay>,
}

impl FrameSubmitter {
    pub fn new(relay: Arc<FrameRelay>) -> Self {
        Self { relay }
    }

    /// See [`FrameRelay::submit_frame`]
    #[track_caller]
    pub fn submit(&self, id: SurfaceId, bytes: &[u8]) -> SubmitOutcome {
        self.relay.submit_frame(id, bytes)
    }

    /// Fixed frame size of a live window, `None` once it is gone.
    ///
    /// Blocks on the registry lock, so call it when sizing buffers rather than
    /// per frame.
    pub fn frame_dimensions(&self, id: SurfaceId) -> Option<WindowDimensions> {
        self.relay.lock_registry().get(id).map(WindowEntry::dimensions)
    }
}
