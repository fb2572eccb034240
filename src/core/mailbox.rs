use std::collections::{HashMap, HashSet};

use super::registry::WindowRegistry;
use super::window::{assert_frame_len, WindowDimensions};
use crate::traits::SurfaceId;

/// Deferred-update buffer for one window
#[derive(Debug)]
pub struct PendingFrameSlot {
    dimensions: WindowDimensions,
    pixels: Box<[u8]>,
    generation: u64,
    dirty: bool,
}

impl PendingFrameSlot {
    fn new(dimensions: WindowDimensions) -> Self {
        Self {
            dimensions,
            pixels: dimensions.alloc_frame(),
            generation: 0,
            dirty: false,
        }
    }

    #[track_caller]
    fn store(&mut self, bytes: &[u8], generation: u64) {
        assert_frame_len(self.dimensions, bytes.len());
        self.pixels.copy_from_slice(bytes);
        self.generation = generation;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// Result of dropping a frame into the mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deposit {
    Stored,
    /// The window is gone; the frame was discarded
    Closed,
}

/// What one reconciliation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub applied: usize,
    /// Pending frames older than a later direct write, discarded unapplied
    pub stale: usize,
    pub pruned: usize,
}

/// Per-window pending frames, written by producers when the registry is busy.
///
/// Closed handles are remembered so late deposits report `Closed`; that set
/// grows by one small entry per closed window for the life of the mailbox.
#[derive(Debug, Default)]
pub struct Mailbox {
    slots: HashMap<SurfaceId, PendingFrameSlot>,
    retired: HashSet<SurfaceId>,
}

impl Mailbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the slot for a newly registered window
    #[track_caller]
    pub fn open_slot(&mut self, id: SurfaceId, dimensions: WindowDimensions) {
        assert!(
            !self.slots.contains_key(&id),
            "{id} already has a pending-frame slot"
        );
        self.slots.insert(id, PendingFrameSlot::new(dimensions));
    }

    /// Drop the slot of a removed window. Returns whether a slot existed.
    pub fn close_slot(&mut self, id: SurfaceId) -> bool {
        self.retired.insert(id);
        self.slots.remove(&id).is_some()
    }

    /// Copy `bytes` into the window's slot, stamped with `generation`, and mark
    /// it dirty.
    ///
    /// Panics for a handle that never had a slot, or on a size mismatch.
    #[track_caller]
    pub fn deposit(&mut self, id: SurfaceId, bytes: &[u8], generation: u64) -> Deposit {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                slot.store(bytes, generation);
                Deposit::Stored
            }
            None if self.retired.contains(&id) => Deposit::Closed,
            None => panic!("frame submitted to unknown {id}"),
        }
    }

    /// Move every dirty slot into the registry and clear its flag.
    ///
    /// A slot is only applied if it is newer than what the window displays;
    /// slots whose window has left the registry are pruned.
    pub fn reconcile(&mut self, registry: &mut WindowRegistry) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let mut pruned = Vec::new();

        self.slots.retain(|id, slot| {
            let Some(entry) = registry.get(*id) else {
                pruned.push(*id);
                return false;
            };
            if slot.dirty {
                if slot.generation > entry.generation() {
                    registry.write_direct(*id, &slot.pixels, slot.generation);
                    report.applied += 1;
                } else {
                    report.stale += 1;
                }
                slot.dirty = false;
            }
            true
        });

        report.pruned = pruned.len();
        self.retired.extend(pruned);
        report
    }

    pub fn slot(&self, id: SurfaceId) -> Option<&PendingFrameSlot> {
        self.slots.get(&id)
    }

    /// Number of slots holding an unconsumed frame
    pub fn dirty_count(&self) -> usize {
        self.slots.values().filter(|slot| slot.dirty).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
