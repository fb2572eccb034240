use std::collections::{HashMap, HashSet};

use super::window::{assert_frame_len, WindowDimensions};
use crate::traits::{FrameView, SurfaceId};

/// One live window: fixed geometry plus the frame committed for presentation
#[derive(Debug)]
pub struct WindowEntry {
    dimensions: WindowDimensions,
    title: String,
    pixels: Box<[u8]>,
    generation: u64,
}

impl WindowEntry {
    pub fn dimensions(&self) -> WindowDimensions {
        self.dimensions
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn frame(&self) -> FrameView<'_> {
        FrameView::new(self.dimensions, &self.pixels)
    }

    /// Stamp of the submission currently on display; 0 before the first one
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[track_caller]
    fn overwrite(&mut self, bytes: &[u8], generation: u64) {
        assert_frame_len(self.dimensions, bytes.len());
        self.pixels.copy_from_slice(bytes);
        self.generation = generation;
    }
}

/// Authoritative map from surface handle to window geometry and display buffer.
///
/// The registry does no locking of its own; the relay keeps it behind a mutex.
/// Retired handles are kept for the life of the registry so they can never be
/// registered again or mistaken for unknown ones; expect one entry per closed
/// window.
#[derive(Debug, Default)]
pub struct WindowRegistry {
    windows: HashMap<SurfaceId, WindowEntry>,
    retired: HashSet<SurfaceId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a window with a zeroed display buffer.
    ///
    /// Panics if the handle is live or was retired, or if either dimension is 0.
    #[track_caller]
    pub fn register(&mut self, id: SurfaceId, dimensions: WindowDimensions, title: &str) {
        assert!(
            !dimensions.is_empty(),
            "cannot register {id} with empty dimensions {}x{}",
            dimensions.width,
            dimensions.height
        );
        assert!(!self.retired.contains(&id), "{id} was already retired");
        assert!(!self.windows.contains_key(&id), "{id} is already registered");

        self.windows.insert(
            id,
            WindowEntry {
                dimensions,
                title: title.to_owned(),
                pixels: dimensions.alloc_frame(),
                generation: 0,
            },
        );
    }

    /// Remove a live window; its handle is retired for good.
    ///
    /// Panics if the handle is not live.
    #[track_caller]
    pub fn unregister(&mut self, id: SurfaceId) -> WindowEntry {
        match self.windows.remove(&id) {
            Some(entry) => {
                self.retired.insert(id);
                entry
            }
            None => panic!("cannot unregister unknown {id}"),
        }
    }

    /// Overwrite the display buffer of a live window in place, recording the
    /// submission's `generation`.
    ///
    /// Panics if the handle is not live or `bytes` is not exactly one frame.
    #[track_caller]
    pub fn write_direct(&mut self, id: SurfaceId, bytes: &[u8], generation: u64) {
        match self.windows.get_mut(&id) {
            Some(entry) => entry.overwrite(bytes, generation),
            None => panic!("write to unknown {id}"),
        }
    }

    pub fn get(&self, id: SurfaceId) -> Option<&WindowEntry> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn is_retired(&self, id: SurfaceId) -> bool {
        self.retired.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Handles of all live windows, in no particular order
    pub fn ids(&self) -> Vec<SurfaceId> {
        self.windows.keys().copied().collect()
    }

    /// Snapshot iteration over live windows, in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (SurfaceId, &WindowEntry)> {
        self.windows.iter().map(|(id, entry)| (*id, entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(w: u32, h: u32) -> WindowDimensions {
        WindowDimensions::new(w, h)
    }

    #[test]
    fn register_allocates_zeroed_frame() {
        let mut registry = WindowRegistry::new();
        registry.register(SurfaceId::new(1), dims(4, 3), "a");

        let entry = registry.get(SurfaceId::new(1)).expect("registered");
        assert_eq!(entry.pixels().len(), 4 * 3 * 4);
        assert!(entry.pixels().iter().all(|&b| b == 0));
        assert_eq!(entry.title(), "a");
    }

    #[test]
    fn unregister_retires_handle() {
        let mut registry = WindowRegistry::new();
        let id = SurfaceId::new(9);
        registry.register(id, dims(2, 2), "w");

        let entry = registry.unregister(id);
        assert_eq!(entry.dimensions(), dims(2, 2));
        assert!(!registry.contains(id));
        assert!(registry.is_retired(id));
        assert!(registry.is_empty());
    }

    #[test]
    fn write_direct_replaces_whole_frame() {
        let mut registry = WindowRegistry::new();
        let id = SurfaceId::new(1);
        registry.register(id, dims(1, 2), "w");

        registry.write_direct(id, &[1, 2, 3, 4, 5, 6, 7, 8], 3);
        let entry = registry.get(id).expect("registered");
        assert_eq!(entry.pixels(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(entry.generation(), 3);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn register_twice_panics() {
        let mut registry = WindowRegistry::new();
        registry.register(SurfaceId::new(1), dims(1, 1), "a");
        registry.register(SurfaceId::new(1), dims(1, 1), "b");
    }

    #[test]
    #[should_panic(expected = "already retired")]
    fn reregister_retired_panics() {
        let mut registry = WindowRegistry::new();
        registry.register(SurfaceId::new(1), dims(1, 1), "a");
        registry.unregister(SurfaceId::new(1));
        registry.register(SurfaceId::new(1), dims(1, 1), "a");
    }

    #[test]
    #[should_panic(expected = "empty dimensions")]
    fn register_zero_width_panics() {
        WindowRegistry::new().register(SurfaceId::new(1), dims(0, 5), "a");
    }

    #[test]
    #[should_panic(expected = "unknown")]
    fn unregister_unknown_panics() {
        WindowRegistry::new().unregister(SurfaceId::new(42));
    }

    #[test]
    #[should_panic(expected = "frame size mismatch")]
    fn write_direct_wrong_size_panics() {
        let mut registry = WindowRegistry::new();
        registry.register(SurfaceId::new(1), dims(2, 2), "a");
        registry.write_direct(SurfaceId::new(1), &[0; 8], 1);
    }
}
