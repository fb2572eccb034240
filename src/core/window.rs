/// Bytes per RGBA8 pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Fixed geometry of a window, set once at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowDimensions {
    pub width: u32,
    pub height: u32,
}

impl WindowDimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Total number of pixels
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size in bytes of one full RGBA8 frame
    pub fn frame_len(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    /// Length in bytes of one row of pixels
    pub fn row_len(&self) -> usize {
        self.width as usize * BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Allocate a zeroed buffer sized for exactly one frame
    pub fn alloc_frame(&self) -> Box<[u8]> {
        vec![0u8; self.frame_len()].into_boxed_slice()
    }
}

/// Panics unless `len` is exactly one frame for `dims`.
///
/// Frames are never truncated or padded: a mismatch means the caller built its
/// buffer for a different window.
#[track_caller]
pub(crate) fn assert_frame_len(dims: WindowDimensions, len: usize) {
    assert_eq!(
        len,
        dims.frame_len(),
        "frame size mismatch for {}x{} window: expected {} bytes, got {}",
        dims.width,
        dims.height,
        dims.frame_len(),
        len
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_dimensions_new() {
        let dims = WindowDimensions::new(1920, 1080);
        assert_eq!(dims.width, 1920);
        assert_eq!(dims.height, 1080);
    }

    #[test]
    fn test_frame_len_various_sizes() {
        let test_cases = [(1, 1), (64, 64), (640, 480), (1920, 1080)];

        for (width, height) in test_cases {
            let dims = WindowDimensions::new(width, height);
            assert_eq!(dims.pixel_count(), (width * height) as usize);
            assert_eq!(dims.frame_len(), (width * height * 4) as usize);
            assert_eq!(dims.row_len(), (width * 4) as usize);
        }
    }

    #[test]
    fn test_frame_len_does_not_overflow_u32() {
        let dims = WindowDimensions::new(40_000, 40_000);
        assert_eq!(dims.frame_len(), 40_000usize * 40_000 * 4);
    }

    #[test]
    fn test_alloc_frame_is_zeroed() {
        let frame = WindowDimensions::new(8, 4).alloc_frame();
        assert_eq!(frame.len(), 8 * 4 * 4);
        assert!(frame.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_is_empty() {
        assert!(WindowDimensions::new(0, 10).is_empty());
        assert!(WindowDimensions::new(10, 0).is_empty());
        assert!(!WindowDimensions::new(1, 1).is_empty());
    }

    #[test]
    fn test_assert_frame_len_accepts_exact_size() {
        assert_frame_len(WindowDimensions::new(2, 2), 16);
    }

    #[test]
    #[should_panic(expected = "frame size mismatch")]
    fn test_assert_frame_len_rejects_short_buffer() {
        assert_frame_len(WindowDimensions::new(2, 2), 8);
    }
}
