use std::fmt;

use crate::core::WindowDimensions;

/// Opaque handle identifying one backend surface.
///
/// Handles are issued by the backend and stay valid until the surface is
/// destroyed. The registry never accepts a retired handle again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Borrowed view of one complete frame handed to a backend for presentation.
///
/// Rows are stored top-to-bottom: row 0 is the top of the window.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub dimensions: WindowDimensions,
    pub pixels: &'a [u8],
}

impl<'a> FrameView<'a> {
    pub fn new(dimensions: WindowDimensions, pixels: &'a [u8]) -> Self {
        debug_assert_eq!(pixels.len(), dimensions.frame_len());
        Self { dimensions, pixels }
    }
}
