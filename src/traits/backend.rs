use std::sync::Arc;

use super::window::{FrameView, SurfaceId};
use crate::core::WindowDimensions;
use crate::error::BackendError;

/// Receiver for diagnostics a backend reports outside of a direct call
pub type ErrorCallback = Arc<dyn Fn(&BackendError) + Send + Sync>;

/// Windowing and presentation backend driven by the render thread.
///
/// Every method is called from the thread that owns the
/// [`WindowSystem`](crate::WindowSystem), so implementations do not need to be
/// `Send`. `present`, `should_close` and `destroy_surface` run while the
/// registry lock is held, which keeps presentation from racing with removal.
pub trait SurfaceBackend {
    /// One-time initialisation of the windowing and graphics stack
    fn init(&mut self) -> Result<(), BackendError>;

    /// Install the sink for asynchronous platform errors
    fn set_error_callback(&mut self, callback: ErrorCallback);

    /// Open a new surface of fixed size
    fn create_surface(
        &mut self,
        dimensions: WindowDimensions,
        title: &str,
    ) -> Result<SurfaceId, BackendError>;

    /// Whether the user or platform asked for this surface to close
    fn should_close(&self, id: SurfaceId) -> bool;

    /// Bind the surface, clear it, blit the frame with row 0 at the top, then
    /// flush and swap
    fn present(&mut self, id: SurfaceId, frame: FrameView<'_>) -> Result<(), BackendError>;

    /// Pump pending platform events without blocking
    fn poll_events(&mut self);

    /// Close the surface and release its resources
    fn destroy_surface(&mut self, id: SurfaceId);
}

/// Callback that forwards backend diagnostics to the `log` facade
pub fn log_error_callback() -> ErrorCallback {
    Arc::new(|err: &BackendError| log::error!("backend error: {err}"))
}
