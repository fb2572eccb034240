use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::core::{FrameRelay, FrameSubmitter, RelayStatsSnapshot, SubmitOutcome, WindowDimensions};
use crate::error::BackendError;
use crate::traits::{log_error_callback, ErrorCallback, SurfaceBackend, SurfaceId};

/// Window subsystem context: a backend plus the frame relay feeding it.
///
/// The system lives on the render thread. Producers on other threads get a
/// [`FrameSubmitter`] from [`WindowSystem::submitter`].
pub struct WindowSystem<B: SurfaceBackend> {
    backend: B,
    relay: Arc<FrameRelay>,
    on_error: ErrorCallback,
}

impl<B: SurfaceBackend> WindowSystem<B> {
    /// Initialise `backend` and wire its diagnostics to the `log` facade
    pub fn init(backend: B) -> Result<Self, BackendError> {
        Self::with_error_callback(backend, log_error_callback())
    }

    /// Initialise `backend`, sending its diagnostics to `on_error`
    pub fn with_error_callback(mut backend: B, on_error: ErrorCallback) -> Result<Self, BackendError> {
        backend.init()?;
        backend.set_error_callback(Arc::clone(&on_error));
        log::debug!("window backend initialised");

        Ok(Self {
            backend,
            relay: Arc::new(FrameRelay::new()),
            on_error,
        })
    }

    /// Open a window whose frames are `width` x `height` RGBA8 pixels.
    ///
    /// Panics if either dimension is 0.
    #[track_caller]
    pub fn create_window(
        &mut self,
        width: u32,
        height: u32,
        title: &str,
    ) -> Result<SurfaceId, BackendError> {
        let dimensions = WindowDimensions::new(width, height);
        assert!(
            !dimensions.is_empty(),
            "window \"{title}\" needs non-zero dimensions, got {width}x{height}"
        );

        let id = self.backend.create_surface(dimensions, title)?;
        self.relay.register(id, dimensions, title);
        Ok(id)
    }

    /// Submit a new frame for `id`; see [`FrameRelay::submit_frame`]
    #[track_caller]
    pub fn apply_frame(&self, id: SurfaceId, pixels: &[u8]) -> SubmitOutcome {
        self.relay.submit_frame(id, pixels)
    }

    /// Close a window explicitly. Panics if `id` is not open.
    #[track_caller]
    pub fn destroy_window(&mut self, id: SurfaceId) {
        self.relay.unregister(id, &mut self.backend);
    }

    /// One render pass over every window.
    ///
    /// Returns `false` when there was nothing to render.
    pub fn run_frame(&mut self) -> bool {
        self.relay.run_pass(&mut self.backend, &*self.on_error)
    }

    /// Render until every window has closed or `cancel` is set.
    ///
    /// `cancel` is only checked between passes; a pass that has started
    /// always presents all of its windows.
    pub fn run_event_loop(&mut self, cancel: &AtomicBool) {
        log::info!(
            "event loop started with {} window(s)",
            self.relay.window_count()
        );

        let mut passes: u64 = 0;
        let reason = loop {
            if cancel.load(Ordering::SeqCst) {
                break "cancelled";
            }
            if !self.run_frame() {
                break "all windows closed";
            }
            passes += 1;
        };

        log::info!("event loop stopped after {passes} pass(es): {reason}");
    }

    /// Handle for producer threads
    pub fn submitter(&self) -> FrameSubmitter {
        FrameSubmitter::new(Arc::clone(&self.relay))
    }

    pub fn relay(&self) -> &Arc<FrameRelay> {
        &self.relay
    }

    pub fn stats(&self) -> RelayStatsSnapshot {
        self.relay.stats()
    }

    pub fn window_count(&self) -> usize {
        self.relay.window_count()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::HeadlessBackend;

    #[test]
    fn init_failure_is_reported() {
        let result = WindowSystem::init(HeadlessBackend::failing("no display"));
        assert!(matches!(result, Err(BackendError::Init(_))));
    }

    #[test]
    fn create_window_registers_with_relay() {
        let mut system = WindowSystem::init(HeadlessBackend::new()).unwrap();
        let id = system.create_window(4, 4, "w").unwrap();

        assert_eq!(system.window_count(), 1);
        assert_eq!(system.relay().current_frame(id).map(|f| f.len()), Some(64));
        assert!(system.backend().surface(id).is_some());
    }

    #[test]
    #[should_panic(expected = "non-zero dimensions")]
    fn create_window_rejects_zero_height() {
        let mut system = WindowSystem::init(HeadlessBackend::new()).unwrap();
        let _ = system.create_window(4, 0, "flat");
    }

    #[test]
    fn cancelled_loop_runs_no_pass() {
        let mut system = WindowSystem::init(HeadlessBackend::new()).unwrap();
        let id = system.create_window(1, 1, "w").unwrap();

        system.run_event_loop(&AtomicBool::new(true));
        assert_eq!(system.backend().present_count(id), 0);
        assert_eq!(system.stats().passes, 0);
    }
}
