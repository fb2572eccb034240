use std::collections::HashMap;
use std::time::Duration;

use super::window::WindowDimensions;
use crate::error::BackendError;
use crate::traits::{log_error_callback, ErrorCallback, FrameView, SurfaceBackend, SurfaceId};

/// Offscreen surface kept by [`HeadlessBackend`]
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    pub dimensions: WindowDimensions,
    pub title: String,
    pub close_requested: bool,
    /// Last presented frame, rows top-to-bottom
    pub presented: Option<Vec<u8>>,
    pub present_count: u64,
}

/// Backend with no display attached.
///
/// Surfaces are plain records: presenting copies the frame so callers can
/// inspect exactly what would have reached the screen, and close requests are
/// raised by hand through [`HeadlessBackend::request_close`].
pub struct HeadlessBackend {
    surfaces: HashMap<SurfaceId, HeadlessSurface>,
    destroyed: Vec<SurfaceId>,
    next_id: u64,
    initialized: bool,
    fail_init: Option<String>,
    fail_present: bool,
    present_delay: Option<Duration>,
    poll_count: u64,
    on_error: ErrorCallback,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            surfaces: HashMap::new(),
            destroyed: Vec::new(),
            next_id: 1,
            initialized: false,
            fail_init: None,
            fail_present: false,
            present_delay: None,
            poll_count: 0,
            on_error: log_error_callback(),
        }
    }

    /// Backend whose `init` fails with `reason`
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_init: Some(reason.into()),
            ..Self::new()
        }
    }

    /// Sleep this long in every `present`, standing in for vsync
    pub fn with_present_delay(mut self, delay: Duration) -> Self {
        self.present_delay = Some(delay);
        self
    }

    /// Make every `present` fail until switched off again
    pub fn set_fail_present(&mut self, fail: bool) {
        self.fail_present = fail;
    }

    /// Simulate the user closing the surface
    pub fn request_close(&mut self, id: SurfaceId) {
        match self.surfaces.get_mut(&id) {
            Some(surface) => surface.close_requested = true,
            None => log::warn!("close requested for unknown {id}"),
        }
    }

    /// Forward a diagnostic through the installed error callback
    pub fn report_error(&self, err: BackendError) {
        (self.on_error)(&err);
    }

    pub fn surface(&self, id: SurfaceId) -> Option<&HeadlessSurface> {
        self.surfaces.get(&id)
    }

    pub fn last_presented(&self, id: SurfaceId) -> Option<&[u8]> {
        self.surfaces.get(&id)?.presented.as_deref()
    }

    pub fn present_count(&self, id: SurfaceId) -> u64 {
        self.surfaces.get(&id).map_or(0, |s| s.present_count)
    }

    /// Handles destroyed so far, in order
    pub fn destroyed(&self) -> &[SurfaceId] {
        &self.destroyed
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    pub fn poll_count(&self) -> u64 {
        self.poll_count
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceBackend for HeadlessBackend {
    fn init(&mut self) -> Result<(), BackendError> {
        if let Some(reason) = &self.fail_init {
            return Err(BackendError::init(reason.clone()));
        }
        self.initialized = true;
        Ok(())
    }

    fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.on_error = callback;
    }

    fn create_surface(
        &mut self,
        dimensions: WindowDimensions,
        title: &str,
    ) -> Result<SurfaceId, BackendError> {
        if !self.initialized {
            return Err(BackendError::surface_creation(title, "backend not initialised"));
        }

        let id = SurfaceId::new(self.next_id);
        self.next_id += 1;
        self.surfaces.insert(
            id,
            HeadlessSurface {
                dimensions,
                title: title.to_owned(),
                close_requested: false,
                presented: None,
                present_count: 0,
            },
        );
        Ok(id)
    }

    fn should_close(&self, id: SurfaceId) -> bool {
        self.surfaces.get(&id).map_or(false, |s| s.close_requested)
    }

    fn present(&mut self, id: SurfaceId, frame: FrameView<'_>) -> Result<(), BackendError> {
        if self.fail_present {
            return Err(BackendError::present(id, "presentation disabled"));
        }
        let surface = self
            .surfaces
            .get_mut(&id)
            .ok_or_else(|| BackendError::present(id, "no such surface"))?;

        if let Some(delay) = self.present_delay {
            std::thread::sleep(delay);
        }

        let presented = surface.presented.get_or_insert_with(Vec::new);
        presented.clear();
        presented.extend_from_slice(frame.pixels);
        surface.present_count += 1;
        Ok(())
    }

    fn poll_events(&mut self) {
        self.poll_count += 1;
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        if self.surfaces.remove(&id).is_some() {
            self.destroyed.push(id);
        }
    }
}
