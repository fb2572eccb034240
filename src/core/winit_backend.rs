//! Real OS windows: winit for the windows, wgpu for presentation.
//!
//! winit normally owns the thread through `run_app`. Here the render loop owns
//! the thread instead, so the event loop is pumped with a zero timeout once per
//! presented window and new windows are opened from inside the pump callbacks.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::platform::pump_events::{EventLoopExtPumpEvents, PumpStatus};
use winit::window::{Window, WindowId};

use super::gpu_context::GpuContext;
use super::surface_renderer::SurfaceRenderer;
use super::window::WindowDimensions;
use crate::error::BackendError;
use crate::traits::{log_error_callback, ErrorCallback, FrameView, SurfaceBackend, SurfaceId};

/// Pumps allowed for a requested window to appear before giving up
const CREATE_ATTEMPTS: usize = 32;

struct PendingWindow {
    id: SurfaceId,
    dimensions: WindowDimensions,
    title: String,
}

/// State mutated from inside winit callbacks
#[derive(Default)]
struct EventState {
    pending: Vec<PendingWindow>,
    created: Vec<(SurfaceId, Result<Arc<Window>, String>)>,
    lookup: HashMap<WindowId, SurfaceId>,
    close_requested: HashSet<SurfaceId>,
    resized: Vec<(SurfaceId, PhysicalSize<u32>)>,
}

impl EventState {
    fn open_pending(&mut self, event_loop: &ActiveEventLoop) {
        for request in std::mem::take(&mut self.pending) {
            let attributes = Window::default_attributes()
                .with_title(request.title.as_str())
                .with_inner_size(PhysicalSize::new(
                    request.dimensions.width,
                    request.dimensions.height,
                ))
                .with_resizable(false);

            let result = event_loop
                .create_window(attributes)
                .map(Arc::new)
                .map_err(|e| e.to_string());
            if let Ok(window) = &result {
                self.lookup.insert(window.id(), request.id);
            }
            self.created.push((request.id, result));
        }
    }

    fn take_created(&mut self, id: SurfaceId) -> Option<Result<Arc<Window>, String>> {
        let index = self.created.iter().position(|(created, _)| *created == id)?;
        Some(self.created.swap_remove(index).1)
    }
}

impl ApplicationHandler for EventState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        self.open_pending(event_loop);
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(&id) = self.lookup.get(&window_id) else {
            return;
        };
        match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                self.close_requested.insert(id);
            }
            WindowEvent::Resized(size) => self.resized.push((id, size)),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        self.open_pending(event_loop);
    }
}

struct WinitSurface {
    // Dropped before the window it draws into
    renderer: SurfaceRenderer,
    window: Arc<Window>,
}

/// [`SurfaceBackend`] that opens one OS window per surface.
///
/// Must be created and driven on the main thread on most platforms.
pub struct WinitBackend {
    event_loop: Option<EventLoop<()>>,
    exited: bool,
    instance: wgpu::Instance,
    gpu: Option<Arc<GpuContext>>,
    state: EventState,
    surfaces: HashMap<SurfaceId, WinitSurface>,
    next_id: u64,
    on_error: ErrorCallback,
}

impl WinitBackend {
    pub fn new() -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        Self {
            event_loop: None,
            exited: false,
            instance,
            gpu: None,
            state: EventState::default(),
            surfaces: HashMap::new(),
            next_id: 1,
            on_error: log_error_callback(),
        }
    }

    fn pump(&mut self) {
        let Some(event_loop) = self.event_loop.as_mut() else {
            return;
        };

        if let PumpStatus::Exit(code) = event_loop.pump_app_events(Some(Duration::ZERO), &mut self.state)
        {
            // Nothing can be shown any more; let the render loop wind down
            (self.on_error)(&BackendError::platform(format!(
                "event loop exited with status {code}"
            )));
            self.event_loop = None;
            self.exited = true;
        }

        for (id, size) in std::mem::take(&mut self.state.resized) {
            if let Some(surface) = self.surfaces.get_mut(&id) {
                surface.renderer.resize(size.width, size.height);
            }
        }
    }

    fn gpu_for(&mut self, surface: &wgpu::Surface<'_>) -> Result<Arc<GpuContext>, BackendError> {
        if let Some(gpu) = &self.gpu {
            return Ok(Arc::clone(gpu));
        }
        let gpu = GpuContext::new_with_surface(&self.instance, surface)
            .map(Arc::new)
            .map_err(|e| BackendError::init(e.to_string()))?;
        self.gpu = Some(Arc::clone(&gpu));
        Ok(gpu)
    }

    fn open_window(
        &mut self,
        id: SurfaceId,
        dimensions: WindowDimensions,
        title: &str,
    ) -> Result<Arc<Window>, BackendError> {
        self.state.pending.push(PendingWindow {
            id,
            dimensions,
            title: title.to_owned(),
        });

        for _ in 0..CREATE_ATTEMPTS {
            self.pump();
            if let Some(result) = self.state.take_created(id) {
                return result.map_err(|reason| BackendError::surface_creation(title, reason));
            }
        }

        self.state.pending.retain(|pending| pending.id != id);
        Err(BackendError::surface_creation(
            title,
            "event loop did not become active",
        ))
    }
}

impl Default for WinitBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceBackend for WinitBackend {
    fn init(&mut self) -> Result<(), BackendError> {
        if self.event_loop.is_some() {
            return Ok(());
        }
        let event_loop = EventLoop::new().map_err(|e| BackendError::init(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop = Some(event_loop);
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
        if self.event_loop.is_none() {
            return Err(BackendError::surface_creation(title, "backend not initialised"));
        }

        let id = SurfaceId::new(self.next_id);
        self.next_id += 1;

        let window = self.open_window(id, dimensions, title)?;
        let surface = self
            .instance
            .create_surface(Arc::clone(&window))
            .map_err(|e| BackendError::surface_creation(title, e.to_string()))?;
        let gpu = self.gpu_for(&surface)?;

        let size = window.inner_size();
        let renderer = SurfaceRenderer::new(gpu, surface, (size.width, size.height), dimensions)
            .map_err(|e| BackendError::surface_creation(title, e.to_string()))?;

        self.surfaces.insert(id, WinitSurface { renderer, window });
        Ok(id)
    }

    fn should_close(&self, id: SurfaceId) -> bool {
        self.exited || self.state.close_requested.contains(&id)
    }

    fn present(&mut self, id: SurfaceId, frame: FrameView<'_>) -> Result<(), BackendError> {
        let surface = self
            .surfaces
            .get_mut(&id)
            .ok_or_else(|| BackendError::present(id, "no such surface"))?;

        surface.window.pre_present_notify();
        surface
            .renderer
            .render_pixels(frame.pixels)
            .map_err(|e| BackendError::present(id, e.to_string()))
    }

    fn poll_events(&mut self) {
        self.pump();
    }

    fn destroy_surface(&mut self, id: SurfaceId) {
        self.surfaces.remove(&id);
        self.state.close_requested.remove(&id);
        self.state.lookup.retain(|_, surface| *surface != id);
    }
}
