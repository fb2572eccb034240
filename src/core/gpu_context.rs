use std::sync::Arc;
use wgpu::{Adapter, Device, DeviceDescriptor, Features, Instance, Limits, Queue, Surface};

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Device and queue shared by every window surface.
///
/// Created once, from the first surface, so the adapter is guaranteed to be
/// able to present to windows on this display.
#[derive(Clone)]
pub struct GpuContext {
    adapter: Arc<Adapter>,
    device: Arc<Device>,
    queue: Arc<Queue>,
}

impl GpuContext {
    /// Create a GPU context compatible with `surface`, blocking until the
    /// adapter and device are ready
    pub fn new_with_surface(instance: &Instance, surface: &Surface<'_>) -> Result<Self> {
        let adapter = pollster::block_on(Self::request_adapter(instance, surface))?;
        let (device, queue) = pollster::block_on(Self::request_device(&adapter))?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        Ok(Self {
            adapter: Arc::new(adapter),
            device: Arc::new(device),
            queue: Arc::new(queue),
        })
    }

    pub fn adapter(&self) -> &Adapter {
        &self.adapter
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    async fn request_adapter(instance: &Instance, surface: &Surface<'_>) -> Result<Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| format!("Failed to find appropriate adapter: {:?}", e).into())
    }

    async fn request_device(adapter: &Adapter) -> Result<(Device, Queue)> {
        // Texture upload and a fullscreen blit need nothing beyond the
        // downlevel baseline
        let limits = Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits());

        adapter
            .request_device(&DeviceDescriptor {
                label: Some("Window Device"),
                required_features: Features::empty(),
                required_limits: limits,
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .map_err(|e| format!("Failed to create device: {:?}", e).into())
    }
}
