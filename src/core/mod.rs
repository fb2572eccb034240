pub mod gpu_context;
pub mod headless;
pub mod mailbox;
pub mod registry;
pub mod relay;
pub mod stats;
pub mod surface_renderer;
pub mod window;
#[cfg(any(target_os = "linux", target_os = "windows", target_os = "macos"))]
pub mod winit_backend;

pub use gpu_context::GpuContext;
pub use headless::{HeadlessBackend, HeadlessSurface};
pub use mailbox::{Deposit, Mailbox, PendingFrameSlot, ReconcileReport};
pub use registry::{WindowEntry, WindowRegistry};
pub use relay::{FrameRelay, FrameSubmitter, SubmitOutcome};
pub use stats::{RelayStats, RelayStatsSnapshot};
pub use surface_renderer::SurfaceRenderer;
pub use window::{WindowDimensions, BYTES_PER_PIXEL};
#[cfg(any(target_os = "linux", target_os = "windows", target_os = "macos"))]
pub use winit_backend::WinitBackend;
