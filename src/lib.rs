//! Concurrently displayed RGBA pixel windows.
//!
//! Producers on any thread push whole frames into windows through a
//! [`FrameSubmitter`]; a single render thread drives [`WindowSystem`], which
//! presents the latest frame of every window each pass. Producers never wait
//! for a pass to finish and the render thread never waits for a producer.

pub mod cli;
pub mod config;
pub mod core;
pub mod demo;
pub mod display;
pub mod error;
pub mod traits;

pub use crate::core::{FrameRelay, FrameSubmitter, HeadlessBackend, SubmitOutcome, WindowDimensions};
pub use display::WindowSystem;
pub use error::BackendError;
pub use traits::{FrameView, SurfaceBackend, SurfaceId};
