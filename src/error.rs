//! Errors reported by windowing backends.
//!
//! Contract violations (mismatched frame sizes, unknown handles) are not
//! represented here; they panic at the call site. `BackendError` only covers
//! conditions the platform can legitimately produce.

use thiserror::Error;

use crate::traits::SurfaceId;

/// Failure raised by a [`SurfaceBackend`](crate::traits::SurfaceBackend).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The backend could not bring up its windowing or graphics stack
    #[error("backend initialisation failed: {0}")]
    Init(String),

    /// The platform refused to open a new surface
    #[error("failed to create surface \"{title}\": {reason}")]
    SurfaceCreation { title: String, reason: String },

    /// Presenting a frame to an existing surface failed
    #[error("failed to present {id}: {reason}")]
    Present { id: SurfaceId, reason: String },

    /// Asynchronous platform diagnostic (driver errors, lost devices, ...)
    #[error("platform error: {0}")]
    Platform(String),
}

impl BackendError {
    pub fn init(reason: impl Into<String>) -> Self {
        Self::Init(reason.into())
    }

    pub fn surface_creation(title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SurfaceCreation {
            title: title.into(),
            reason: reason.into(),
        }
    }

    pub fn present(id: SurfaceId, reason: impl Into<String>) -> Self {
        Self::Present {
            id,
            reason: reason.into(),
        }
    }

    pub fn platform(reason: impl Into<String>) -> Self {
        Self::Platform(reason.into())
    }
}
