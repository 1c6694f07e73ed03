// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! The platform provides three capabilities: camera/microphone acquisition,
//! media recording and frame snapshots. They are hidden behind two traits so
//! the widget logic never talks to a concrete platform.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   Widget (app)      │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │   SessionManager    │  ← Acquire/release, preview binding, stale completions
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureBackend Trait│  ← Common interface (+ MediaRecorder)
//! └──────────┬──────────┘
//!            │
//!            ▼
//!     ┌──────────────┐
//!     │Virtual camera│  ← Concrete implementation
//!     └──────────────┘
//! ```

pub mod manager;
pub mod types;

pub use manager::{Session, SessionManager};
pub use types::*;

use futures::future::BoxFuture;
use std::sync::Arc;

/// Platform capture capabilities
pub trait CaptureBackend: Send + Sync {
    /// Enumerate capture devices visible to the platform
    fn enumerate_devices(&self) -> Vec<CameraDevice>;

    /// Request a live stream satisfying `constraints`
    ///
    /// Resolves once the permission prompt (if any) has been answered.
    ///
    /// # Returns
    /// * `Ok(MediaStream)` - A fresh stream; the caller owns its tracks
    /// * `Err(BackendError::PermissionDenied)` - Access refused
    /// * `Err(BackendError::DeviceNotFound)` - No device matches
    fn acquire(&self, constraints: &MediaConstraints) -> BoxFuture<'static, BackendResult<MediaStream>>;

    /// Create a recorder bound to a live stream
    fn create_recorder(&self, stream: &MediaStream) -> BackendResult<Box<dyn MediaRecorder>>;

    /// Grab the frame currently shown by the stream's video track
    ///
    /// Returns `None` when the stream has no live video or no frame decoded yet.
    fn grab_frame(&self, stream: &MediaStream) -> Option<CameraFrame>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Platform media recorder
///
/// Data arrives asynchronously on the stream returned by [`MediaRecorder::start`].
/// After [`MediaRecorder::stop`] the stream delivers any remaining data followed
/// by exactly one [`RecorderEvent::Stopped`].
pub trait MediaRecorder: Send {
    /// Begin recording and return the event stream
    fn start(&mut self) -> BackendResult<RecorderEvents>;

    /// Ask the recorder to flush and finish
    fn stop(&mut self) -> BackendResult<()>;

    /// Container type of the produced data
    fn mime_type(&self) -> &str;
}

/// Get the default backend
pub fn get_backend() -> Arc<dyn CaptureBackend> {
    Arc::new(crate::backends::virtual_camera::VirtualCamera::new())
}
