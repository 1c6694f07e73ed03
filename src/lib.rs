// SPDX-License-Identifier: MPL-2.0

//! Camera Widget - live preview, photo snapshots and video clips
//!
//! This library provides a camera capture widget: it requests camera and
//! microphone access, previews the live stream, snapshots still photos and
//! records video clips, toggling between photo and video mode.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Widget state machine, message handling and view model
//! - [`backends`]: Platform capture seams and the virtual camera
//! - [`media`]: Blobs, object URLs and the preview surface
//! - [`pipelines`]: Photo capture and video recording
//! - [`config`]: Mount options
//! - [`storage`]: Saving photos and clips to disk
//! - [`terminal`]: Terminal front end
//!
//! # Example
//!
//! ```no_run
//! use camera_widget::{CameraWidget, Message, Runtime, WidgetConfig};
//! use camera_widget::backends::camera::get_backend;
//!
//! # async fn demo() {
//! let (mut widget, task) = CameraWidget::mount(WidgetConfig::default(), get_backend());
//! let mut runtime = Runtime::new();
//! runtime.spawn(task);
//! runtime.run_until_stalled(&mut widget);
//! runtime.dispatch(&mut widget, Message::CapturePhoto);
//! # }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod media;
pub mod pipelines;
pub mod storage;
pub mod terminal;

// Re-export commonly used types
pub use app::{Action, CameraMode, CameraWidget, Message, Runtime, Task, View, ViewState};
pub use config::{AspectRatio, FacingMode, WidgetConfig};
pub use errors::{AppError, AppResult, CameraError, PhotoError, RecordingError};
