// SPDX-License-Identifier: MPL-2.0

//! Camera widget
//!
//! This module contains the widget state, message handling and the view
//! model built from them.
//!
//! # Architecture
//!
//! - `state`: Widget state types (CameraWidget, Message, CameraMode, ViewState)
//! - `controls`: Actions and their enabling conditions
//! - `update`: Message dispatch
//! - `handlers`: Per-domain message handlers
//! - `view`: Toolkit-independent view model
//! - `task`: Asynchronous work returned by `update` and the loop driving it
//!
//! # Main Types
//!
//! - `CameraWidget`: The widget model with its session and recorder
//! - `Message`: All user interactions and platform completions
//! - `Runtime`: Feeds task output back into the widget

mod controls;
mod handlers;
mod state;
mod task;
mod update;
mod view;

pub use controls::Action;
pub use state::{CameraMode, CameraWidget, Message, ViewState};
pub use task::{Runtime, Task};
pub use view::{Button, View};

use crate::backends::camera::{CaptureBackend, Session, SessionManager};
use crate::config::WidgetConfig;
use crate::constants::FINALIZE_TIMEOUT;
use crate::errors::AppError;
use crate::media::{ObjectUrlRegistry, PreviewSurface};
use crate::pipelines::photo::Photo;
use crate::pipelines::video::{Clip, RecorderPhase, RecordingController};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

impl CameraWidget {
    /// Create an unmounted widget; no session is requested yet
    pub fn new(config: WidgetConfig, backend: Arc<dyn CaptureBackend>) -> Self {
        info!(
            backend = backend.name(),
            width = config.width,
            height = config.height,
            facing = %config.facing_mode,
            audio = config.enable_audio,
            "Creating camera widget"
        );

        let urls = ObjectUrlRegistry::new();
        Self {
            sessions: SessionManager::new(backend, &config),
            recording: RecordingController::new(urls.clone()),
            config,
            mode: CameraMode::default(),
            photo: None,
            is_playing: false,
            playback: 0,
            last_error: None,
            urls,
            finalize_timeout: FINALIZE_TIMEOUT,
        }
    }

    /// Create the widget and start acquiring its first session
    pub fn mount(config: WidgetConfig, backend: Arc<dyn CaptureBackend>) -> (Self, Task) {
        let mut widget = Self::new(config, backend);
        let task = widget.restart_session();
        (widget, task)
    }

    /// Override the acquisition and finalization deadlines
    pub fn with_timeouts(mut self, acquire: Duration, finalize: Duration) -> Self {
        let backend = Arc::clone(self.sessions.backend());
        self.sessions = SessionManager::new(backend, &self.config).with_timeout(acquire);
        self.finalize_timeout = finalize;
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn backend(&self) -> &Arc<dyn CaptureBackend> {
        self.sessions.backend()
    }

    pub fn session(&self) -> Option<&Session> {
        self.sessions.session()
    }

    /// Whether an acquisition is in flight
    pub fn is_acquiring(&self) -> bool {
        self.sessions.is_acquiring()
    }

    /// Number of sessions acquired since creation
    pub fn sessions_acquired(&self) -> u64 {
        self.sessions.acquired_total()
    }

    pub fn preview(&self) -> &PreviewSurface {
        self.sessions.preview()
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn clip(&self) -> Option<&Clip> {
        self.recording.clip()
    }

    pub fn recording_phase(&self) -> &RecorderPhase {
        self.recording.phase()
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Most recent failure, cleared by the next successful operation
    pub fn last_error(&self) -> Option<&AppError> {
        self.last_error.as_ref()
    }

    pub fn object_urls(&self) -> &ObjectUrlRegistry {
        &self.urls
    }

    pub fn view_state(&self) -> ViewState {
        ViewState {
            mode: self.mode,
            is_recording: self.recording.is_busy(),
            is_playing: self.is_playing,
            has_recording_ready: self.recording.clip().is_some(),
            has_photo_ready: self.photo.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::virtual_camera::{PermissionPrompt, VirtualCamera};
    use crate::backends::camera::RecorderEvent;
    use crate::errors::{CameraError, RecordingError};
    use crate::media::PreviewSource;

    fn mounted(camera: &VirtualCamera) -> (CameraWidget, Runtime) {
        let (mut widget, task) =
            CameraWidget::mount(WidgetConfig::default(), Arc::new(camera.clone()));
        let mut runtime = Runtime::new();
        runtime.spawn(task);
        runtime.run_until_stalled(&mut widget);
        (widget, runtime)
    }

    #[tokio::test]
    async fn test_mount_acquires_session() {
        let camera = VirtualCamera::new();
        let (widget, _runtime) = mounted(&camera);

        assert!(widget.session().is_some());
        assert!(widget.preview().is_live());
        assert_eq!(widget.sessions_acquired(), 1);
        assert_eq!(widget.view_state(), ViewState::default());
    }

    #[tokio::test]
    async fn test_disabled_action_leaves_state() {
        let camera = VirtualCamera::new();
        let (mut widget, mut runtime) = mounted(&camera);

        // Photo mode: recording is not available
        runtime.dispatch(&mut widget, Message::StartRecording);
        assert!(matches!(widget.recording_phase(), RecorderPhase::Idle));
        assert_eq!(camera.recorders_created(), 0);
        assert!(runtime.is_idle());
    }

    #[tokio::test]
    async fn test_capture_then_toggle_drops_photo() {
        let camera = VirtualCamera::new();
        let (mut widget, mut runtime) = mounted(&camera);

        runtime.dispatch(&mut widget, Message::CapturePhoto);
        assert!(widget.photo().is_some());

        runtime.dispatch(&mut widget, Message::ToggleMode);
        runtime.run_until_stalled(&mut widget);
        assert_eq!(widget.mode(), CameraMode::Video);
        assert!(widget.photo().is_none());
        assert_eq!(widget.sessions_acquired(), 2);
    }

    #[tokio::test]
    async fn test_same_mode_is_noop() {
        let camera = VirtualCamera::new();
        let (mut widget, mut runtime) = mounted(&camera);

        runtime.dispatch(&mut widget, Message::SetMode(CameraMode::Photo));
        assert!(runtime.is_idle());
        assert_eq!(camera.acquisitions().len(), 1);
    }

    #[tokio::test]
    async fn test_denied_permission_sets_error() {
        let camera = VirtualCamera::new();
        camera.set_permission(PermissionPrompt::Deny);
        let (widget, _runtime) = mounted(&camera);

        assert!(widget.session().is_none());
        assert_eq!(
            widget.last_error(),
            Some(&AppError::Camera(CameraError::PermissionDenied))
        );
        assert!(!widget.is_enabled(Action::CapturePhoto));
    }

    #[tokio::test]
    async fn test_playback_binds_clip_and_returns_to_live() {
        let camera = VirtualCamera::new();
        let (mut widget, mut runtime) = mounted(&camera);
        runtime.dispatch(&mut widget, Message::SetMode(CameraMode::Video));
        runtime.run_until_stalled(&mut widget);

        runtime.dispatch(&mut widget, Message::StartRecording);
        let feed = camera.latest_feed().unwrap();
        feed.push(vec![1u8; 8]);
        runtime.run_until_stalled(&mut widget);
        runtime.dispatch(&mut widget, Message::StopRecording);
        runtime.run_until_stalled(&mut widget);

        let url = widget.clip().unwrap().url.clone();
        runtime.dispatch(&mut widget, Message::PlayRecording);
        assert!(widget.is_playing());
        assert_eq!(widget.preview().source(), &PreviewSource::Playback { url });
        assert!(!widget.is_enabled(Action::StartRecording));

        // End of an earlier playback is ignored
        let playback = widget.playback;
        runtime.dispatch(&mut widget, Message::PlaybackEnded { playback: playback - 1 });
        assert!(widget.is_playing());

        runtime.dispatch(&mut widget, Message::PlaybackEnded { playback });
        assert!(!widget.is_playing());
        assert!(widget.preview().is_live());
    }

    #[tokio::test]
    async fn test_recorder_error_returns_to_idle() {
        let camera = VirtualCamera::new();
        let (mut widget, mut runtime) = mounted(&camera);
        runtime.dispatch(&mut widget, Message::ToggleMode);
        runtime.run_until_stalled(&mut widget);

        runtime.dispatch(&mut widget, Message::StartRecording);
        let feed = camera.latest_feed().unwrap();
        feed.send(RecorderEvent::Error("encoder crashed".into()));
        runtime.run_until_stalled(&mut widget);

        assert!(widget.recording.is_idle());
        assert!(matches!(
            widget.last_error(),
            Some(AppError::Recording(RecordingError::RecorderUnavailable(_)))
        ));
    }
}
