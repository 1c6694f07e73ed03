// SPDX-License-Identifier: GPL-3.0-only

//! Capture session lifecycle manager
//!
//! The manager provides:
//! - Acquisition with a bounded wait
//! - Release of every track (idempotent)
//! - Preview surface binding
//! - Rejection of stale completions by generation

use super::CaptureBackend;
use super::types::{MediaConstraints, MediaStream};
use crate::config::WidgetConfig;
use crate::constants::ACQUIRE_TIMEOUT;
use crate::errors::CameraError;
use crate::media::PreviewSurface;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Future resolving to a freshly acquired stream
pub type AcquireFuture = BoxFuture<'static, Result<MediaStream, CameraError>>;

/// A live capture stream plus the configuration it was acquired with
#[derive(Debug)]
pub struct Session {
    stream: MediaStream,
    config: WidgetConfig,
    acquired_at: Instant,
}

impl Session {
    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// True while the stream has a live video track (something to preview)
    pub fn has_video(&self) -> bool {
        self.stream.video_track().is_some_and(|t| t.is_live())
    }
}

#[derive(Debug)]
struct PendingAcquire {
    generation: u64,
    config: WidgetConfig,
}

/// Session manager
///
/// Owns at most one session at a time. Every acquisition starts from a
/// released state, so a session is never reused.
pub struct SessionManager {
    backend: Arc<dyn CaptureBackend>,
    session: Option<Session>,
    pending: Option<PendingAcquire>,
    preview: PreviewSurface,
    generation: u64,
    acquired_total: u64,
    timeout: Duration,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn CaptureBackend>, config: &WidgetConfig) -> Self {
        info!(backend = backend.name(), "Creating session manager");
        Self {
            backend,
            session: None,
            pending: None,
            preview: PreviewSurface::new(config.width, config.height, config.enable_audio),
            generation: 0,
            acquired_total: 0,
            timeout: ACQUIRE_TIMEOUT,
        }
    }

    /// Override the acquisition timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn backend(&self) -> &Arc<dyn CaptureBackend> {
        &self.backend
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_acquiring(&self) -> bool {
        self.pending.is_some()
    }

    /// Generation of the most recent acquire/release
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of sessions successfully acquired so far
    pub fn acquired_total(&self) -> u64 {
        self.acquired_total
    }

    pub fn preview(&self) -> &PreviewSurface {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewSurface {
        &mut self.preview
    }

    /// Acquire a fresh session and bind it to the preview
    pub async fn acquire(&mut self, config: &WidgetConfig) -> Result<&Session, CameraError> {
        let (generation, request) = self.begin_acquire(config);
        let result = request.await;
        self.finish_acquire(generation, result)
    }

    /// Release the current session and start a new acquisition
    ///
    /// The returned future may be driven elsewhere; hand its output back
    /// through [`SessionManager::finish_acquire`] with the same generation.
    pub fn begin_acquire(&mut self, config: &WidgetConfig) -> (u64, AcquireFuture) {
        self.release();

        self.generation += 1;
        let generation = self.generation;
        self.pending = Some(PendingAcquire {
            generation,
            config: config.clone(),
        });

        let constraints = MediaConstraints::from(config);
        info!(
            generation,
            facing = %constraints.video.facing_mode,
            audio = constraints.audio,
            aspect_ratio = ?constraints.video.aspect_ratio,
            "Requesting camera session"
        );

        let request = self.backend.acquire(&constraints);
        let timeout = self.timeout;
        let future = async move {
            match tokio::time::timeout(timeout, request).await {
                Ok(result) => result.map_err(CameraError::from),
                Err(_) => Err(CameraError::Timeout),
            }
        }
        .boxed();

        (generation, future)
    }

    /// Complete an acquisition started by [`SessionManager::begin_acquire`]
    ///
    /// A completion that is no longer current gets its stream stopped and
    /// reports [`CameraError::Superseded`].
    pub fn finish_acquire(
        &mut self,
        generation: u64,
        result: Result<MediaStream, CameraError>,
    ) -> Result<&Session, CameraError> {
        let pending = match self.pending.take() {
            Some(pending) if pending.generation == generation => pending,
            other => {
                self.pending = other;
                if let Ok(stream) = result {
                    debug!(generation, stream = %stream.id, "Releasing stale stream");
                    stream.stop();
                }
                return Err(CameraError::Superseded);
            }
        };

        let stream = match result {
            Ok(stream) => stream,
            Err(e) => {
                error!(generation, error = %e, "Error accessing camera");
                return Err(e);
            }
        };

        info!(
            generation,
            stream = %stream.id,
            tracks = stream.tracks.len(),
            "Camera session acquired"
        );

        self.preview.bind_live(&stream.id);
        self.acquired_total += 1;
        Ok(self.session.insert(Session {
            stream,
            config: pending.config,
            acquired_at: Instant::now(),
        }))
    }

    /// Stop every track of the current session and unbind the preview
    ///
    /// Also invalidates any acquisition still in flight. Returns whether a
    /// session was held.
    pub fn release(&mut self) -> bool {
        if self.pending.take().is_some() {
            debug!(generation = self.generation, "Cancelling pending acquisition");
            self.generation += 1;
        }

        let Some(session) = self.session.take() else {
            return false;
        };

        info!(stream = %session.stream.id, "Releasing camera session");
        session.stream.stop();
        self.preview.clear();
        true
    }

    /// Rebind the live stream after playback
    pub fn rebind_preview(&mut self) {
        match &self.session {
            Some(session) => self.preview.bind_live(&session.stream.id),
            None => self.preview.clear(),
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("backend", &self.backend.name())
            .field("generation", &self.generation)
            .field("session", &self.session.as_ref().map(|s| &s.stream.id))
            .field("acquiring", &self.pending.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::TrackKind;
    use crate::backends::virtual_camera::{PermissionPrompt, VirtualCamera};
    use crate::config::FacingMode;

    fn manager(camera: &VirtualCamera) -> SessionManager {
        SessionManager::new(Arc::new(camera.clone()), &WidgetConfig::default())
    }

    #[tokio::test]
    async fn test_acquire_binds_one_stream() {
        let camera = VirtualCamera::new();
        let mut sessions = manager(&camera);

        let session = sessions.acquire(&WidgetConfig::default()).await.unwrap();
        let stream_id = session.stream().id.clone();
        assert!(session.stream().audio_track().is_some());
        assert!(session.has_video());

        assert_eq!(camera.streams().len(), 1);
        assert!(
            matches!(sessions.preview().source(), crate::media::PreviewSource::Live { stream_id: id } if *id == stream_id)
        );
    }

    #[tokio::test]
    async fn test_release_stops_each_track_once() {
        let camera = VirtualCamera::new();
        let mut sessions = manager(&camera);
        sessions.acquire(&WidgetConfig::default()).await.unwrap();

        assert!(sessions.release());
        assert!(!sessions.release());

        let stream = &camera.streams()[0];
        assert_eq!(stream.tracks.len(), 2);
        for track in &stream.tracks {
            assert!(!track.is_live());
            assert_eq!(track.stop_count(), 1);
        }
        assert!(!sessions.has_session());
        assert!(!sessions.preview().is_live());
    }

    #[tokio::test]
    async fn test_reacquire_requests_fresh_stream() {
        let camera = VirtualCamera::new();
        let mut sessions = manager(&camera);
        let first = sessions.acquire(&WidgetConfig::default()).await.unwrap().stream().id.clone();
        let second = sessions.acquire(&WidgetConfig::default()).await.unwrap().stream().id.clone();

        assert_ne!(first, second);
        assert_eq!(camera.acquisitions().len(), 2);
        assert!(!camera.streams()[0].is_active());
        assert_eq!(sessions.acquired_total(), 2);
    }

    #[tokio::test]
    async fn test_permission_denied() {
        let camera = VirtualCamera::new();
        camera.set_permission(PermissionPrompt::Deny);
        let mut sessions = manager(&camera);

        let err = sessions.acquire(&WidgetConfig::default()).await.unwrap_err();
        assert_eq!(err, CameraError::PermissionDenied);
        assert!(!sessions.has_session());
        assert!(!sessions.is_acquiring());
    }

    #[tokio::test]
    async fn test_audio_without_microphone_is_not_found() {
        let camera = VirtualCamera::new();
        camera.set_devices(vec![crate::backends::camera::CameraDevice {
            name: "Deskcam".into(),
            facing: FacingMode::User,
            has_microphone: false,
        }]);
        let mut sessions = manager(&camera);

        let err = sessions.acquire(&WidgetConfig::default()).await.unwrap_err();
        assert_eq!(err, CameraError::DeviceNotFound);

        let silent = WidgetConfig {
            enable_audio: false,
            ..WidgetConfig::default()
        };
        let session = sessions.acquire(&silent).await.unwrap();
        assert_eq!(session.stream().tracks.len(), 1);
        assert_eq!(session.stream().tracks[0].kind, TrackKind::Video);
    }

    #[tokio::test]
    async fn test_stale_completion_is_released() {
        let camera = VirtualCamera::new();
        let mut sessions = manager(&camera);

        let (stale, stale_request) = sessions.begin_acquire(&WidgetConfig::default());
        let (current, request) = sessions.begin_acquire(&WidgetConfig::default());
        assert_ne!(stale, current);

        let stale_stream = stale_request.await.unwrap();
        let err = sessions
            .finish_acquire(stale, Ok(stale_stream.clone()))
            .unwrap_err();
        assert_eq!(err, CameraError::Superseded);
        assert!(!stale_stream.is_active());
        assert!(sessions.is_acquiring());

        let result = request.await;
        assert!(sessions.finish_acquire(current, result).is_ok());
        assert!(sessions.has_session());
    }

    #[tokio::test]
    async fn test_release_cancels_pending_acquisition() {
        let camera = VirtualCamera::new();
        let mut sessions = manager(&camera);

        let (generation, request) = sessions.begin_acquire(&WidgetConfig::default());
        sessions.release();
        let result = request.await;
        assert_eq!(
            sessions.finish_acquire(generation, result).unwrap_err(),
            CameraError::Superseded
        );
        assert!(!sessions.has_session());
        assert!(camera.streams().iter().all(|s| !s.is_active()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_acquire_times_out() {
        let camera = VirtualCamera::new();
        camera.set_permission(PermissionPrompt::Deferred);
        let mut sessions = manager(&camera).with_timeout(Duration::from_secs(2));

        let err = sessions.acquire(&WidgetConfig::default()).await.unwrap_err();
        assert_eq!(err, CameraError::Timeout);
        assert!(!sessions.is_acquiring());
    }
}
