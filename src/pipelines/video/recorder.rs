// SPDX-License-Identifier: MPL-2.0

//! Recording controller
//!
//! ```text
//! Idle ──start()──▶ Recording ──stop()──▶ Finalizing ──on_stopped()──▶ Ready
//!  ▲                                          │                          │
//!  └──────────── timeout / error / empty ─────┘◀──────── discard() ──────┘
//! ```
//!
//! Every recording gets a fresh id. Platform events carry that id, so events
//! from an earlier recording can never touch the current one.

use crate::backends::camera::types::RecorderEvents;
use crate::backends::camera::{CaptureBackend, MediaRecorder, Session};
use crate::errors::RecordingError;
use crate::media::{Blob, Fragment, ObjectUrl, ObjectUrlRegistry};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// A finalized, playable recording
#[derive(Debug, Clone)]
pub struct Clip {
    pub blob: Blob,
    pub url: ObjectUrl,
    /// Number of non-empty fragments assembled
    pub fragments: usize,
    /// Wall time between start and stop
    pub duration: Duration,
}

impl Clip {
    pub fn size(&self) -> usize {
        self.blob.size()
    }
}

/// Recording state machine
#[derive(Debug, Default)]
pub enum RecorderPhase {
    /// Nothing recorded or held
    #[default]
    Idle,
    /// Recorder running, fragments arriving
    Recording { id: u64, started_at: Instant },
    /// Stop requested, waiting for the recorder's completion
    Finalizing {
        id: u64,
        started_at: Instant,
        stopped_at: Instant,
    },
    /// Clip assembled and registered
    Ready { clip: Clip },
}

impl RecorderPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RecorderPhase::Idle => "idle",
            RecorderPhase::Recording { .. } => "recording",
            RecorderPhase::Finalizing { .. } => "finalizing",
            RecorderPhase::Ready { .. } => "ready",
        }
    }
}

/// Drives one platform recorder at a time
pub struct RecordingController {
    phase: RecorderPhase,
    buffer: Vec<Fragment>,
    recorder: Option<Box<dyn MediaRecorder>>,
    mime_type: String,
    next_id: u64,
    urls: ObjectUrlRegistry,
}

impl RecordingController {
    pub fn new(urls: ObjectUrlRegistry) -> Self {
        Self {
            phase: RecorderPhase::Idle,
            buffer: Vec::new(),
            recorder: None,
            mime_type: crate::constants::DEFAULT_RECORDING_MIME_TYPE.to_string(),
            next_id: 0,
            urls,
        }
    }

    pub fn phase(&self) -> &RecorderPhase {
        &self.phase
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, RecorderPhase::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.phase, RecorderPhase::Recording { .. })
    }

    pub fn is_finalizing(&self) -> bool {
        matches!(self.phase, RecorderPhase::Finalizing { .. })
    }

    /// Recording or finalizing
    pub fn is_busy(&self) -> bool {
        self.is_recording() || self.is_finalizing()
    }

    pub fn clip(&self) -> Option<&Clip> {
        match &self.phase {
            RecorderPhase::Ready { clip } => Some(clip),
            _ => None,
        }
    }

    /// Id of the recording in progress (recording or finalizing)
    pub fn current_id(&self) -> Option<u64> {
        match self.phase {
            RecorderPhase::Recording { id, .. } | RecorderPhase::Finalizing { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Bytes buffered for the recording in progress
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.iter().map(Fragment::len).sum()
    }

    /// Seconds since the current recording started
    pub fn elapsed_secs(&self) -> u64 {
        match &self.phase {
            RecorderPhase::Recording { started_at, .. } => started_at.elapsed().as_secs(),
            RecorderPhase::Finalizing {
                started_at,
                stopped_at,
                ..
            } => stopped_at.duration_since(*started_at).as_secs(),
            _ => 0,
        }
    }

    /// Start recording from the session's stream
    ///
    /// # Returns
    /// * `Ok((id, events))` - Recorder running; feed `events` back tagged with `id`
    /// * `Err(RecordingError::NoSession)` - No live session
    /// * `Err(RecordingError::AlreadyRecording)` - Recording or finalizing
    /// * `Err(RecordingError::InvalidState)` - A clip is still held
    /// * `Err(RecordingError::RecorderUnavailable)` - Platform refused
    pub fn start(
        &mut self,
        backend: &dyn CaptureBackend,
        session: Option<&Session>,
    ) -> Result<(u64, RecorderEvents), RecordingError> {
        match self.phase {
            RecorderPhase::Idle => {}
            RecorderPhase::Recording { .. } | RecorderPhase::Finalizing { .. } => {
                return Err(RecordingError::AlreadyRecording);
            }
            RecorderPhase::Ready { .. } => {
                return Err(RecordingError::InvalidState("a recording is still held"));
            }
        }

        let session = session.ok_or(RecordingError::NoSession)?;
        if !session.stream().is_active() {
            return Err(RecordingError::NoSession);
        }

        let mut recorder = backend.create_recorder(session.stream()).map_err(|e| {
            error!(error = %e, "Failed to create recorder");
            RecordingError::from(e)
        })?;
        let events = recorder.start().map_err(|e| {
            error!(error = %e, "Failed to start recorder");
            RecordingError::from(e)
        })?;

        self.next_id += 1;
        let id = self.next_id;
        self.mime_type = recorder.mime_type().to_string();
        self.recorder = Some(recorder);
        self.buffer.clear();
        self.phase = RecorderPhase::Recording {
            id,
            started_at: Instant::now(),
        };

        info!(recording = id, mime = %self.mime_type, "Recording started");
        Ok((id, events))
    }

    /// Buffer a data fragment
    ///
    /// Fragments are accepted while recording and during the final flush
    /// after `stop()`. Returns whether the fragment was kept.
    pub fn on_fragment(&mut self, id: u64, fragment: Fragment) -> bool {
        if self.current_id() != Some(id) {
            debug!(recording = id, "Ignoring fragment for inactive recording");
            return false;
        }
        if fragment.is_empty() {
            debug!(recording = id, "Discarding empty fragment");
            return false;
        }

        self.buffer.push(fragment);
        debug!(
            recording = id,
            fragments = self.buffer.len(),
            bytes = self.buffered_bytes(),
            "Fragment buffered"
        );
        true
    }

    /// Ask the recorder to finish
    ///
    /// Only valid while recording; otherwise the state is left untouched.
    pub fn stop(&mut self) -> Result<u64, RecordingError> {
        let RecorderPhase::Recording { id, started_at } = self.phase else {
            debug!(state = self.phase.name(), "Stop ignored: not recording");
            return Err(RecordingError::NotRecording);
        };

        if let Some(recorder) = self.recorder.as_mut()
            && let Err(e) = recorder.stop()
        {
            error!(recording = id, error = %e, "Recorder failed to stop");
            self.reset();
            return Err(RecordingError::from(e));
        }

        info!(recording = id, bytes = self.buffered_bytes(), "Recording stopping");
        self.phase = RecorderPhase::Finalizing {
            id,
            started_at,
            stopped_at: Instant::now(),
        };
        Ok(id)
    }

    /// Recorder completion
    ///
    /// Duplicate or stale completions return `Ok(None)`. A completion with
    /// nothing buffered fails with [`RecordingError::EmptyRecording`] and
    /// returns the controller to idle.
    pub fn on_stopped(&mut self, id: u64) -> Result<Option<&Clip>, RecordingError> {
        let (started_at, stopped_at) = match self.phase {
            RecorderPhase::Finalizing {
                id: current,
                started_at,
                stopped_at,
            } if current == id => (started_at, stopped_at),
            // Recorder ended by itself (e.g. the track went away)
            RecorderPhase::Recording {
                id: current,
                started_at,
            } if current == id => (started_at, Instant::now()),
            _ => {
                debug!(recording = id, state = self.phase.name(), "Ignoring duplicate completion");
                return Ok(None);
            }
        };

        self.recorder = None;
        let fragments = std::mem::take(&mut self.buffer);
        if fragments.is_empty() {
            warn!(recording = id, "Recording finished without data");
            self.phase = RecorderPhase::Idle;
            return Err(RecordingError::EmptyRecording);
        }

        let mime_type = fragments
            .iter()
            .map(|f| f.mime_type.as_str())
            .find(|m| !m.is_empty())
            .unwrap_or(&self.mime_type)
            .to_string();
        let blob = Blob::from_fragments(&fragments, mime_type);
        let url = self.urls.create(blob.clone());

        info!(
            recording = id,
            bytes = blob.size(),
            fragments = fragments.len(),
            url = %url,
            "Recording ready"
        );

        self.phase = RecorderPhase::Ready {
            clip: Clip {
                blob,
                url,
                fragments: fragments.len(),
                duration: stopped_at.duration_since(started_at),
            },
        };
        Ok(self.clip())
    }

    /// Finalization deadline for recording `id` passed
    ///
    /// `Err(Timeout)` when the recording was still finalizing and has been
    /// dropped; `Ok(())` when the deadline is stale.
    pub fn on_timeout(&mut self, id: u64) -> Result<(), RecordingError> {
        match self.phase {
            RecorderPhase::Finalizing { id: current, .. } if current == id => {
                error!(recording = id, "Recorder did not finish in time");
                self.reset();
                Err(RecordingError::Timeout)
            }
            _ => Ok(()),
        }
    }

    /// The platform recorder failed
    pub fn on_error(&mut self, id: u64, message: &str) -> Result<(), RecordingError> {
        if self.current_id() != Some(id) {
            return Ok(());
        }
        error!(recording = id, error = %message, "Recorder error");
        self.reset();
        Err(RecordingError::RecorderUnavailable(message.to_string()))
    }

    /// Throw away the held clip (if any) and return to idle
    ///
    /// Returns whether a clip was released.
    pub fn discard(&mut self) -> Result<bool, RecordingError> {
        match std::mem::take(&mut self.phase) {
            RecorderPhase::Ready { clip } => {
                self.urls.revoke(&clip.url);
                self.buffer.clear();
                info!(url = %clip.url, "Recording discarded");
                Ok(true)
            }
            RecorderPhase::Idle => {
                self.buffer.clear();
                Ok(false)
            }
            busy => {
                self.phase = busy;
                Err(RecordingError::InvalidState("recording in progress"))
            }
        }
    }

    fn reset(&mut self) {
        self.recorder = None;
        self.buffer.clear();
        self.phase = RecorderPhase::Idle;
    }
}

impl Drop for RecordingController {
    fn drop(&mut self) {
        if let RecorderPhase::Ready { clip } = &self.phase {
            self.urls.revoke(&clip.url);
        }
    }
}

impl std::fmt::Debug for RecordingController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordingController")
            .field("phase", &self.phase.name())
            .field("fragments", &self.buffer.len())
            .field("bytes", &self.buffered_bytes())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::SessionManager;
    use crate::backends::virtual_camera::VirtualCamera;
    use crate::config::WidgetConfig;
    use std::sync::Arc;

    async fn setup() -> (VirtualCamera, SessionManager, ObjectUrlRegistry, RecordingController) {
        let camera = VirtualCamera::new();
        let config = WidgetConfig::default();
        let mut sessions = SessionManager::new(Arc::new(camera.clone()), &config);
        sessions.acquire(&config).await.unwrap();
        let urls = ObjectUrlRegistry::new();
        let controller = RecordingController::new(urls.clone());
        (camera, sessions, urls, controller)
    }

    fn fragment(len: usize) -> Fragment {
        Fragment::new(vec![7u8; len], "video/webm")
    }

    #[tokio::test]
    async fn test_size_is_sum_of_non_empty_fragments() {
        let (camera, sessions, urls, mut controller) = setup().await;
        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();

        for len in [10, 0, 20, 0, 5] {
            controller.on_fragment(id, fragment(len));
        }
        assert_eq!(controller.stop().unwrap(), id);
        let clip = controller.on_stopped(id).unwrap().unwrap();

        assert_eq!(clip.size(), 35);
        assert_eq!(clip.fragments, 3);
        assert_eq!(urls.live_count(), 1);
    }

    #[tokio::test]
    async fn test_fragments_keep_delivery_order() {
        let (camera, sessions, _urls, mut controller) = setup().await;
        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();

        controller.on_fragment(id, Fragment::new(vec![1u8, 2], ""));
        controller.on_fragment(id, Fragment::new(vec![3u8], "video/webm"));
        controller.stop().unwrap();
        // Final flush after stop is still part of the clip
        controller.on_fragment(id, Fragment::new(vec![4u8], "video/webm"));

        let clip = controller.on_stopped(id).unwrap().unwrap();
        assert_eq!(&*clip.blob.data, &[1, 2, 3, 4]);
        assert_eq!(clip.blob.mime_type, "video/webm");
    }

    #[tokio::test]
    async fn test_stop_outside_recording_is_noop() {
        let (camera, sessions, _urls, mut controller) = setup().await;
        assert_eq!(controller.stop(), Err(RecordingError::NotRecording));
        assert!(controller.is_idle());

        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        controller.on_fragment(id, fragment(4));
        controller.stop().unwrap();
        controller.on_stopped(id).unwrap();

        assert_eq!(controller.stop(), Err(RecordingError::NotRecording));
        assert_eq!(controller.clip().map(Clip::size), Some(4));
    }

    #[tokio::test]
    async fn test_start_requires_idle_and_session() {
        let (camera, sessions, _urls, mut controller) = setup().await;
        assert!(matches!(
            controller.start(&camera, None),
            Err(RecordingError::NoSession)
        ));

        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        assert!(matches!(
            controller.start(&camera, sessions.session()),
            Err(RecordingError::AlreadyRecording)
        ));

        controller.on_fragment(id, fragment(1));
        controller.stop().unwrap();
        controller.on_stopped(id).unwrap();
        assert!(matches!(
            controller.start(&camera, sessions.session()),
            Err(RecordingError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_recording_is_rejected() {
        let (camera, sessions, urls, mut controller) = setup().await;
        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        controller.on_fragment(id, fragment(0));
        controller.stop().unwrap();

        assert!(matches!(
            controller.on_stopped(id),
            Err(RecordingError::EmptyRecording)
        ));
        assert!(controller.is_idle());
        assert_eq!(urls.live_count(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_completion_is_ignored() {
        let (camera, sessions, urls, mut controller) = setup().await;
        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        controller.on_fragment(id, fragment(3));
        controller.stop().unwrap();

        assert!(controller.on_stopped(id).unwrap().is_some());
        assert!(controller.on_stopped(id).unwrap().is_none());
        assert_eq!(urls.live_count(), 1);
        assert_eq!(controller.clip().map(Clip::size), Some(3));
    }

    #[tokio::test]
    async fn test_events_of_old_recording_are_ignored() {
        let (camera, sessions, _urls, mut controller) = setup().await;
        let (old, _events) = controller.start(&camera, sessions.session()).unwrap();
        controller.on_fragment(old, fragment(2));
        controller.stop().unwrap();
        controller.on_stopped(old).unwrap();
        controller.discard().unwrap();

        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        assert_ne!(id, old);
        assert!(!controller.on_fragment(old, fragment(9)));
        assert!(controller.on_stopped(old).unwrap().is_none());
        assert!(controller.is_recording());
    }

    #[tokio::test]
    async fn test_timeout_while_finalizing() {
        let (camera, sessions, _urls, mut controller) = setup().await;
        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        controller.on_fragment(id, fragment(8));

        // Deadline from a recording that is not finalizing is stale
        assert!(controller.on_timeout(id).is_ok());
        assert!(controller.is_recording());

        controller.stop().unwrap();
        assert_eq!(controller.on_timeout(id), Err(RecordingError::Timeout));
        assert!(controller.is_idle());
        assert_eq!(controller.buffered_bytes(), 0);
    }

    #[tokio::test]
    async fn test_discard_revokes_url() {
        let (camera, sessions, urls, mut controller) = setup().await;
        assert_eq!(controller.discard(), Ok(false));

        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        assert!(matches!(
            controller.discard(),
            Err(RecordingError::InvalidState(_))
        ));
        assert!(controller.is_recording());

        controller.on_fragment(id, fragment(6));
        controller.stop().unwrap();
        controller.on_stopped(id).unwrap();
        assert_eq!(urls.live_count(), 1);

        assert_eq!(controller.discard(), Ok(true));
        assert!(controller.is_idle());
        assert_eq!(urls.live_count(), 0);
    }

    #[tokio::test]
    async fn test_recorder_unavailable() {
        let (camera, sessions, _urls, mut controller) = setup().await;
        camera.set_recorder_available(false);
        assert!(matches!(
            controller.start(&camera, sessions.session()),
            Err(RecordingError::RecorderUnavailable(_))
        ));
        assert!(controller.is_idle());
    }

    #[tokio::test]
    async fn test_drop_revokes_held_clip() {
        let (camera, sessions, urls, mut controller) = setup().await;
        let (id, _events) = controller.start(&camera, sessions.session()).unwrap();
        controller.on_fragment(id, fragment(1));
        controller.stop().unwrap();
        controller.on_stopped(id).unwrap();

        drop(controller);
        assert_eq!(urls.live_count(), 0);
    }
}
