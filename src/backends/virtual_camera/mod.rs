// SPDX-License-Identifier: GPL-3.0-only

//! Virtual camera backend
//!
//! A deterministic stand-in for the platform capture stack. It serves
//! synthetic colour-bar frames, answers the permission prompt according to a
//! configurable [`PermissionPrompt`], and records through a [`VirtualRecorder`]
//! whose fragments can be injected with a [`RecorderFeed`].
//!
//! # Architecture
//!
//! ```text
//! acquire(constraints)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ Permission prompt│  ← Grant / Deny / Deferred (answered later)
//! └──────────────────┘
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ Device selection │  ← facing hint, microphone check
//! └──────────────────┘
//!        │
//!        ▼
//!   MediaStream ──► grab_frame (colour bars) ──► VirtualRecorder (feed + timer)
//! ```

mod pattern;
mod recorder;

pub use pattern::color_bars;
pub use recorder::{RecorderFeed, VirtualRecorder};

use crate::backends::camera::types::{
    BackendError, BackendResult, CameraDevice, CameraFrame, MediaConstraints, MediaStream,
    MediaTrack, TrackKind,
};
use crate::backends::camera::{CaptureBackend, MediaRecorder};
use crate::config::FacingMode;
use crate::constants::virtual_camera::RECORDING_MIME_TYPE;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// How the virtual permission prompt answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermissionPrompt {
    /// Grant immediately
    #[default]
    Grant,
    /// Deny immediately
    Deny,
    /// Leave the prompt open until [`VirtualCamera::answer_prompt`]
    Deferred,
}

struct DeferredRequest {
    constraints: MediaConstraints,
    reply: oneshot::Sender<BackendResult<MediaStream>>,
}

pub(crate) struct VirtualState {
    devices: Vec<CameraDevice>,
    permission: PermissionPrompt,
    frames_available: bool,
    recorder_available: bool,
    timeslice: Option<Duration>,
    complete_on_stop: bool,
    acquisitions: Vec<MediaConstraints>,
    streams: Vec<MediaStream>,
    frame_sizes: HashMap<String, (u32, u32)>,
    tick: u64,
    deferred: VecDeque<DeferredRequest>,
    latest_feed: Option<RecorderFeed>,
    recorders_created: usize,
}

pub(crate) type Shared = Arc<Mutex<VirtualState>>;

/// Virtual camera
///
/// Cloning shares the underlying state, so a test can keep a handle while
/// the widget owns another.
#[derive(Clone)]
pub struct VirtualCamera {
    shared: Shared,
}

impl Default for VirtualCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualCamera {
    /// Front camera with microphone plus a rear camera, prompt grants
    pub fn new() -> Self {
        let state = VirtualState {
            devices: default_devices(),
            permission: PermissionPrompt::Grant,
            frames_available: true,
            recorder_available: true,
            timeslice: None,
            complete_on_stop: true,
            acquisitions: Vec::new(),
            streams: Vec::new(),
            frame_sizes: HashMap::new(),
            tick: 0,
            deferred: VecDeque::new(),
            latest_feed: None,
            recorders_created: 0,
        };
        Self {
            shared: Arc::new(Mutex::new(state)),
        }
    }

    // ===== Behaviour =====

    pub fn set_permission(&self, permission: PermissionPrompt) {
        self.shared.lock().unwrap().permission = permission;
    }

    pub fn set_devices(&self, devices: Vec<CameraDevice>) {
        self.shared.lock().unwrap().devices = devices;
    }

    /// When false, `grab_frame` never has a frame
    pub fn set_frames_available(&self, available: bool) {
        self.shared.lock().unwrap().frames_available = available;
    }

    /// When false, recorder creation fails
    pub fn set_recorder_available(&self, available: bool) {
        self.shared.lock().unwrap().recorder_available = available;
    }

    /// Emit an encoded test-pattern fragment every `timeslice`
    pub fn set_timeslice(&self, timeslice: Option<Duration>) {
        self.shared.lock().unwrap().timeslice = timeslice;
    }

    /// When false, recorders never report completion after `stop()`
    pub fn set_complete_on_stop(&self, complete: bool) {
        self.shared.lock().unwrap().complete_on_stop = complete;
    }

    /// Answer the oldest deferred permission prompt
    ///
    /// Returns false when no prompt was open.
    pub fn answer_prompt(&self, grant: bool) -> bool {
        let mut state = self.shared.lock().unwrap();
        let Some(request) = state.deferred.pop_front() else {
            return false;
        };

        let result = if grant {
            open_stream(&mut state, &request.constraints)
        } else {
            Err(BackendError::PermissionDenied)
        };

        if let Err(Ok(stream)) = request.reply.send(result) {
            debug!(stream = %stream.id, "Prompt answered after requester went away");
            stream.stop();
        }
        true
    }

    // ===== Introspection =====

    /// Constraints of every acquisition request, in order
    pub fn acquisitions(&self) -> Vec<MediaConstraints> {
        self.shared.lock().unwrap().acquisitions.clone()
    }

    /// Every stream handed out, in order
    pub fn streams(&self) -> Vec<MediaStream> {
        self.shared.lock().unwrap().streams.clone()
    }

    /// Streams with at least one live track
    pub fn active_streams(&self) -> usize {
        self.shared
            .lock()
            .unwrap()
            .streams
            .iter()
            .filter(|s| s.is_active())
            .count()
    }

    /// Feed of the most recently created recorder
    pub fn latest_feed(&self) -> Option<RecorderFeed> {
        self.shared.lock().unwrap().latest_feed.clone()
    }

    pub fn recorders_created(&self) -> usize {
        self.shared.lock().unwrap().recorders_created
    }

    pub fn pending_prompts(&self) -> usize {
        self.shared.lock().unwrap().deferred.len()
    }
}

impl CaptureBackend for VirtualCamera {
    fn enumerate_devices(&self) -> Vec<CameraDevice> {
        self.shared.lock().unwrap().devices.clone()
    }

    fn acquire(&self, constraints: &MediaConstraints) -> BoxFuture<'static, BackendResult<MediaStream>> {
        let mut state = self.shared.lock().unwrap();
        state.acquisitions.push(constraints.clone());

        match state.permission {
            PermissionPrompt::Grant => {
                let result = open_stream(&mut state, constraints);
                futures::future::ready(result).boxed()
            }
            PermissionPrompt::Deny => {
                info!("Virtual permission prompt denied");
                futures::future::ready(Err(BackendError::PermissionDenied)).boxed()
            }
            PermissionPrompt::Deferred => {
                let (reply, response) = oneshot::channel();
                state.deferred.push_back(DeferredRequest {
                    constraints: constraints.clone(),
                    reply,
                });
                debug!(open = state.deferred.len(), "Virtual permission prompt waiting");
                async move {
                    response
                        .await
                        .unwrap_or_else(|_| Err(BackendError::Other("prompt dismissed".into())))
                }
                .boxed()
            }
        }
    }

    fn create_recorder(&self, stream: &MediaStream) -> BackendResult<Box<dyn MediaRecorder>> {
        let mut state = self.shared.lock().unwrap();
        if !state.recorder_available {
            return Err(BackendError::NotAvailable(
                "media recording is not supported".into(),
            ));
        }
        if !stream.video_track().is_some_and(|t| t.is_live()) {
            return Err(BackendError::Other("stream has no live video track".into()));
        }

        let (recorder, feed) = VirtualRecorder::new(
            self.shared.clone(),
            stream.clone(),
            RECORDING_MIME_TYPE.to_string(),
            state.timeslice,
            state.complete_on_stop,
        );
        state.latest_feed = Some(feed);
        state.recorders_created += 1;
        Ok(Box::new(recorder))
    }

    fn grab_frame(&self, stream: &MediaStream) -> Option<CameraFrame> {
        next_frame(&self.shared, stream)
    }

    fn name(&self) -> &'static str {
        "virtual"
    }
}

fn default_devices() -> Vec<CameraDevice> {
    vec![
        CameraDevice {
            name: "Virtual Front Camera".into(),
            facing: FacingMode::User,
            has_microphone: true,
        },
        CameraDevice {
            name: "Virtual Rear Camera".into(),
            facing: FacingMode::Environment,
            has_microphone: false,
        },
    ]
}

fn open_stream(
    state: &mut VirtualState,
    constraints: &MediaConstraints,
) -> BackendResult<MediaStream> {
    let wanted = constraints.video.facing_mode;
    let device = state
        .devices
        .iter()
        .find(|d| d.facing == wanted)
        .or_else(|| state.devices.first())
        .cloned()
        .ok_or_else(|| BackendError::DeviceNotFound("no cameras".into()))?;

    if device.facing != wanted {
        warn!(wanted = %wanted, using = %device.name, "No camera with requested facing mode");
    }

    let mut tracks = vec![MediaTrack::new(TrackKind::Video, device.name.clone())];
    if constraints.audio {
        // Microphones live next to the front camera
        let has_microphone = device.has_microphone
            || state.devices.iter().any(|d| d.has_microphone);
        if !has_microphone {
            return Err(BackendError::DeviceNotFound("no microphone".into()));
        }
        tracks.push(MediaTrack::new(
            TrackKind::Audio,
            format!("{} Microphone", device.name),
        ));
    }

    let width = constraints.video.width.max(1);
    let height = match constraints.video.aspect_ratio {
        Some(ratio) => ((width as f64 / ratio).round() as u32).max(1),
        None => constraints.video.height.max(1),
    };

    let stream = MediaStream::new(tracks);
    info!(
        device = %device.name,
        stream = %stream.id,
        width,
        height,
        "Virtual camera stream opened"
    );
    state.frame_sizes.insert(stream.id.clone(), (width, height));
    state.streams.push(stream.clone());
    Ok(stream)
}

pub(crate) fn next_frame(shared: &Shared, stream: &MediaStream) -> Option<CameraFrame> {
    let mut state = shared.lock().unwrap();
    if !state.frames_available || !stream.video_track().is_some_and(|t| t.is_live()) {
        return None;
    }
    let (width, height) = *state.frame_sizes.get(&stream.id)?;
    state.tick += 4;
    Some(color_bars(width, height, state.tick))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetConfig;
    use crate::backends::camera::RecorderEvent;
    use futures::StreamExt;

    fn constraints() -> MediaConstraints {
        MediaConstraints::from(&WidgetConfig::default())
    }

    #[tokio::test]
    async fn test_facing_hint_selects_device() {
        let camera = VirtualCamera::new();
        let mut rear = constraints();
        rear.video.facing_mode = FacingMode::Environment;
        rear.audio = false;

        let stream = camera.acquire(&rear).await.unwrap();
        assert_eq!(stream.video_track().unwrap().label, "Virtual Rear Camera");
    }

    #[tokio::test]
    async fn test_no_devices() {
        let camera = VirtualCamera::new();
        camera.set_devices(Vec::new());
        let err = camera.acquire(&constraints()).await.unwrap_err();
        assert!(matches!(err, BackendError::DeviceNotFound(_)));
    }

    #[tokio::test]
    async fn test_deferred_prompt() {
        let camera = VirtualCamera::new();
        camera.set_permission(PermissionPrompt::Deferred);

        let request = camera.acquire(&constraints());
        assert_eq!(camera.pending_prompts(), 1);
        assert!(camera.answer_prompt(true));
        assert!(!camera.answer_prompt(true));
        assert!(request.await.is_ok());
    }

    #[tokio::test]
    async fn test_frames_follow_aspect_ratio() {
        let camera = VirtualCamera::new();
        let stream = camera.acquire(&constraints()).await.unwrap();
        let frame = camera.grab_frame(&stream).unwrap();
        assert_eq!((frame.width, frame.height), (640, 427));

        stream.stop();
        assert!(camera.grab_frame(&stream).is_none());
    }

    #[tokio::test]
    async fn test_recorder_feed_then_stop() {
        let camera = VirtualCamera::new();
        let stream = camera.acquire(&constraints()).await.unwrap();
        let mut recorder = camera.create_recorder(&stream).unwrap();
        let mut events = recorder.start().unwrap();
        assert!(recorder.start().is_err());

        let feed = camera.latest_feed().unwrap();
        feed.push(vec![1u8, 2, 3]);
        recorder.stop().unwrap();
        assert!(recorder.stop().is_err());

        match events.next().await {
            Some(RecorderEvent::DataAvailable(fragment)) => assert_eq!(fragment.len(), 3),
            other => panic!("unexpected event {:?}", other),
        }
        assert_eq!(events.next().await, Some(RecorderEvent::Stopped));
        assert_eq!(events.next().await, None);
    }

    #[tokio::test]
    async fn test_dropped_recorder_ends_stream() {
        let camera = VirtualCamera::new();
        camera.set_complete_on_stop(false);
        let stream = camera.acquire(&constraints()).await.unwrap();

        let mut first = camera.create_recorder(&stream).unwrap();
        let mut events = first.start().unwrap();
        let feed = camera.latest_feed().unwrap();
        drop(first);

        assert!(!feed.push(vec![1u8]));
        assert_eq!(events.next().await, None);

        let _second = camera.create_recorder(&stream).unwrap();
        assert_eq!(camera.recorders_created(), 2);
        assert!(camera.latest_feed().unwrap().push(vec![1u8]));
    }

    #[tokio::test]
    async fn test_timeslice_emits_jpeg_fragments() {
        let camera = VirtualCamera::new();
        camera.set_timeslice(Some(Duration::from_millis(10)));
        let stream = camera.acquire(&constraints()).await.unwrap();
        let mut recorder = camera.create_recorder(&stream).unwrap();
        let mut events = recorder.start().unwrap();

        match events.next().await {
            Some(RecorderEvent::DataAvailable(fragment)) => {
                // JPEG SOI marker
                assert_eq!(&fragment.data[..2], &[0xFF, 0xD8]);
                assert_eq!(fragment.mime_type, RECORDING_MIME_TYPE);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_recorder_unavailable() {
        let camera = VirtualCamera::new();
        camera.set_recorder_available(false);
        let stream = camera.acquire(&constraints()).await.unwrap();
        assert!(matches!(
            camera.create_recorder(&stream),
            Err(BackendError::NotAvailable(_))
        ));
    }
}
