// SPDX-License-Identifier: GPL-3.0-only

//! Widget state management

use crate::backends::camera::{MediaStream, RecorderEvent, SessionManager};
use crate::config::WidgetConfig;
use crate::errors::{AppError, CameraError};
use crate::media::ObjectUrlRegistry;
use crate::pipelines::photo::Photo;
use crate::pipelines::video::RecordingController;
use std::time::Duration;

/// Capture mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraMode {
    #[default]
    Photo,
    Video,
}

impl CameraMode {
    /// The mode a toggle switches to
    pub fn other(self) -> Self {
        match self {
            CameraMode::Photo => CameraMode::Video,
            CameraMode::Video => CameraMode::Photo,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CameraMode::Photo => "Photo",
            CameraMode::Video => "Video",
        }
    }
}

/// Snapshot of what the view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub mode: CameraMode,
    /// Recording or waiting for the recorder to finish
    pub is_recording: bool,
    pub is_playing: bool,
    pub has_recording_ready: bool,
    pub has_photo_ready: bool,
}

/// User actions and platform completions
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Camera =====
    /// Acquire a (fresh) session
    StartCamera,
    /// Release the session
    StopCamera,
    /// Acquisition completed
    SessionAcquired {
        generation: u64,
        result: Result<MediaStream, CameraError>,
    },

    // ===== Recording =====
    StartRecording,
    StopRecording,
    /// Event from the platform recorder of recording `recording`
    Recorder {
        recording: u64,
        event: RecorderEvent,
    },
    /// Finalization deadline of recording `recording` passed
    FinalizeTimedOut { recording: u64 },
    PlayRecording,
    /// Playback `playback` of the clip reached its end
    PlaybackEnded { playback: u64 },
    DeleteRecording,

    // ===== Photo =====
    CapturePhoto,
    DeletePhoto,

    // ===== Mode =====
    SetMode(CameraMode),
    ToggleMode,
}

/// The camera widget model
///
/// Holds at most one of {photo, recording clip} at a time.
pub struct CameraWidget {
    /// Mount options
    pub(crate) config: WidgetConfig,
    pub(crate) mode: CameraMode,
    pub(crate) sessions: SessionManager,
    pub(crate) recording: RecordingController,
    pub(crate) photo: Option<Photo>,
    /// Preview surface is showing the clip
    pub(crate) is_playing: bool,
    /// Bumped on every play; stale end-of-playback timers carry an older value
    pub(crate) playback: u64,
    /// Most recent failure, cleared by the next success
    pub(crate) last_error: Option<AppError>,
    pub(crate) urls: ObjectUrlRegistry,
    pub(crate) finalize_timeout: Duration,
}

impl std::fmt::Debug for CameraWidget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraWidget")
            .field("mode", &self.mode)
            .field("sessions", &self.sessions)
            .field("recording", &self.recording)
            .field("photo", &self.photo.is_some())
            .field("is_playing", &self.is_playing)
            .field("last_error", &self.last_error)
            .finish()
    }
}
