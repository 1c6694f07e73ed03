// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for the capture platform seam

use crate::config::{FacingMode, WidgetConfig};
use crate::media::Fragment;
use futures::stream::BoxStream;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Instant;

/// Kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

#[derive(Debug)]
struct TrackState {
    live: AtomicBool,
    stops: AtomicUsize,
}

/// One audio or video track of a live stream
///
/// Clones share state: stopping any clone ends the track for all of them.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    pub id: String,
    pub kind: TrackKind,
    /// Human-readable source name (device label)
    pub label: String,
    state: Arc<TrackState>,
}

impl MediaTrack {
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            label: label.into(),
            state: Arc::new(TrackState {
                live: AtomicBool::new(true),
                stops: AtomicUsize::new(0),
            }),
        }
    }

    /// Stop the track. Stopping an ended track does nothing.
    pub fn stop(&self) {
        if self.state.live.swap(false, Ordering::SeqCst) {
            self.state.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn is_live(&self) -> bool {
        self.state.live.load(Ordering::SeqCst)
    }

    /// How many times the track actually transitioned to ended (0 or 1)
    pub fn stop_count(&self) -> usize {
        self.state.stops.load(Ordering::SeqCst)
    }
}

/// A live capture stream as handed out by the platform
#[derive(Debug, Clone)]
pub struct MediaStream {
    pub id: String,
    pub tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            tracks,
        }
    }

    pub fn video_track(&self) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind == TrackKind::Video)
    }

    pub fn audio_track(&self) -> Option<&MediaTrack> {
        self.tracks.iter().find(|t| t.kind == TrackKind::Audio)
    }

    /// True while at least one track is live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(MediaTrack::is_live)
    }

    /// Stop every track of the stream
    pub fn stop(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }
}

/// Video part of the acquisition constraints
#[derive(Debug, Clone, PartialEq)]
pub struct VideoConstraints {
    pub facing_mode: FacingMode,
    pub aspect_ratio: Option<f64>,
    pub width: u32,
    pub height: u32,
}

/// What to ask the platform for when acquiring a stream
#[derive(Debug, Clone, PartialEq)]
pub struct MediaConstraints {
    pub video: VideoConstraints,
    pub audio: bool,
}

impl From<&WidgetConfig> for MediaConstraints {
    fn from(config: &WidgetConfig) -> Self {
        Self {
            video: VideoConstraints {
                facing_mode: config.facing_mode,
                aspect_ratio: config.aspect_ratio.as_ref().map(|r| r.value()),
                width: config.width,
                height: config.height,
            },
            audio: config.enable_audio,
        }
    }
}

/// An enumerated capture device
#[derive(Debug, Clone, PartialEq)]
pub struct CameraDevice {
    pub name: String,
    pub facing: FacingMode,
    pub has_microphone: bool,
}

/// Pixel format of a captured frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 4 bytes per pixel
    RGBA,
    /// 3 bytes per pixel
    RGB24,
    /// 1 byte per pixel
    Gray8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// A single video frame pulled from a live stream
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    pub format: PixelFormat,
    /// Bytes per row (may include padding)
    pub stride: u32,
    pub captured_at: Instant,
}

impl CameraFrame {
    /// RGB value at (x, y), clamped to the frame bounds
    pub fn sample_rgb(&self, x: u32, y: u32) -> (u8, u8, u8) {
        if self.width == 0 || self.height == 0 {
            return (0, 0, 0);
        }
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        let idx = y as usize * self.stride as usize
            + x as usize * self.format.bytes_per_pixel() as usize;

        match self.format {
            PixelFormat::RGBA | PixelFormat::RGB24 => {
                if idx + 2 < self.data.len() {
                    (self.data[idx], self.data[idx + 1], self.data[idx + 2])
                } else {
                    (0, 0, 0)
                }
            }
            PixelFormat::Gray8 => match self.data.get(idx) {
                Some(&v) => (v, v, v),
                None => (0, 0, 0),
            },
        }
    }

    /// Convert to a tightly packed RGBA buffer
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                let (r, g, b) = self.sample_rgb(x, y);
                let a = if self.format == PixelFormat::RGBA {
                    let idx = y as usize * self.stride as usize + x as usize * 4 + 3;
                    self.data.get(idx).copied().unwrap_or(255)
                } else {
                    255
                };
                out.extend_from_slice(&[r, g, b, a]);
            }
        }
        out
    }
}

/// Events delivered by a platform recorder, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub enum RecorderEvent {
    /// A chunk of encoded media
    DataAvailable(Fragment),
    /// The recorder finished; no more data follows
    Stopped,
    /// The recorder failed and will not produce a clip
    Error(String),
}

/// Stream of recorder events
pub type RecorderEvents = BoxStream<'static, RecorderEvent>;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, PartialEq)]
pub enum BackendError {
    /// The user or platform refused access
    PermissionDenied,
    /// Camera or microphone not found
    DeviceNotFound(String),
    /// Backend is not available on this system
    NotAvailable(String),
    /// Recording already in progress
    RecordingInProgress,
    /// No recording in progress
    NoRecordingInProgress,
    /// Other errors
    Other(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::PermissionDenied => write!(f, "Permission denied"),
            BackendError::DeviceNotFound(msg) => write!(f, "Device not found: {}", msg),
            BackendError::NotAvailable(msg) => write!(f, "Backend not available: {}", msg),
            BackendError::RecordingInProgress => write!(f, "Recording already in progress"),
            BackendError::NoRecordingInProgress => write!(f, "No recording in progress"),
            BackendError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_stop_is_idempotent() {
        let track = MediaTrack::new(TrackKind::Video, "cam");
        let clone = track.clone();
        track.stop();
        clone.stop();
        track.stop();
        assert!(!clone.is_live());
        assert_eq!(track.stop_count(), 1);
    }

    #[test]
    fn test_constraints_follow_config() {
        let config = WidgetConfig {
            enable_audio: false,
            aspect_ratio: None,
            facing_mode: FacingMode::Environment,
            ..WidgetConfig::default()
        };
        let constraints = MediaConstraints::from(&config);
        assert!(!constraints.audio);
        assert_eq!(constraints.video.aspect_ratio, None);
        assert_eq!(constraints.video.facing_mode, FacingMode::Environment);
    }

    #[test]
    fn test_gray_frame_to_rgba() {
        let frame = CameraFrame {
            width: 2,
            height: 1,
            data: Arc::from(vec![10u8, 200]),
            format: PixelFormat::Gray8,
            stride: 2,
            captured_at: Instant::now(),
        };
        assert_eq!(frame.to_rgba(), vec![10, 10, 10, 255, 200, 200, 200, 255]);
    }
}
