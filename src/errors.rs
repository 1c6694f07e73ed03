// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera widget

use crate::backends::camera::types::BackendError;
use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main widget error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Camera/microphone acquisition errors
    Camera(CameraError),
    /// Recording-related errors
    Recording(RecordingError),
    /// Photo capture errors
    Photo(PhotoError),
    /// Configuration errors
    Config(String),
    /// Storage/filesystem errors
    Storage(String),
}

/// Session acquisition errors
#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// The user (or platform policy) refused camera/microphone access
    PermissionDenied,
    /// No device satisfies the requested constraints
    DeviceNotFound,
    /// The permission prompt or stream acquisition did not complete in time
    Timeout,
    /// A newer acquisition or a release made this completion obsolete
    Superseded,
    /// Any other platform failure
    Backend(String),
}

/// Recording-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingError {
    /// No live session to record from
    NoSession,
    /// Recording already in progress
    AlreadyRecording,
    /// Stop requested while not recording
    NotRecording,
    /// Operation not valid in the current recorder state
    InvalidState(&'static str),
    /// The platform recorder could not be created or failed
    RecorderUnavailable(String),
    /// Recording stopped without any buffered data
    EmptyRecording,
    /// Recorder did not report completion in time
    Timeout,
}

/// Photo capture errors
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoError {
    /// No live session to capture from
    NoSession,
    /// No frame available for capture
    NoFrameAvailable,
    /// Encoding failed
    EncodingFailed(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Camera(e) => write!(f, "Camera error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Photo(e) => write!(f, "Photo error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::PermissionDenied => write!(f, "Permission to use the camera was denied"),
            CameraError::DeviceNotFound => write!(f, "No matching camera or microphone found"),
            CameraError::Timeout => write!(f, "Timed out waiting for the camera"),
            CameraError::Superseded => write!(f, "Acquisition superseded"),
            CameraError::Backend(msg) => write!(f, "Backend error: {}", msg),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::NoSession => write!(f, "No active camera session"),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::NotRecording => write!(f, "No recording in progress"),
            RecordingError::InvalidState(msg) => write!(f, "Invalid recorder state: {}", msg),
            RecordingError::RecorderUnavailable(msg) => write!(f, "Recorder unavailable: {}", msg),
            RecordingError::EmptyRecording => write!(f, "Recording contains no data"),
            RecordingError::Timeout => write!(f, "Timed out waiting for the recorder to finish"),
        }
    }
}

impl fmt::Display for PhotoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhotoError::NoSession => write!(f, "No active camera session"),
            PhotoError::NoFrameAvailable => write!(f, "No frame available for capture"),
            PhotoError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for CameraError {}
impl std::error::Error for RecordingError {}
impl std::error::Error for PhotoError {}

impl From<CameraError> for AppError {
    fn from(err: CameraError) -> Self {
        AppError::Camera(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<PhotoError> for AppError {
    fn from(err: PhotoError) -> Self {
        AppError::Photo(err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<BackendError> for CameraError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::PermissionDenied => CameraError::PermissionDenied,
            BackendError::DeviceNotFound(_) => CameraError::DeviceNotFound,
            other => CameraError::Backend(other.to_string()),
        }
    }
}

impl From<BackendError> for RecordingError {
    fn from(err: BackendError) -> Self {
        RecordingError::RecorderUnavailable(err.to_string())
    }
}

impl From<image::ImageError> for PhotoError {
    fn from(err: image::ImageError) -> Self {
        PhotoError::EncodingFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_map_to_taxonomy() {
        assert_eq!(
            CameraError::from(BackendError::PermissionDenied),
            CameraError::PermissionDenied
        );
        assert_eq!(
            CameraError::from(BackendError::DeviceNotFound("rear".into())),
            CameraError::DeviceNotFound
        );
        assert!(matches!(
            CameraError::from(BackendError::Other("boom".into())),
            CameraError::Backend(_)
        ));
    }

    #[test]
    fn test_display_is_prefixed_by_category() {
        let err = AppError::from(RecordingError::EmptyRecording);
        assert_eq!(err.to_string(), "Recording error: Recording contains no data");
    }
}
