// SPDX-License-Identifier: MPL-2.0

//! Capture controls
//!
//! Each button of the widget maps to one [`Action`]. Whether it is enabled
//! is decided here, and the same predicate gates the matching message in
//! `update`, so a disabled button can never act.

use super::state::{CameraMode, CameraWidget, Message};

/// A user-triggerable widget action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    StartCamera,
    StopCamera,
    StartRecording,
    StopRecording,
    PlayRecording,
    DeleteRecording,
    CapturePhoto,
    DeletePhoto,
    SwitchMode,
}

impl Action {
    /// Message sent when the action's button is pressed
    pub fn message(self) -> Message {
        match self {
            Action::StartCamera => Message::StartCamera,
            Action::StopCamera => Message::StopCamera,
            Action::StartRecording => Message::StartRecording,
            Action::StopRecording => Message::StopRecording,
            Action::PlayRecording => Message::PlayRecording,
            Action::DeleteRecording => Message::DeleteRecording,
            Action::CapturePhoto => Message::CapturePhoto,
            Action::DeletePhoto => Message::DeletePhoto,
            Action::SwitchMode => Message::ToggleMode,
        }
    }
}

impl Message {
    /// The user action behind this message, if it is one
    pub fn action(&self) -> Option<Action> {
        match self {
            Message::StartCamera => Some(Action::StartCamera),
            Message::StopCamera => Some(Action::StopCamera),
            Message::StartRecording => Some(Action::StartRecording),
            Message::StopRecording => Some(Action::StopRecording),
            Message::PlayRecording => Some(Action::PlayRecording),
            Message::DeleteRecording => Some(Action::DeleteRecording),
            Message::CapturePhoto => Some(Action::CapturePhoto),
            Message::DeletePhoto => Some(Action::DeletePhoto),
            Message::SetMode(_) | Message::ToggleMode => Some(Action::SwitchMode),
            Message::SessionAcquired { .. }
            | Message::Recorder { .. }
            | Message::FinalizeTimedOut { .. }
            | Message::PlaybackEnded { .. } => None,
        }
    }
}

impl CameraWidget {
    /// Whether the button for `action` is enabled in the current state
    pub fn is_enabled(&self, action: Action) -> bool {
        let busy = self.recording.is_busy();
        let has_session = self.sessions.has_session();

        match action {
            Action::StartCamera => !busy,
            Action::StopCamera => has_session && !busy,
            Action::StartRecording => {
                self.mode == CameraMode::Video
                    && has_session
                    && self.recording.is_idle()
                    && !self.is_playing
            }
            Action::StopRecording => self.recording.is_recording(),
            Action::PlayRecording => self.recording.clip().is_some() && !self.is_playing,
            Action::DeleteRecording => self.recording.clip().is_some(),
            Action::CapturePhoto => {
                self.mode == CameraMode::Photo && has_session && !busy && !self.is_playing
            }
            Action::DeletePhoto => self.photo.is_some(),
            Action::SwitchMode => !busy,
        }
    }
}
