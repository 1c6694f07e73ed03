// SPDX-License-Identifier: GPL-3.0-only

//! View model
//!
//! Describes what the widget shows without tying it to a toolkit; the
//! terminal front end renders it.

use super::controls::Action;
use super::state::{CameraMode, CameraWidget};
use crate::media::PreviewSource;

/// One button of the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub action: Action,
    pub label: &'static str,
    pub enabled: bool,
}

/// Everything the widget renders
#[derive(Debug, Clone)]
pub struct View {
    pub mode: CameraMode,
    pub width: u32,
    pub height: u32,
    /// What the video element shows
    pub preview: PreviewSource,
    pub muted: bool,
    /// Red dot while recording or finalizing
    pub recording_indicator: bool,
    pub recording_secs: u64,
    /// Snapshot shown below the preview
    pub photo_url: Option<String>,
    pub error: Option<String>,
    pub buttons: Vec<Button>,
}

impl View {
    pub fn button(&self, action: Action) -> Option<&Button> {
        self.buttons.iter().find(|b| b.action == action)
    }
}

impl CameraWidget {
    /// Build the view model for the current state
    pub fn view(&self) -> View {
        let state = self.view_state();
        let mut actions = vec![Action::StartCamera, Action::StopCamera, Action::SwitchMode];

        match self.mode {
            CameraMode::Photo => {
                actions.push(Action::CapturePhoto);
                if state.has_photo_ready {
                    actions.push(Action::DeletePhoto);
                }
            }
            CameraMode::Video => {
                actions.push(Action::StartRecording);
                actions.push(Action::StopRecording);
                if state.has_recording_ready && !state.is_recording {
                    actions.push(Action::PlayRecording);
                    actions.push(Action::DeleteRecording);
                }
            }
        }

        let buttons = actions
            .into_iter()
            .map(|action| Button {
                action,
                label: self.label(action),
                enabled: self.is_enabled(action),
            })
            .collect();

        let preview = self.sessions.preview();
        View {
            mode: self.mode,
            width: preview.width,
            height: preview.height,
            preview: preview.source().clone(),
            muted: preview.muted,
            recording_indicator: state.is_recording,
            recording_secs: self.recording.elapsed_secs(),
            photo_url: self.photo.as_ref().map(|p| p.data_url.clone()),
            error: self.last_error.as_ref().map(|e| e.to_string()),
            buttons,
        }
    }

    fn label(&self, action: Action) -> &'static str {
        match action {
            Action::StartCamera => "Start Camera",
            Action::StopCamera => "Stop Camera",
            Action::StartRecording if self.recording.is_busy() => "Recording...",
            Action::StartRecording => "Start Recording",
            Action::StopRecording => "Stop Recording",
            Action::PlayRecording => "Play Video",
            Action::DeleteRecording => "Delete Video",
            Action::CapturePhoto => "Take Photo",
            Action::DeletePhoto => "Delete Photo",
            Action::SwitchMode => match self.mode {
                CameraMode::Photo => "Switch to Video",
                CameraMode::Video => "Switch to Photo",
            },
        }
    }
}
