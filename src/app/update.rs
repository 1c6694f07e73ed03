// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The `update()` function acts as a dispatcher; handlers live in the
//! `handlers` submodules organized by functional domain.
//!
//! # Handler Modules
//!
//! - `handlers::camera`: Session start/stop, acquisition completions
//! - `handlers::capture`: Photo capture, video recording, playback
//! - `handlers::ui`: Photo/video mode switching

use crate::app::state::{CameraWidget, Message};
use crate::app::task::Task;
use tracing::warn;

impl CameraWidget {
    /// Main message handler - routes messages to handler methods
    ///
    /// User actions are checked against [`CameraWidget::is_enabled`] first;
    /// a disabled action leaves the state unchanged.
    pub fn update(&mut self, message: Message) -> Task {
        if let Some(action) = message.action()
            && !self.is_enabled(action)
        {
            warn!(?action, mode = self.mode.display_name(), "Action not available");
            return Task::none();
        }

        let task = match message {
            // ===== Camera =====
            Message::StartCamera => self.handle_start_camera(),
            Message::StopCamera => self.handle_stop_camera(),
            Message::SessionAcquired { generation, result } => {
                self.handle_session_acquired(generation, result)
            }

            // ===== Recording =====
            Message::StartRecording => self.handle_start_recording(),
            Message::StopRecording => self.handle_stop_recording(),
            Message::Recorder { recording, event } => self.handle_recorder_event(recording, event),
            Message::FinalizeTimedOut { recording } => self.handle_finalize_timed_out(recording),
            Message::PlayRecording => self.handle_play_recording(),
            Message::PlaybackEnded { playback } => self.handle_playback_ended(playback),
            Message::DeleteRecording => self.handle_delete_recording(),

            // ===== Photo =====
            Message::CapturePhoto => self.handle_capture_photo(),
            Message::DeletePhoto => self.handle_delete_photo(),

            // ===== Mode =====
            Message::SetMode(mode) => self.handle_set_mode(mode),
            Message::ToggleMode => self.handle_toggle_mode(),
        };

        debug_assert!(
            !(self.photo.is_some() && self.recording.clip().is_some()),
            "photo and recording clip held at the same time"
        );

        task
    }
}
