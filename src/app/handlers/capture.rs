// SPDX-License-Identifier: GPL-3.0-only

//! Capture handlers
//!
//! Photo capture, video recording and playback of the recorded clip.

use crate::app::state::{CameraWidget, Message};
use crate::app::task::Task;
use crate::backends::camera::RecorderEvent;
use crate::errors::AppError;
use crate::pipelines::photo::PhotoCapture;
use std::time::Duration;
use tracing::{debug, error, info, warn};

impl CameraWidget {
    /// Deliver `message` after `delay`
    pub(crate) fn delay_task(delay: Duration, message: Message) -> Task {
        Task::perform(
            async move {
                tokio::time::sleep(delay).await;
                message
            },
            |message| message,
        )
    }

    // =========================================================================
    // Photo Capture Handlers
    // =========================================================================

    pub(crate) fn handle_capture_photo(&mut self) -> Task {
        let result = PhotoCapture::capture(
            self.sessions.backend().as_ref(),
            self.sessions.session(),
            self.config.width,
            self.config.height,
        );

        match result {
            Ok(photo) => {
                info!(
                    width = photo.width,
                    height = photo.height,
                    bytes = photo.png.len(),
                    "Photo captured"
                );
                if self.photo.replace(photo).is_some() {
                    debug!("Replaced previous photo");
                }
                self.last_error = None;
            }
            Err(e) => {
                error!(error = %e, "Photo capture failed");
                self.last_error = Some(AppError::Photo(e));
            }
        }
        Task::none()
    }

    pub(crate) fn handle_delete_photo(&mut self) -> Task {
        if self.photo.take().is_some() {
            info!("Photo deleted");
        }
        self.restart_session()
    }

    // =========================================================================
    // Video Recording Handlers
    // =========================================================================

    pub(crate) fn handle_start_recording(&mut self) -> Task {
        let result = self
            .recording
            .start(self.sessions.backend().as_ref(), self.sessions.session());

        match result {
            Ok((recording, events)) => {
                self.last_error = None;
                Task::run(events, move |event| Message::Recorder { recording, event })
            }
            Err(e) => {
                error!(error = %e, "Failed to start recording");
                self.last_error = Some(AppError::Recording(e));
                Task::none()
            }
        }
    }

    pub(crate) fn handle_stop_recording(&mut self) -> Task {
        match self.recording.stop() {
            Ok(recording) => {
                Self::delay_task(self.finalize_timeout, Message::FinalizeTimedOut { recording })
            }
            Err(e) => {
                if self.recording.is_idle() {
                    // Recorder failed to stop and was dropped
                    self.last_error = Some(AppError::Recording(e));
                }
                Task::none()
            }
        }
    }

    pub(crate) fn handle_recorder_event(&mut self, recording: u64, event: RecorderEvent) -> Task {
        match event {
            RecorderEvent::DataAvailable(fragment) => {
                self.recording.on_fragment(recording, fragment);
            }
            RecorderEvent::Stopped => match self.recording.on_stopped(recording) {
                Ok(Some(clip)) => {
                    info!(bytes = clip.size(), url = %clip.url, "Clip ready for playback");
                    self.last_error = None;
                }
                Ok(None) => {}
                Err(e) => {
                    self.last_error = Some(AppError::Recording(e));
                }
            },
            RecorderEvent::Error(message) => {
                if let Err(e) = self.recording.on_error(recording, &message) {
                    self.last_error = Some(AppError::Recording(e));
                }
            }
        }
        Task::none()
    }

    pub(crate) fn handle_finalize_timed_out(&mut self, recording: u64) -> Task {
        if let Err(e) = self.recording.on_timeout(recording) {
            self.last_error = Some(AppError::Recording(e));
        }
        Task::none()
    }

    // =========================================================================
    // Playback Handlers
    // =========================================================================

    pub(crate) fn handle_play_recording(&mut self) -> Task {
        let Some(clip) = self.recording.clip() else {
            return Task::none();
        };

        info!(url = %clip.url, "Playing recording");
        let duration = clip.duration;
        let url = clip.url.clone();
        self.sessions.preview_mut().bind_playback(&url);
        self.is_playing = true;
        self.playback += 1;

        Self::delay_task(
            duration,
            Message::PlaybackEnded {
                playback: self.playback,
            },
        )
    }

    pub(crate) fn handle_playback_ended(&mut self, playback: u64) -> Task {
        if !self.is_playing || playback != self.playback {
            debug!(playback, current = self.playback, "Ignoring stale playback end");
            return Task::none();
        }
        debug!("Playback finished");
        self.is_playing = false;
        self.sessions.rebind_preview();
        Task::none()
    }

    pub(crate) fn handle_delete_recording(&mut self) -> Task {
        match self.recording.discard() {
            Ok(true) => info!("Recording deleted"),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Cannot delete recording");
                return Task::none();
            }
        }
        self.restart_session()
    }
}
