// SPDX-License-Identifier: GPL-3.0-only

//! Camera session handlers
//!
//! Starting, stopping and restarting the live session, and applying
//! acquisition completions.

use crate::app::state::{CameraWidget, Message};
use crate::app::task::Task;
use crate::backends::camera::MediaStream;
use crate::errors::{AppError, CameraError};
use tracing::{debug, error, info};

impl CameraWidget {
    // =========================================================================
    // Camera Session Handlers
    // =========================================================================

    /// Drop the current session (if any) and request a fresh one
    pub(crate) fn restart_session(&mut self) -> Task {
        self.is_playing = false;
        let (generation, request) = self.sessions.begin_acquire(&self.config);
        Task::perform(request, move |result| Message::SessionAcquired {
            generation,
            result,
        })
    }

    pub(crate) fn handle_start_camera(&mut self) -> Task {
        info!("Starting camera");
        self.restart_session()
    }

    pub(crate) fn handle_stop_camera(&mut self) -> Task {
        if self.sessions.release() {
            info!("Camera stopped");
        }
        self.is_playing = false;
        Task::none()
    }

    pub(crate) fn handle_session_acquired(
        &mut self,
        generation: u64,
        result: Result<MediaStream, CameraError>,
    ) -> Task {
        match self.sessions.finish_acquire(generation, result) {
            Ok(_) => {
                self.last_error = None;
            }
            Err(CameraError::Superseded) => {
                debug!(generation, "Acquisition superseded");
            }
            Err(e) => {
                error!(generation, error = %e, "Camera unavailable");
                self.last_error = Some(AppError::Camera(e));
            }
        }
        Task::none()
    }
}
