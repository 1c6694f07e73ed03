// SPDX-License-Identifier: GPL-3.0-only

//! Mode switching handlers

use crate::app::state::{CameraMode, CameraWidget};
use crate::app::task::Task;
use tracing::{debug, info, warn};

impl CameraWidget {
    pub(crate) fn handle_set_mode(&mut self, mode: CameraMode) -> Task {
        if self.mode == mode {
            debug!(mode = mode.display_name(), "Already in requested mode");
            return Task::none();
        }

        // Tear down the artifact that belongs to the mode being left
        match mode {
            CameraMode::Video => {
                if self.photo.take().is_some() {
                    debug!("Dropping photo on entering video mode");
                }
            }
            CameraMode::Photo => {
                if let Err(e) = self.recording.discard() {
                    warn!(error = %e, "Mode switch refused");
                    return Task::none();
                }
            }
        }

        info!(
            from = self.mode.display_name(),
            to = mode.display_name(),
            "Switching mode"
        );
        self.mode = mode;
        self.restart_session()
    }

    pub(crate) fn handle_toggle_mode(&mut self) -> Task {
        self.handle_set_mode(self.mode.other())
    }
}
