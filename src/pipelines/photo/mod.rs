// SPDX-License-Identifier: MPL-2.0

//! Photo snapshot pipeline
//!
//! ```text
//! Live stream → Grab frame → Draw onto off-screen surface → PNG → data: URL
//! ```
//!
//! The off-screen surface has the widget's configured size, so the frame is
//! scaled to fit it regardless of what resolution the camera delivered.

pub mod capture;
pub mod encoding;

pub use capture::PhotoCapture;
pub use encoding::{encode_png, render_to_surface, to_data_url};

use chrono::{DateTime, Local};
use std::sync::Arc;

/// A still image taken from the live preview
#[derive(Debug, Clone)]
pub struct Photo {
    /// `data:image/png;base64,...` reference for display
    pub data_url: String,
    /// Encoded PNG bytes
    pub png: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    pub taken_at: DateTime<Local>,
}
