// SPDX-License-Identifier: GPL-3.0-only

//! Widget-wide constants

use std::time::Duration;

/// Default preview/snapshot width (matches the demo mount)
pub const DEFAULT_WIDTH: u32 = 640;

/// Default preview/snapshot height
pub const DEFAULT_HEIGHT: u32 = 480;

/// Largest accepted preview/snapshot width or height
pub const MAX_DIMENSION: u32 = 8192;

/// Default aspect ratio hint passed to acquisition
pub const DEFAULT_ASPECT_RATIO: &str = "1.5:1";

/// Upper bound for the permission prompt plus stream acquisition
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Upper bound between `stop()` and the recorder's completion callback
pub const FINALIZE_TIMEOUT: Duration = Duration::from_secs(5);

/// Encoding used for photo snapshots
pub const PHOTO_MIME_TYPE: &str = "image/png";

/// Container reported by recorders that do not tag their fragments
pub const DEFAULT_RECORDING_MIME_TYPE: &str = "video/webm";

/// Prefix for object URLs handed out by the registry
pub const OBJECT_URL_PREFIX: &str = "blob:camera-widget/";

/// Directory name used below the user's config/picture/video directories
pub const APP_DIR_NAME: &str = "camera-widget";

/// Virtual camera timing
pub mod virtual_camera {
    use std::time::Duration;

    /// Interval between synthetic recorder fragments
    pub const TIMESLICE: Duration = Duration::from_millis(250);

    /// JPEG quality for synthetic recorder fragments
    pub const FRAGMENT_JPEG_QUALITY: u8 = 70;

    /// Container reported by the virtual recorder
    pub const RECORDING_MIME_TYPE: &str = "video/x-motion-jpeg";
}

/// Terminal UI timing
pub mod terminal {
    use std::time::Duration;

    /// Frame interval for the terminal render loop
    pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);
}

/// Get the short label for a resolution width (e.g. "HD")
pub fn get_resolution_label(width: u32) -> Option<&'static str> {
    match width {
        w if w >= 3840 => Some("4K"),
        w if w >= 2560 => Some("2K"),
        w if w >= 1920 => Some("FHD"),
        w if w >= 1280 => Some("HD"),
        w if w >= 640 => Some("SD"),
        _ => None,
    }
}

/// Application information utilities
pub mod app_info {
    /// Get the application version from build-time environment
    pub fn version() -> &'static str {
        env!("GIT_VERSION")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_labels() {
        assert_eq!(get_resolution_label(3840), Some("4K"));
        assert_eq!(get_resolution_label(1280), Some("HD"));
        assert_eq!(get_resolution_label(640), Some("SD"));
        assert_eq!(get_resolution_label(320), None);
    }
}
