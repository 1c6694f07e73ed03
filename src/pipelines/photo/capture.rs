// SPDX-License-Identifier: MPL-2.0

//! Photo capture from the live session
//!
//! Grabs a single frame without interrupting the preview stream.

use super::Photo;
use super::encoding::{encode_png, render_to_surface, to_data_url};
use crate::backends::camera::{CaptureBackend, Session};
use crate::constants::PHOTO_MIME_TYPE;
use crate::errors::PhotoError;
use std::sync::Arc;
use tracing::{debug, info};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Snapshot the current frame of `session` at `width`×`height`
    ///
    /// # Returns
    /// * `Ok(Photo)` - Encoded snapshot
    /// * `Err(PhotoError::NoSession)` - No live session
    /// * `Err(PhotoError::NoFrameAvailable)` - Video not bound or no frame yet
    pub fn capture(
        backend: &dyn CaptureBackend,
        session: Option<&Session>,
        width: u32,
        height: u32,
    ) -> Result<Photo, PhotoError> {
        let session = session.ok_or(PhotoError::NoSession)?;
        if !session.has_video() {
            return Err(PhotoError::NoFrameAvailable);
        }

        info!("Capturing photo from live session");

        let frame = backend
            .grab_frame(session.stream())
            .ok_or(PhotoError::NoFrameAvailable)?;

        debug!(
            width = frame.width,
            height = frame.height,
            format = ?frame.format,
            "Frame grabbed from stream"
        );

        let surface = render_to_surface(&frame, width, height)?;
        let png = encode_png(&surface)?;
        let data_url = to_data_url(PHOTO_MIME_TYPE, &png);

        debug!(bytes = png.len(), "Photo encoded");

        Ok(Photo {
            data_url,
            png: Arc::from(png),
            width,
            height,
            taken_at: chrono::Local::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::SessionManager;
    use crate::backends::virtual_camera::VirtualCamera;
    use crate::config::WidgetConfig;

    #[tokio::test]
    async fn test_capture_uses_configured_size() {
        let camera = VirtualCamera::new();
        let config = WidgetConfig {
            width: 160,
            height: 120,
            ..WidgetConfig::default()
        };
        let mut sessions = SessionManager::new(Arc::new(camera.clone()), &config);
        sessions.acquire(&config).await.unwrap();

        let photo = PhotoCapture::capture(&camera, sessions.session(), 160, 120).unwrap();
        assert_eq!((photo.width, photo.height), (160, 120));
        assert!(photo.data_url.starts_with("data:image/png;base64,"));
        let decoded = image::load_from_memory(&photo.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (160, 120));
    }

    #[test]
    fn test_capture_without_session() {
        let camera = VirtualCamera::new();
        let err = PhotoCapture::capture(&camera, None, 10, 10).unwrap_err();
        assert_eq!(err, PhotoError::NoSession);
    }

    #[tokio::test]
    async fn test_capture_without_frame() {
        let camera = VirtualCamera::new();
        camera.set_frames_available(false);
        let config = WidgetConfig::default();
        let mut sessions = SessionManager::new(Arc::new(camera.clone()), &config);
        sessions.acquire(&config).await.unwrap();

        let err = PhotoCapture::capture(&camera, sessions.session(), 10, 10).unwrap_err();
        assert_eq!(err, PhotoError::NoFrameAvailable);
    }
}
