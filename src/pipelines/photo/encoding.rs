// SPDX-License-Identifier: MPL-2.0

//! Off-screen surface rendering and PNG encoding

use crate::backends::camera::types::CameraFrame;
use crate::constants::MAX_DIMENSION;
use crate::errors::PhotoError;
use base64::Engine;
use image::RgbaImage;
use image::imageops::FilterType;

/// Draw a frame onto a `width`×`height` surface, scaling to fill it
pub fn render_to_surface(
    frame: &CameraFrame,
    width: u32,
    height: u32,
) -> Result<RgbaImage, PhotoError> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(PhotoError::EncodingFailed(format!(
            "surface size {}x{} out of range",
            width, height
        )));
    }

    let image = RgbaImage::from_raw(frame.width, frame.height, frame.to_rgba()).ok_or_else(
        || PhotoError::EncodingFailed("frame buffer does not match its size".into()),
    )?;

    if image.width() == width && image.height() == height {
        return Ok(image);
    }

    Ok(image::imageops::resize(&image, width, height, FilterType::Triangle))
}

/// Encode a surface as PNG
pub fn encode_png(surface: &RgbaImage) -> Result<Vec<u8>, PhotoError> {
    let mut buffer = Vec::new();

    surface.write_to(
        &mut std::io::Cursor::new(&mut buffer),
        image::ImageFormat::Png,
    )?;

    Ok(buffer)
}

/// Wrap encoded bytes as a `data:` URL
pub fn to_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}
