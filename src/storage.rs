// SPDX-License-Identifier: MPL-2.0

//! Storage utilities for saving photos and clips

use crate::constants::APP_DIR_NAME;
use crate::errors::AppResult;
use crate::pipelines::photo::Photo;
use crate::pipelines::video::Clip;
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory photos are saved to (~/Pictures/camera-widget)
pub fn photo_directory() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// Directory clips are saved to (~/Videos/camera-widget)
pub fn video_directory() -> PathBuf {
    dirs::video_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

/// File extension for a recorded container type
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    // Strip codec parameters, e.g. "video/webm;codecs=vp8"
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    match essence {
        "video/webm" | "audio/webm" => "webm",
        "video/mp4" => "mp4",
        "video/x-matroska" => "mkv",
        "video/x-motion-jpeg" => "mjpeg",
        "image/png" => "png",
        _ => "bin",
    }
}

pub fn photo_filename() -> String {
    format!("IMG_{}.png", Local::now().format("%Y%m%d_%H%M%S"))
}

pub fn clip_filename(mime_type: &str) -> String {
    format!(
        "VID_{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        extension_for_mime(mime_type)
    )
}

/// Save a photo's PNG bytes
///
/// Without `output` the photo goes into [`photo_directory`] under a
/// timestamped name.
pub fn save_photo(photo: &Photo, output: Option<&Path>) -> AppResult<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => photo_directory().join(photo_filename()),
    };
    write_file(&path, &photo.png)?;
    info!(path = %path.display(), bytes = photo.png.len(), "Photo saved");
    Ok(path)
}

/// Save a clip's bytes
pub fn save_clip(clip: &Clip, output: Option<&Path>) -> AppResult<PathBuf> {
    let path = match output {
        Some(path) => path.to_path_buf(),
        None => video_directory().join(clip_filename(&clip.blob.mime_type)),
    };
    write_file(&path, &clip.blob.data)?;
    info!(path = %path.display(), bytes = clip.size(), "Clip saved");
    Ok(path)
}

fn write_file(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
        debug!(path = %parent.display(), "Output directory ready");
    }
    std::fs::write(path, bytes)?;
    Ok(())
}
