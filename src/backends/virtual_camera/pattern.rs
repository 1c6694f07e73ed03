// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic test-pattern frames

use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::constants::MAX_DIMENSION;
use std::sync::Arc;
use std::time::Instant;

/// SMPTE-style colour bars (RGB)
const BARS: [(u8, u8, u8); 8] = [
    (235, 235, 235),
    (235, 235, 16),
    (16, 235, 235),
    (16, 235, 16),
    (235, 16, 235),
    (235, 16, 16),
    (16, 16, 235),
    (16, 16, 16),
];

/// Render colour bars scrolled horizontally by `tick` pixels
///
/// The bottom eighth is a luma ramp so scaling artifacts are visible.
pub fn color_bars(width: u32, height: u32, tick: u64) -> CameraFrame {
    let width = width.min(MAX_DIMENSION);
    let height = height.min(MAX_DIMENSION);
    let stride = width * 4;
    let mut data = Vec::with_capacity(stride as usize * height as usize);
    let ramp_start = height - height / 8;
    let bar_width = (width / BARS.len() as u32).max(1);

    for y in 0..height {
        for x in 0..width {
            let (r, g, b) = if y >= ramp_start {
                let v = ((x as u64 * 255) / width.max(1) as u64) as u8;
                (v, v, v)
            } else {
                let shifted = (x as u64 + tick) % width.max(1) as u64;
                let bar = ((shifted as u32 / bar_width) as usize).min(BARS.len() - 1);
                BARS[bar]
            };
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }

    CameraFrame {
        width,
        height,
        data: Arc::from(data),
        format: PixelFormat::RGBA,
        stride,
        captured_at: Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_layout() {
        let frame = color_bars(64, 48, 0);
        assert_eq!(frame.data.len(), 64 * 48 * 4);
        assert_eq!(frame.sample_rgb(0, 0), BARS[0]);
        assert_eq!(frame.sample_rgb(63, 0), BARS[7]);
        // Ramp row starts black
        assert_eq!(frame.sample_rgb(0, 47), (0, 0, 0));
    }

    #[test]
    fn test_size_is_clamped() {
        let frame = color_bars(40_000, 1, 0);
        assert_eq!(frame.width, MAX_DIMENSION);
        assert_eq!(frame.data.len(), MAX_DIMENSION as usize * 4);
    }

    #[test]
    fn test_tick_scrolls_bars() {
        let a = color_bars(64, 8, 0);
        let b = color_bars(64, 8, 8);
        assert_eq!(b.sample_rgb(0, 0), a.sample_rgb(8, 0));
    }
}
