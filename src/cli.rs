// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for camera operations
//!
//! This module provides command-line functionality for:
//! - Listing available cameras
//! - Taking photos
//! - Recording videos
//!
//! Every command drives a real widget instance, so the same enabling rules
//! and state transitions apply as in the interactive front end.

use camera_widget::app::{CameraMode, CameraWidget, Message, Runtime};
use camera_widget::backends::camera::CaptureBackend;
use camera_widget::backends::virtual_camera::VirtualCamera;
use camera_widget::constants::{ACQUIRE_TIMEOUT, FINALIZE_TIMEOUT, virtual_camera::TIMESLICE};
use camera_widget::pipelines::video::RecorderPhase;
use camera_widget::{WidgetConfig, storage};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// List all available cameras
pub fn list_devices() -> Result<(), Box<dyn std::error::Error>> {
    let backend = camera_widget::backends::camera::get_backend();
    let devices = backend.enumerate_devices();

    if devices.is_empty() {
        println!("No cameras found.");
        return Ok(());
    }

    println!("Available cameras ({} backend):", backend.name());
    println!();
    for (index, device) in devices.iter().enumerate() {
        println!("  [{}] {}", index, device.name);
        println!("      Facing: {}", device.facing);
        if device.has_microphone {
            println!("      Microphone: yes");
        }
        println!();
    }

    Ok(())
}

/// Take a photo and save it as PNG
pub async fn take_photo(
    config: WidgetConfig,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend = camera_widget::backends::camera::get_backend();
    let (mut widget, mut runtime) = start_widget(config, backend).await?;

    println!(
        "Capture size: {}x{}",
        widget.config().width,
        widget.config().height
    );
    runtime.dispatch(&mut widget, Message::CapturePhoto);
    if let Some(e) = widget.last_error() {
        return Err(e.clone().into());
    }

    let photo = widget.photo().ok_or("No photo captured")?;
    let path = storage::save_photo(photo, output.as_deref())?;
    println!("Photo saved: {}", path.display());

    Ok(())
}

/// Record a clip of `duration` seconds and save it
pub async fn record_video(
    config: WidgetConfig,
    duration: u64,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let camera = VirtualCamera::new();
    camera.set_timeslice(Some(TIMESLICE));
    let (mut widget, mut runtime) = start_widget(config, Arc::new(camera)).await?;

    // Entering video mode restarts the session
    runtime.dispatch(&mut widget, Message::SetMode(CameraMode::Video));
    wait_for_session(&mut widget, &mut runtime).await?;

    println!("Duration: {} seconds", duration);
    if widget.config().enable_audio {
        println!("Audio: enabled");
    }

    runtime.dispatch(&mut widget, Message::StartRecording);
    if let Some(e) = widget.last_error() {
        return Err(e.clone().into());
    }

    println!();
    println!("Recording... (press Ctrl+C to stop early)");

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let start = Instant::now();
    let target_duration = Duration::from_secs(duration);

    while start.elapsed() < target_duration
        && matches!(widget.recording_phase(), RecorderPhase::Recording { .. })
    {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                println!("Stopping early...");
                break;
            }
            _ = runtime.run_for(&mut widget, Duration::from_millis(100)) => {}
        }

        let elapsed = start.elapsed().as_secs();
        print!("\rRecording: {:02}:{:02}", elapsed / 60, elapsed % 60);
        std::io::Write::flush(&mut std::io::stdout())?;
    }
    println!();

    runtime.dispatch(&mut widget, Message::StopRecording);
    runtime
        .run_until(&mut widget, FINALIZE_TIMEOUT + Duration::from_secs(1), |w| {
            matches!(
                w.recording_phase(),
                RecorderPhase::Ready { .. } | RecorderPhase::Idle
            )
        })
        .await;

    let Some(clip) = widget.clip() else {
        return match widget.last_error() {
            Some(e) => Err(e.clone().into()),
            None => Err("Recording produced no clip".into()),
        };
    };

    println!(
        "Recorded {} fragments, {} bytes, {:.1}s",
        clip.fragments,
        clip.size(),
        clip.duration.as_secs_f64()
    );
    let path = storage::save_clip(clip, output.as_deref())?;
    println!("Video saved: {}", path.display());

    Ok(())
}

/// Mount a widget and wait for its first session
async fn start_widget(
    config: WidgetConfig,
    backend: Arc<dyn CaptureBackend>,
) -> Result<(CameraWidget, Runtime), Box<dyn std::error::Error>> {
    let (mut widget, task) = CameraWidget::mount(config, backend);
    let mut runtime = Runtime::new();
    runtime.spawn(task);

    wait_for_session(&mut widget, &mut runtime).await?;
    Ok((widget, runtime))
}

async fn wait_for_session(
    widget: &mut CameraWidget,
    runtime: &mut Runtime,
) -> Result<(), Box<dyn std::error::Error>> {
    let settled = runtime
        .run_until(widget, ACQUIRE_TIMEOUT, |w| {
            !w.is_acquiring() && (w.session().is_some() || w.last_error().is_some())
        })
        .await;

    if let Some(e) = widget.last_error() {
        return Err(e.clone().into());
    }
    if !settled {
        return Err("Timed out waiting for camera".into());
    }

    if let Some(track) = widget.session().and_then(|s| s.stream().video_track()) {
        println!("Using camera: {}", track.label);
    }
    Ok(())
}
