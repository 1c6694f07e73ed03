// SPDX-License-Identifier: GPL-3.0-only

//! Terminal front end for the camera widget
//!
//! Renders the widget's preview to the terminal using Unicode half-block
//! characters, with a status bar listing the widget's buttons and the keys
//! that press them.

use crate::app::{Action, CameraMode, CameraWidget, Runtime, View};
use crate::backends::camera::types::{CameraFrame, PixelFormat};
use crate::backends::virtual_camera::VirtualCamera;
use crate::config::WidgetConfig;
use crate::constants::get_resolution_label;
use crate::constants::terminal::FRAME_INTERVAL;
use crate::constants::virtual_camera::TIMESLICE;
use crate::media::PreviewSource;
use crate::pipelines::photo::Photo;
use crate::storage;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Run the terminal camera widget
pub async fn run(config: WidgetConfig) -> Result<(), Box<dyn std::error::Error>> {
    let camera = VirtualCamera::new();
    camera.set_timeslice(Some(TIMESLICE));

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, config, camera).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: WidgetConfig,
    camera: VirtualCamera,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut widget, task) = CameraWidget::mount(config, Arc::new(camera));
    let mut runtime = Runtime::new();
    runtime.spawn(task);

    let mut preview = FrameWidget::new();
    let mut snapshot = FrameWidget::new();
    let mut snapshot_taken: Option<chrono::DateTime<chrono::Local>> = None;
    let mut status_message: Option<String> = None;

    loop {
        runtime.run_until_stalled(&mut widget);
        let view = widget.view();

        match &view.preview {
            PreviewSource::Live { .. } => {
                if let Some(frame) = widget
                    .session()
                    .and_then(|s| widget.backend().grab_frame(s.stream()))
                {
                    preview.update_frame(frame);
                }
            }
            PreviewSource::Playback { .. } => preview.clear("Playing recording..."),
            PreviewSource::Empty => preview.clear("Camera stopped"),
        }

        // Decode the snapshot once per photo
        match widget.photo() {
            Some(photo) if snapshot_taken != Some(photo.taken_at) => {
                snapshot_taken = Some(photo.taken_at);
                match photo_frame(photo) {
                    Some(frame) => snapshot.update_frame(frame),
                    None => snapshot.clear("Unreadable photo"),
                }
            }
            Some(_) => {}
            None => snapshot_taken = None,
        }

        terminal.draw(|f| {
            let area = f.area();

            // Reserve the bottom two lines for the status bar
            let content_area = Rect {
                height: area.height.saturating_sub(2),
                ..area
            };

            if snapshot_taken.is_some() {
                let half = content_area.width / 2;
                let left = Rect {
                    width: half,
                    ..content_area
                };
                let right = Rect {
                    x: content_area.x + half,
                    width: content_area.width - half,
                    ..content_area
                };
                f.render_widget(&preview, left);
                f.render_widget(&snapshot, right);
            } else {
                f.render_widget(&preview, content_area);
            }

            let status_area = Rect {
                x: area.x,
                y: area.height.saturating_sub(2),
                width: area.width,
                height: 2,
            };
            f.render_widget(
                StatusBar {
                    view: &view,
                    message: status_message.as_deref(),
                },
                status_area,
            );
        })?;

        if event::poll(Duration::ZERO)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            // Ctrl+C to quit
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }

            match key.code {
                KeyCode::Char('q') => break,
                KeyCode::Char('s') => {
                    status_message = Some(save_artifact(&widget));
                }
                KeyCode::Char(c) => {
                    if let Some(action) = key_action(c, &widget) {
                        status_message = press(&mut runtime, &mut widget, &view, action);
                    }
                }
                _ => {}
            }
        }

        tokio::time::sleep(FRAME_INTERVAL).await;
    }

    info!("Leaving terminal mode");
    Ok(())
}

/// Key bound to an action
fn action_key(action: Action) -> char {
    match action {
        Action::StartCamera | Action::StopCamera => 'c',
        Action::SwitchMode => 'm',
        Action::CapturePhoto => 'p',
        Action::StartRecording | Action::StopRecording => 'r',
        Action::PlayRecording => 'v',
        Action::DeleteRecording | Action::DeletePhoto => 'd',
    }
}

/// Action a key press stands for in the current state
fn key_action(key: char, widget: &CameraWidget) -> Option<Action> {
    let action = match key {
        'c' if widget.session().is_some() => Action::StopCamera,
        'c' => Action::StartCamera,
        'm' => Action::SwitchMode,
        'p' => Action::CapturePhoto,
        'r' if widget.view_state().is_recording => Action::StopRecording,
        'r' => Action::StartRecording,
        'v' => Action::PlayRecording,
        'd' if widget.mode() == CameraMode::Video => Action::DeleteRecording,
        'd' => Action::DeletePhoto,
        _ => return None,
    };
    Some(action)
}

/// Press a button; returns the message for the status bar
fn press(
    runtime: &mut Runtime,
    widget: &mut CameraWidget,
    view: &View,
    action: Action,
) -> Option<String> {
    if !widget.is_enabled(action) {
        let label = view.button(action).map_or("Action", |b| b.label);
        return Some(format!("{} is not available", label));
    }
    runtime.dispatch(widget, action.message());
    None
}

/// Save the photo or clip currently held
fn save_artifact(widget: &CameraWidget) -> String {
    let result = if let Some(photo) = widget.photo() {
        storage::save_photo(photo, None)
    } else if let Some(clip) = widget.clip() {
        storage::save_clip(clip, None)
    } else {
        return "Nothing to save".to_string();
    };

    match result {
        Ok(path) => format!("Saved: {}", path.display()),
        Err(e) => {
            error!(error = %e, "Failed to save");
            format!("Error: {}", e)
        }
    }
}

/// " 1920x1080 FHD", or just the size when it has no short name
fn size_label(width: u32, height: u32) -> String {
    match get_resolution_label(width) {
        Some(label) => format!(" {}x{} {}", width, height, label),
        None => format!(" {}x{}", width, height),
    }
}

fn photo_frame(photo: &Photo) -> Option<CameraFrame> {
    let image = image::load_from_memory(&photo.png).ok()?.to_rgba8();
    let (width, height) = image.dimensions();
    Some(CameraFrame {
        width,
        height,
        data: Arc::from(image.into_raw()),
        format: PixelFormat::RGBA,
        stride: width * 4,
        captured_at: Instant::now(),
    })
}

/// Widget that renders a frame using half-block characters
struct FrameWidget {
    frame: Option<CameraFrame>,
    placeholder: &'static str,
}

impl FrameWidget {
    fn new() -> Self {
        Self {
            frame: None,
            placeholder: "Waiting for camera...",
        }
    }

    fn update_frame(&mut self, frame: CameraFrame) {
        self.frame = Some(frame);
    }

    fn clear(&mut self, placeholder: &'static str) {
        self.frame = None;
        self.placeholder = placeholder;
    }
}

impl Widget for &FrameWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(frame) = self.frame.as_ref().filter(|f| f.width > 0 && f.height > 0) else {
            let msg = self.placeholder;
            let x = area.x + (area.width.saturating_sub(msg.len() as u16)) / 2;
            let y = area.y + area.height / 2;
            if y < area.y + area.height && x < area.x + area.width {
                buf.set_string(x, y, msg, Style::default());
            }
            return;
        };

        // Each terminal cell displays 2 vertical pixels
        let frame_aspect = frame.width as f64 / frame.height as f64;
        let term_width = area.width as f64;
        let term_height = (area.height * 2) as f64;

        let (display_width, display_height) = if term_width / term_height > frame_aspect {
            let h = term_height;
            let w = h * frame_aspect;
            (w as u16, (h / 2.0) as u16)
        } else {
            let w = term_width;
            let h = w / frame_aspect;
            (w as u16, (h / 2.0) as u16)
        };
        if display_width == 0 || display_height == 0 {
            return;
        }

        let x_offset = area.x + (area.width.saturating_sub(display_width)) / 2;
        let y_offset = area.y + (area.height.saturating_sub(display_height)) / 2;

        let x_scale = frame.width as f64 / display_width as f64;
        let y_scale = frame.height as f64 / (display_height * 2) as f64;

        // Upper half (▀) colored with fg, lower half with bg
        for ty in 0..display_height {
            for tx in 0..display_width {
                let term_x = x_offset + tx;
                let term_y = y_offset + ty;

                let src_x = (tx as f64 * x_scale) as u32;
                let src_y_top = (ty as f64 * 2.0 * y_scale) as u32;
                let src_y_bottom = ((ty as f64 * 2.0 + 1.0) * y_scale) as u32;

                let (r, g, b) = frame.sample_rgb(src_x, src_y_top);
                let top = Color::Rgb(r, g, b);
                let (r, g, b) = frame.sample_rgb(src_x, src_y_bottom);
                let bottom = Color::Rgb(r, g, b);

                if let Some(cell) = buf.cell_mut((term_x, term_y)) {
                    cell.set_char('▀');
                    cell.set_fg(top);
                    cell.set_bg(bottom);
                }
            }
        }
    }
}

/// Two-line status bar: buttons on top, messages below
struct StatusBar<'a> {
    view: &'a View,
    message: Option<&'a str>,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let base = Style::default().fg(Color::White).bg(Color::DarkGray);

        // Fill background
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ');
                    cell.set_style(base);
                }
            }
        }

        let right = area.x + area.width;
        let mut x = area.x;

        let put = |buf: &mut Buffer, x: u16, text: &str, style: Style| {
            buf.set_stringn(x, area.y, text, right.saturating_sub(x) as usize, style)
                .0
        };

        let mode = format!(" {} ", self.view.mode.display_name());
        x = put(buf, x, &mode, base.add_modifier(Modifier::BOLD));

        if self.view.recording_indicator {
            let secs = self.view.recording_secs;
            let rec = format!("● REC {:02}:{:02} ", secs / 60, secs % 60);
            x = put(buf, x, &rec, base.fg(Color::Red));
        }

        for button in &self.view.buttons {
            let style = if button.enabled {
                base
            } else {
                base.fg(Color::Gray).add_modifier(Modifier::DIM)
            };
            let text = format!("| '{}' {} ", action_key(button.action), button.label);
            x = put(buf, x, &text, style);
        }
        put(buf, x, "| 's' save | 'q' quit", base);

        if area.height < 2 {
            return;
        }
        let (line, style) = match (&self.view.error, self.message) {
            (Some(error), _) => (format!(" Error: {}", error), base.fg(Color::LightRed)),
            (None, Some(message)) => (format!(" {}", message), base),
            (None, None) => (
                size_label(self.view.width, self.view.height),
                base.fg(Color::Gray),
            ),
        };
        buf.set_stringn(area.x, area.y + 1, &line, area.width as usize, style);
    }
}
