// SPDX-License-Identifier: GPL-3.0-only

use camera_widget::{AspectRatio, FacingMode, WidgetConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

mod cli;

#[derive(Parser)]
#[command(name = "camera-widget")]
#[command(about = "Camera capture widget: live preview, photos and video clips")]
#[command(version = camera_widget::constants::app_info::version())]
#[command(subcommand_required = false)]
struct Cli {
    #[command(flatten)]
    mount: MountOptions,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Widget mount options; override the config file
#[derive(Args)]
struct MountOptions {
    /// Preview and photo width in pixels
    #[arg(long, global = true)]
    width: Option<u32>,

    /// Preview and photo height in pixels
    #[arg(long, global = true)]
    height: Option<u32>,

    /// Camera facing mode (user, environment, left, right)
    #[arg(long, global = true)]
    facing: Option<FacingMode>,

    /// Do not request the microphone
    #[arg(long, global = true)]
    no_audio: bool,

    /// Requested aspect ratio, e.g. "16:9" or "1.5"
    #[arg(long, global = true)]
    aspect_ratio: Option<AspectRatio>,

    /// Config file (default: ~/.config/camera-widget/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run in terminal mode (renders the widget to the terminal)
    Terminal,

    /// List available cameras
    List,

    /// Take a photo
    Photo {
        /// Output file path (default: ~/Pictures/camera-widget/IMG_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record a video
    Video {
        /// Recording duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,

        /// Output file path (default: ~/Videos/camera-widget/VID_TIMESTAMP.mjpeg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl MountOptions {
    fn into_config(self) -> Result<WidgetConfig, Box<dyn std::error::Error>> {
        let mut config = match &self.config {
            Some(path) => WidgetConfig::load(path)?,
            None => WidgetConfig::load_default()?,
        };

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(facing) = self.facing {
            config.facing_mode = facing;
        }
        if self.no_audio {
            config.enable_audio = false;
        }
        if let Some(ratio) = self.aspect_ratio {
            config.aspect_ratio = Some(ratio);
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let terminal_mode = matches!(cli.command, Some(Commands::Terminal) | None);

    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=camera_widget=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .with_ansi(!terminal_mode)
        .with_writer(log_writer(terminal_mode))
        .init();

    let config = cli.mount.into_config()?;

    // Everything runs cooperatively on one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.command {
        Some(Commands::List) => cli::list_devices(),
        Some(Commands::Photo { output }) => runtime.block_on(cli::take_photo(config, output)),
        Some(Commands::Video { duration, output }) => {
            runtime.block_on(cli::record_video(config, duration, output))
        }
        Some(Commands::Terminal) | None => runtime.block_on(camera_widget::terminal::run(config)),
    }
}

/// Log destination: stderr, or a file while the terminal UI owns the screen
fn log_writer(terminal_mode: bool) -> BoxMakeWriter {
    if !terminal_mode {
        return BoxMakeWriter::new(std::io::stderr);
    }

    let file = dirs::cache_dir()
        .map(|dir| dir.join(camera_widget::constants::APP_DIR_NAME))
        .and_then(|dir| {
            std::fs::create_dir_all(&dir).ok()?;
            std::fs::File::create(dir.join("terminal.log")).ok()
        });

    match file {
        Some(file) => BoxMakeWriter::new(Mutex::new(file)),
        None => BoxMakeWriter::new(std::io::sink),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_width_rejected() {
        let cli = Cli::try_parse_from([
            "camera-widget",
            "--config",
            "/nonexistent/camera-widget.json",
            "--width",
            "40000",
            "photo",
        ])
        .unwrap();
        assert!(cli.mount.into_config().is_err());
    }

    #[test]
    fn test_terminal_is_default_command() {
        let cli = Cli::try_parse_from(["camera-widget"]).unwrap();
        assert!(cli.command.is_none());
    }
}
