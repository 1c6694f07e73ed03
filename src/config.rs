// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{
    APP_DIR_NAME, DEFAULT_ASPECT_RATIO, DEFAULT_HEIGHT, DEFAULT_WIDTH, MAX_DIMENSION,
};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

/// Camera selection hint passed to acquisition
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Facing toward the user (self-view camera)
    #[default]
    User,
    /// Facing away from the user
    Environment,
    /// Facing to the left of the user
    Left,
    /// Facing to the right of the user
    Right,
}

impl FacingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
            FacingMode::Left => "left",
            FacingMode::Right => "right",
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(FacingMode::User),
            "environment" => Ok(FacingMode::Environment),
            "left" => Ok(FacingMode::Left),
            "right" => Ok(FacingMode::Right),
            other => Err(format!("unknown facing mode '{}'", other)),
        }
    }
}

/// Aspect ratio hint, written as `"W:H"` (e.g. `"16:9"`) or a bare decimal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AspectRatio {
    text: String,
    value: f64,
}

impl AspectRatio {
    /// Width divided by height
    pub fn value(&self) -> f64 {
        self.value
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value = match text.split_once(':') {
            Some((w, h)) => {
                let w: f64 = w.trim().parse().map_err(|_| format!("bad ratio '{}'", s))?;
                let h: f64 = h.trim().parse().map_err(|_| format!("bad ratio '{}'", s))?;
                if h == 0.0 {
                    return Err(format!("bad ratio '{}': zero height", s));
                }
                w / h
            }
            None => text.parse().map_err(|_| format!("bad ratio '{}'", s))?,
        };

        if !value.is_finite() || value <= 0.0 {
            return Err(format!("bad ratio '{}'", s));
        }

        Ok(Self {
            text: text.to_string(),
            value,
        })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(ratio: AspectRatio) -> Self {
        ratio.text
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Widget mount options
///
/// Fixed at mount; nothing downstream re-validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Preview/canvas/snapshot width in pixels
    pub width: u32,
    /// Preview/canvas/snapshot height in pixels
    pub height: u32,
    /// Camera selection hint
    pub facing_mode: FacingMode,
    /// Request an audio track and unmute the preview
    pub enable_audio: bool,
    /// Optional aspect ratio hint
    pub aspect_ratio: Option<AspectRatio>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            facing_mode: FacingMode::default(),
            enable_audio: true,
            aspect_ratio: DEFAULT_ASPECT_RATIO.parse().ok(),
        }
    }
}

impl WidgetConfig {
    /// Default location: `<config dir>/camera-widget/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join("config.json"))
    }

    /// Load from the default location, falling back to defaults
    pub fn load_default() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => {
                debug!("No config directory on this platform, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: &Path) -> AppResult<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(AppError::Config(format!(
                    "cannot read {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        let config = Self::from_json(&text)?;
        info!(path = %path.display(), "Loaded widget config");
        Ok(config)
    }

    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> AppResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Check the size is nonzero and at most `MAX_DIMENSION` on each side
    pub fn validate(&self) -> AppResult<()> {
        let valid = 1..=MAX_DIMENSION;
        if !valid.contains(&self.width) || !valid.contains(&self.height) {
            return Err(AppError::Config(format!(
                "invalid size {}x{} (each side must be 1 to {})",
                self.width, self.height, MAX_DIMENSION
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_forms() {
        let ratio: AspectRatio = "1.5:1".parse().unwrap();
        assert_eq!(ratio.value(), 1.5);
        assert_eq!(ratio.to_string(), "1.5:1");

        let ratio: AspectRatio = "16:9".parse().unwrap();
        assert!((ratio.value() - 16.0 / 9.0).abs() < 1e-9);

        let ratio: AspectRatio = "1.25".parse().unwrap();
        assert_eq!(ratio.value(), 1.25);

        assert!("4:0".parse::<AspectRatio>().is_err());
        assert!("wide".parse::<AspectRatio>().is_err());
        assert!("-2".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_facing_mode_parsing() {
        assert_eq!("Environment".parse::<FacingMode>(), Ok(FacingMode::Environment));
        assert!("front".parse::<FacingMode>().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = WidgetConfig::from_json(r#"{ "facing_mode": "environment", "enable_audio": false }"#)
            .unwrap();
        assert_eq!(config.facing_mode, FacingMode::Environment);
        assert!(!config.enable_audio);
        assert_eq!(config.width, DEFAULT_WIDTH);
        assert_eq!(config.height, DEFAULT_HEIGHT);
    }

    #[test]
    fn test_zero_size_rejected() {
        let err = WidgetConfig::from_json(r#"{ "width": 0 }"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_oversized_rejected() {
        let err = WidgetConfig::from_json(r#"{ "width": 40000, "height": 30000 }"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));

        let config = WidgetConfig {
            width: MAX_DIMENSION,
            height: MAX_DIMENSION,
            ..WidgetConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_aspect_ratio_rejected() {
        let err = WidgetConfig::from_json(r#"{ "aspect_ratio": "x:y" }"#).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join(format!("camera-widget-missing-{}.json", uuid::Uuid::new_v4()));
        assert_eq!(WidgetConfig::load(&path).unwrap(), WidgetConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("camera-widget-{}", uuid::Uuid::new_v4()))
            .join("config.json");
        let config = WidgetConfig {
            width: 320,
            height: 240,
            aspect_ratio: None,
            ..WidgetConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(WidgetConfig::load(&path).unwrap(), config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
