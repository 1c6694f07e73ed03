// SPDX-License-Identifier: MPL-2.0

//! Integration tests for configuration module

use camera_widget::backends::camera::MediaConstraints;
use camera_widget::{AppError, AspectRatio, FacingMode, WidgetConfig};

#[test]
fn test_config_default() {
    // Defaults mirror the demo mount
    let config = WidgetConfig::default();

    assert_eq!(config.width, 640);
    assert_eq!(config.height, 480);
    assert_eq!(config.facing_mode, FacingMode::User);
    assert!(config.enable_audio, "Audio should be requested by default");
    assert_eq!(config.aspect_ratio.map(|r| r.value()), Some(1.5));
}

#[test]
fn test_partial_json_fills_defaults() {
    let config = WidgetConfig::from_json(r#"{ "facing_mode": "environment" }"#).unwrap();

    assert_eq!(config.facing_mode, FacingMode::Environment);
    assert_eq!(config.width, 640);
    assert!(config.enable_audio);
}

#[test]
fn test_zero_size_rejected() {
    let result = WidgetConfig::from_json(r#"{ "width": 0 }"#);
    assert!(matches!(result, Err(AppError::Config(_))));
}

#[test]
fn test_missing_file_yields_defaults() {
    let path = std::env::temp_dir()
        .join(format!("camera-widget-missing-{}", uuid::Uuid::new_v4()))
        .join("config.json");

    let config = WidgetConfig::load(&path).unwrap();
    assert_eq!(config, WidgetConfig::default());
}

#[test]
fn test_save_then_load() {
    let dir = std::env::temp_dir().join(format!("camera-widget-cfg-{}", uuid::Uuid::new_v4()));
    let path = dir.join("config.json");

    let config = WidgetConfig {
        width: 1280,
        height: 720,
        facing_mode: FacingMode::Left,
        enable_audio: false,
        aspect_ratio: Some("16:9".parse::<AspectRatio>().unwrap()),
    };
    config.save(&path).unwrap();

    let loaded = WidgetConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_constraints_follow_config() {
    let mut config = WidgetConfig::default();
    config.enable_audio = false;
    config.aspect_ratio = None;

    let constraints = MediaConstraints::from(&config);
    assert!(!constraints.audio);
    assert_eq!(constraints.video.facing_mode, FacingMode::User);
    assert_eq!(constraints.video.aspect_ratio, None);
}
