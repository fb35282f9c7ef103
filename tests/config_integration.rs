//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use std::path::PathBuf;

use fixelview::config::AppConfig;
use fixelview_core::ColourType;
use serial_test::serial;

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("fixelview_config_{}_{}", name, std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("FIXELVIEW_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("FIXELVIEW_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_env_override_tool_settings() {
    std::env::set_var("FIXELVIEW_TOOL__LINE_OPACITY", "0.5");
    std::env::set_var("FIXELVIEW_TOOL__CROP_TO_SLICE", "false");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.tool.line_opacity, 0.5);
    assert!(!config.tool.crop_to_slice);
    std::env::remove_var("FIXELVIEW_TOOL__LINE_OPACITY");
    std::env::remove_var("FIXELVIEW_TOOL__CROP_TO_SLICE");
}

#[test]
#[serial]
fn test_default_file_loads() {
    let config = AppConfig::load().unwrap();
    assert_eq!(config.fixel.colourmap, "Hot");
    assert_eq!(config.fixel.colour_type, ColourType::Value);
    assert_eq!(config.tool.axis, 2);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = scratch_dir("user");
    std::fs::write(
        dir.join("default.toml"),
        "[fixel]\ncolourmap = \"Hot\"\nline_length_multiplier = 1.0\n",
    )
    .unwrap();
    std::fs::write(
        dir.join("user.toml"),
        "[fixel]\ncolourmap = \"Jet\"\ncolour_type = \"Direction\"\n",
    )
    .unwrap();

    let config = AppConfig::load_from(&dir).unwrap();
    assert_eq!(config.fixel.colourmap, "Jet");
    assert_eq!(config.fixel.colour_type, ColourType::Direction);
    assert_eq!(config.fixel.line_length_multiplier, 1.0);

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
#[serial]
fn test_invalid_value_is_error() {
    let dir = scratch_dir("invalid");
    std::fs::write(dir.join("default.toml"), "[tool]\nline_opacity = \"opaque\"\n").unwrap();

    let err = AppConfig::load_from(&dir).unwrap_err();
    assert!(err.to_string().starts_with("Configuration error"));

    std::fs::remove_dir_all(&dir).unwrap();
}
